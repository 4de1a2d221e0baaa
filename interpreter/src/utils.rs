//! Small utilities.

use primitive_types::{H160, H256, U256};
use sha3::{Digest, Keccak256};

/// Convert [H160] into [U256], right aligned.
#[must_use]
pub fn h160_to_u256(v: H160) -> U256 {
	U256::from_big_endian(H256::from(v).as_bytes())
}

/// Convert the low 160 bits of [U256] into [H160].
#[must_use]
pub fn u256_to_h160(v: U256) -> H160 {
	let mut bytes = [0u8; 32];
	v.to_big_endian(&mut bytes);
	H160::from_slice(&bytes[12..])
}

/// Convert [U256] into [H256].
#[must_use]
pub fn u256_to_h256(v: U256) -> H256 {
	let mut ret = H256::zero();
	v.to_big_endian(&mut ret[..]);
	ret
}

/// Boolean as a word, `1` or `0`.
#[inline]
#[must_use]
pub fn bool_to_u256(v: bool) -> U256 {
	if v {
		U256::one()
	} else {
		U256::zero()
	}
}

/// Keccak-256 of the big-endian encoding of `words`, as a word.
#[must_use]
pub fn keccak_words(words: &[U256]) -> U256 {
	let mut hasher = Keccak256::new();
	for word in words {
		hasher.update(u256_to_h256(*word).as_bytes());
	}
	U256::from_big_endian(hasher.finalize().as_slice())
}
