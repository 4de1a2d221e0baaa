//! Sentinel-delimited lists in evaluation output.
//!
//! A source emits several variable-length lists of fixed-width records by
//! pushing, for each list kind from last to first, the sentinel followed by
//! its records in reverse order with fields pushed last-field first. Reading
//! from the top of the stack then yields every list in order, each record's
//! fields in order, each list closed by the sentinel.

use alloc::{vec, vec::Vec};
use core::fmt;

use primitive_types::U256;
use sha3::{Digest, Keccak256};

/// One decoded list: records of equal width.
pub type List = Vec<Vec<U256>>;

/// `keccak256("exvm.sentinel")` with the top bit set.
#[must_use]
pub fn sentinel() -> U256 {
	let hash = Keccak256::digest(b"exvm.sentinel");
	U256::from_big_endian(hash.as_slice()) | (U256::one() << 255)
}

/// Sentinel decoding or encoding error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SentinelError {
	/// Values ran out before the list's sentinel.
	Unterminated {
		/// List index.
		list: usize,
	},
	/// Values ran out inside a record.
	TruncatedRecord {
		/// List index.
		list: usize,
		/// Record index within the list.
		record: usize,
	},
	/// A record field other than the first holds the sentinel.
	SentinelInRecord {
		/// List index.
		list: usize,
		/// Record index within the list.
		record: usize,
	},
	/// A record width of zero.
	ZeroWidth {
		/// List index.
		list: usize,
	},
	/// A record to encode has the wrong number of fields.
	WidthMismatch {
		/// List index.
		list: usize,
		/// Record index within the list.
		record: usize,
	},
}

#[cfg(feature = "std")]
impl std::error::Error for SentinelError {}

impl fmt::Display for SentinelError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Unterminated { list } => write!(f, "list {} is not terminated", list),
			Self::TruncatedRecord { list, record } => {
				write!(f, "record {} of list {} is truncated", record, list)
			}
			Self::SentinelInRecord { list, record } => {
				write!(f, "record {} of list {} holds the sentinel", record, list)
			}
			Self::ZeroWidth { list } => write!(f, "list {} has zero record width", list),
			Self::WidthMismatch { list, record } => {
				write!(f, "record {} of list {} has the wrong width", record, list)
			}
		}
	}
}

/// Decode one list per entry of `widths` from `output`, given bottom first.
/// Values below the last sentinel consumed are ignored.
pub fn decode_lists(output: &[U256], widths: &[usize]) -> Result<Vec<List>, SentinelError> {
	let sentinel = sentinel();
	let mut cursor = output.len();
	let mut lists = Vec::with_capacity(widths.len());

	for (list, width) in widths.iter().copied().enumerate() {
		if width == 0 {
			return Err(SentinelError::ZeroWidth { list });
		}

		let mut records = Vec::new();
		loop {
			if cursor == 0 {
				return Err(SentinelError::Unterminated { list });
			}
			if output[cursor - 1] == sentinel {
				cursor -= 1;
				break;
			}

			let record = records.len();
			if cursor < width {
				return Err(SentinelError::TruncatedRecord { list, record });
			}
			let fields: Vec<U256> = output[cursor - width..cursor].iter().rev().copied().collect();
			if fields[1..].contains(&sentinel) {
				return Err(SentinelError::SentinelInRecord { list, record });
			}
			records.push(fields);
			cursor -= width;
		}
		lists.push(records);
	}

	Ok(lists)
}

/// Stack image, bottom first, that decodes to `lists` with `widths`.
pub fn encode_lists(lists: &[List], widths: &[usize]) -> Result<Vec<U256>, SentinelError> {
	let sentinel = sentinel();
	let mut image = vec![];

	for (list, records) in lists.iter().enumerate().rev() {
		let width = widths.get(list).copied().unwrap_or(0);
		if width == 0 {
			return Err(SentinelError::ZeroWidth { list });
		}

		image.push(sentinel);
		for (record, fields) in records.iter().enumerate().rev() {
			if fields.len() != width {
				return Err(SentinelError::WidthMismatch { list, record });
			}
			if fields.contains(&sentinel) {
				return Err(SentinelError::SentinelInRecord { list, record });
			}
			image.extend(fields.iter().rev().copied());
		}
	}

	Ok(image)
}
