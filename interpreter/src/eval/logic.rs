use primitive_types::U256;

use crate::error::{ExitError, ExitException};

#[inline]
pub fn is_zero(op1: U256) -> U256 {
	crate::utils::bool_to_u256(op1.is_zero())
}

#[inline]
pub fn eager_if(condition: U256, if_true: U256, if_false: U256) -> U256 {
	if condition.is_zero() {
		if_false
	} else {
		if_true
	}
}

/// First non-zero value in push order, or zero.
pub fn any(values: &[U256]) -> Result<U256, ExitError> {
	Ok(values
		.iter()
		.find(|v| !v.is_zero())
		.copied()
		.unwrap_or_default())
}

/// Last value if every value is non-zero, else zero.
pub fn every(values: &[U256]) -> Result<U256, ExitError> {
	if values.iter().any(|v| v.is_zero()) {
		return Ok(U256::zero());
	}
	Ok(values.last().copied().unwrap_or_default())
}

#[inline]
pub fn ensure(value: U256, code: u16) -> Result<(), ExitError> {
	if value.is_zero() {
		Err(ExitException::EnsureFailed(code).into())
	} else {
		Ok(())
	}
}
