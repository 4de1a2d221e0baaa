use primitive_types::U256;

use crate::error::{ExitError, ExitException};

fn checked_fold<F>(values: &[U256], f: F) -> Result<U256, ExitError>
where
	F: Fn(U256, U256) -> Result<U256, ExitError>,
{
	let (first, rest) = match values.split_first() {
		Some(split) => split,
		None => return Ok(U256::zero()),
	};
	rest.iter().try_fold(*first, |acc, v| f(acc, *v))
}

fn overflow(v: Option<U256>) -> Result<U256, ExitError> {
	v.ok_or(ExitException::ArithmeticOverflow.into())
}

fn by_zero(v: Option<U256>) -> Result<U256, ExitError> {
	v.ok_or(ExitException::DivisionByZero.into())
}

pub fn add(values: &[U256]) -> Result<U256, ExitError> {
	checked_fold(values, |a, b| overflow(a.checked_add(b)))
}

pub fn sub(values: &[U256]) -> Result<U256, ExitError> {
	checked_fold(values, |a, b| overflow(a.checked_sub(b)))
}

pub fn mul(values: &[U256]) -> Result<U256, ExitError> {
	checked_fold(values, |a, b| overflow(a.checked_mul(b)))
}

pub fn div(values: &[U256]) -> Result<U256, ExitError> {
	checked_fold(values, |a, b| by_zero(a.checked_div(b)))
}

pub fn rem(values: &[U256]) -> Result<U256, ExitError> {
	checked_fold(values, |a, b| by_zero(a.checked_rem(b)))
}

pub fn exp(values: &[U256]) -> Result<U256, ExitError> {
	checked_fold(values, |a, b| overflow(a.checked_pow(b)))
}

pub fn min(values: &[U256]) -> Result<U256, ExitError> {
	checked_fold(values, |a, b| Ok(a.min(b)))
}

pub fn max(values: &[U256]) -> Result<U256, ExitError> {
	checked_fold(values, |a, b| Ok(a.max(b)))
}

pub fn saturating_add(values: &[U256]) -> Result<U256, ExitError> {
	checked_fold(values, |a, b| Ok(a.saturating_add(b)))
}

pub fn saturating_sub(values: &[U256]) -> Result<U256, ExitError> {
	checked_fold(values, |a, b| Ok(a.saturating_sub(b)))
}

pub fn saturating_mul(values: &[U256]) -> Result<U256, ExitError> {
	checked_fold(values, |a, b| Ok(a.saturating_mul(b)))
}

pub fn hash(values: &[U256]) -> Result<U256, ExitError> {
	Ok(crate::utils::keccak_words(values))
}
