use alloc::borrow::Cow;
use core::fmt;

use crate::Opcode;

/// Exit result.
pub type ExitResult = Result<ExitSucceed, ExitError>;

/// Exit reason.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExitError {
	/// The expression aborted the evaluation, or its inputs were unusable.
	Exception(ExitException),
	/// Machine encountered an error that is not supposed to happen for an
	/// attached expression, such as breaking a checked stack bound.
	Fatal(ExitFatal),
}

impl From<ExitError> for ExitResult {
	fn from(s: ExitError) -> Self {
		Err(s)
	}
}

#[cfg(feature = "std")]
impl std::error::Error for ExitError {}

impl fmt::Display for ExitError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Exception(e) => write!(f, "evaluation aborted: {}", e),
			Self::Fatal(e) => write!(f, "fatal evaluation error: {}", e),
		}
	}
}

/// Exit succeed reason.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExitSucceed {
	/// The source ran out of operations.
	Stopped,
}

impl From<ExitSucceed> for ExitResult {
	fn from(s: ExitSucceed) -> Self {
		Ok(s)
	}
}

/// Exit error reason caused by the expression or its inputs.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExitException {
	/// `ENSURE` observed a zero value. Carries the operand of the failing
	/// opcode as reason code.
	EnsureFailed(u16),
	/// Checked arithmetic overflowed.
	ArithmeticOverflow,
	/// Division or modulo by zero.
	DivisionByZero,
	/// The supplied context is smaller than the shape declared on attach.
	ContextMismatch,
	/// An extension function failed.
	FunctionFailed(Cow<'static, str>),
	/// An extension function returned a different number of words than its
	/// operand declared.
	InvalidFunctionOutput,
}

impl From<ExitException> for ExitResult {
	fn from(s: ExitException) -> Self {
		Err(ExitError::Exception(s))
	}
}

impl From<ExitException> for ExitError {
	fn from(s: ExitException) -> Self {
		Self::Exception(s)
	}
}

impl fmt::Display for ExitException {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::EnsureFailed(code) => write!(f, "ensure failed with code {}", code),
			Self::ArithmeticOverflow => write!(f, "arithmetic overflow"),
			Self::DivisionByZero => write!(f, "division by zero"),
			Self::ContextMismatch => write!(f, "context smaller than declared shape"),
			Self::FunctionFailed(reason) => write!(f, "extension function failed: {}", reason),
			Self::InvalidFunctionOutput => write!(f, "extension function output size mismatch"),
		}
	}
}

/// Exit fatal reason.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExitFatal {
	/// Popped below the bottom of the stack. Unreachable for checked sources.
	StackUnderflow,
	/// Pushed past the checked stack capacity. Unreachable for checked sources.
	StackOverflow,
	/// The opcode has no evaluation function.
	InvalidOpcode(Opcode),
	/// No expression is attached under the given id.
	UnknownExpression,
	/// The requested source is not an entrypoint of the expression.
	NotEntrypoint,
	/// The source has no integrity bounds.
	UncheckedSource,

	/// Other fatal errors.
	Other(Cow<'static, str>),
}

impl From<ExitFatal> for ExitResult {
	fn from(s: ExitFatal) -> Self {
		Err(ExitError::Fatal(s))
	}
}

impl From<ExitFatal> for ExitError {
	fn from(s: ExitFatal) -> Self {
		Self::Fatal(s)
	}
}

impl fmt::Display for ExitFatal {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::StackUnderflow => write!(f, "stack underflow"),
			Self::StackOverflow => write!(f, "stack overflow"),
			Self::InvalidOpcode(opcode) => write!(f, "invalid opcode {:?}", opcode),
			Self::UnknownExpression => write!(f, "unknown expression"),
			Self::NotEntrypoint => write!(f, "source is not an entrypoint"),
			Self::UncheckedSource => write!(f, "source was not integrity checked"),
			Self::Other(reason) => write!(f, "{}", reason),
		}
	}
}
