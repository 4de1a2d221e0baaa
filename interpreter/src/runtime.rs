//! Runtime state of an evaluation and the traits the host backend
//! implements.

use alloc::{rc::Rc, vec::Vec};

use primitive_types::{H160, U256};

use crate::error::{ExitError, ExitException};

/// Storage namespace. Two hosts, or two subjects of one host, never share a
/// key.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scope {
	/// Identity of the contract instance the expression is attached to.
	pub host: H160,
	/// Caller-chosen segment within the host.
	pub subject: U256,
}

impl Scope {
	/// Scope of a host with the zero subject.
	#[must_use]
	pub fn host(host: H160) -> Self {
		Self {
			host,
			subject: U256::zero(),
		}
	}
}

/// Caller supplied 2-D input array, addressed by `(row, column)`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Context {
	/// Rows of the context.
	pub rows: Vec<Vec<U256>>,
}

impl Context {
	/// Create a new context.
	#[must_use]
	pub fn new(rows: Vec<Vec<U256>>) -> Self {
		Self { rows }
	}

	/// Read a cell.
	#[must_use]
	pub fn get(&self, row: usize, column: usize) -> Option<U256> {
		self.rows.get(row).and_then(|r| r.get(column)).copied()
	}

	/// Check that every declared row exists and is at least as wide as
	/// declared.
	pub fn check_shape(&self, shape: &[usize]) -> Result<(), ExitError> {
		if self.rows.len() < shape.len() {
			return Err(ExitException::ContextMismatch.into());
		}
		for (row, width) in self.rows.iter().zip(shape) {
			if row.len() < *width {
				return Err(ExitException::ContextMismatch.into());
			}
		}
		Ok(())
	}
}

/// Per-evaluation runtime state shared by every machine of one evaluation.
#[derive(Clone, Debug)]
pub struct RuntimeState {
	/// Context rows.
	pub context: Rc<Context>,
	/// Immediate caller of the evaluation.
	pub caller: H160,
	/// Storage scope of the evaluation.
	pub scope: Scope,
}

impl AsRef<Self> for RuntimeState {
	fn as_ref(&self) -> &Self {
		self
	}
}

impl AsMut<Self> for RuntimeState {
	fn as_mut(&mut self) -> &mut Self {
		self
	}
}

/// Environment of the host ledger.
#[auto_impl::auto_impl(&, &mut, Box)]
pub trait RuntimeEnvironment {
	/// Get environmental block number.
	fn block_number(&self) -> U256;
	/// Get environmental block timestamp.
	fn block_timestamp(&self) -> U256;
}

/// Read access to the state store.
#[auto_impl::auto_impl(&, &mut, Box)]
pub trait RuntimeBaseBackend: RuntimeEnvironment {
	/// Get storage value of scope at key. Unset keys read zero.
	fn storage(&self, scope: Scope, key: U256) -> U256;
}

/// Read and write access to the state store.
#[auto_impl::auto_impl(&mut, Box)]
pub trait RuntimeBackend: RuntimeBaseBackend {
	/// Set storage value of scope at key.
	fn set_storage(&mut self, scope: Scope, key: U256, value: U256) -> Result<(), ExitError>;
}

/// User-registered extension functions reachable through `CALL`.
#[auto_impl::auto_impl(&mut, Box)]
pub trait RuntimeFunctions {
	/// Invoke the function at `index` with `inputs` in push order.
	fn call_function(&mut self, index: usize, inputs: &[U256]) -> Result<Vec<U256>, ExitError>;
}

impl RuntimeFunctions for () {
	fn call_function(&mut self, _index: usize, _inputs: &[U256]) -> Result<Vec<U256>, ExitError> {
		Err(ExitException::FunctionFailed("no functions registered".into()).into())
	}
}
