use alloc::vec::Vec;

use primitive_types::U256;

use crate::error::{ExitError, ExitFatal};

/// Evaluation stack. Its limit is the integrity-checked maximum height of the
/// source it belongs to, and its buffer is allocated once at that capacity.
#[derive(Clone, Debug)]
pub struct Stack {
	data: Vec<U256>,
	limit: usize,
}

macro_rules! impl_perform_popn_pushn {
	(
		$name:ident,
		$pop_len:expr,
		$push_len:expr,
		($($peek_pop:expr),*),
		($($peek_push:expr),*),
		$pop_pushn_f:ident
	) => {
		/// Pop $pop_len values from the stack, and then push $push_len values
		/// into the stack. Closure arguments are in push order.
		///
		/// If `f` returns error, then the stack will not be changed.
		#[allow(unused_parens)]
		pub fn $name<R, F>(&mut self, f: F) -> Result<R, ExitError> where
			F: FnOnce(
				$(impl_perform_popn_pushn!(INTERNAL_TYPE_RU256, $peek_pop)),*
			) -> Result<(($(impl_perform_popn_pushn!(INTERNAL_TYPE_U256, $peek_push)),*), R), ExitError>
		{
			self.check_pop_push($pop_len, $push_len)?;

			let (p, ret) = f($(self.unchecked_peek($pop_len - 1 - $peek_pop)),*)?;
			self.$pop_pushn_f($pop_len, p);

			Ok(ret)
		}
	};
	(INTERNAL_TYPE_RU256, $e:expr) => { &U256 };
	(INTERNAL_TYPE_U256, $e:expr) => { U256 };
}

impl Stack {
	/// Create a new stack with given limit.
	#[must_use]
	pub fn new(limit: usize) -> Self {
		Self {
			data: Vec::with_capacity(limit),
			limit,
		}
	}

	/// Stack limit.
	#[inline]
	#[must_use]
	pub const fn limit(&self) -> usize {
		self.limit
	}

	/// Stack length.
	#[inline]
	#[must_use]
	pub fn len(&self) -> usize {
		self.data.len()
	}

	/// Whether the stack is empty.
	#[inline]
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Stack data, bottom first.
	#[inline]
	#[must_use]
	pub fn data(&self) -> &[U256] {
		&self.data
	}

	/// Consume the stack, returning its data bottom first.
	#[must_use]
	pub fn into_data(self) -> Vec<U256> {
		self.data
	}

	/// Pop a value from the stack.
	#[inline]
	pub fn pop(&mut self) -> Result<U256, ExitError> {
		self.data.pop().ok_or(ExitFatal::StackUnderflow.into())
	}

	/// Pop `n` values, returned in push order.
	pub fn popn(&mut self, n: usize) -> Result<Vec<U256>, ExitError> {
		if self.data.len() < n {
			return Err(ExitFatal::StackUnderflow.into());
		}
		let at = self.data.len() - n;
		Ok(self.data.split_off(at))
	}

	/// Push a new value into the stack. If it would exceed the stack limit,
	/// returns `StackOverflow` and leaves the stack unchanged.
	#[inline]
	pub fn push(&mut self, value: U256) -> Result<(), ExitError> {
		if self.data.len() + 1 > self.limit {
			return Err(ExitFatal::StackOverflow.into());
		}
		self.data.push(value);
		Ok(())
	}

	/// Check whether it's possible to pop and push enough items in the stack.
	pub fn check_pop_push(&self, pop: usize, push: usize) -> Result<(), ExitError> {
		if self.data.len() < pop {
			return Err(ExitFatal::StackUnderflow.into());
		}
		if self.data.len() - pop + push > self.limit {
			return Err(ExitFatal::StackOverflow.into());
		}
		Ok(())
	}

	fn unchecked_peek(&self, no_from_top: usize) -> &U256 {
		&self.data[self.data.len() - no_from_top - 1]
	}

	fn unchecked_pop_push1(&mut self, pop: usize, p1: U256) {
		let len = self.data.len();
		self.data.truncate(len - pop);
		self.data.push(p1);
	}

	fn unchecked_pop_push0(&mut self, pop: usize, _p1: ()) {
		let len = self.data.len();
		self.data.truncate(len - pop);
	}

	/// Peek a value at given index for the stack, where the top of
	/// the stack is at index `0`.
	#[inline]
	pub fn peek(&self, no_from_top: usize) -> Result<U256, ExitError> {
		if self.data.len() > no_from_top {
			Ok(self.data[self.data.len() - no_from_top - 1])
		} else {
			Err(ExitFatal::StackUnderflow.into())
		}
	}

	impl_perform_popn_pushn!(perform_pop0_push1, 0, 1, (), (0), unchecked_pop_push1);
	impl_perform_popn_pushn!(perform_pop1_push0, 1, 0, (0), (), unchecked_pop_push0);
	impl_perform_popn_pushn!(perform_pop1_push1, 1, 1, (0), (0), unchecked_pop_push1);
	impl_perform_popn_pushn!(perform_pop2_push0, 2, 0, (0, 1), (), unchecked_pop_push0);
	impl_perform_popn_pushn!(perform_pop2_push1, 2, 1, (0, 1), (0), unchecked_pop_push1);
	impl_perform_popn_pushn!(perform_pop3_push1, 3, 1, (0, 1, 2), (0), unchecked_pop_push1);
}
