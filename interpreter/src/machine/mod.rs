mod stack;

use alloc::rc::Rc;

pub use self::stack::Stack;

use crate::expression::Expression;

/// Core execution layer: one source of an expression, its stack, and the
/// per-evaluation state.
pub struct Machine<S> {
	/// Expression the source belongs to.
	pub(crate) expression: Rc<Expression>,
	/// Index of the running source.
	pub(crate) source: usize,
	/// Stack.
	pub stack: Stack,
	/// Extra state,
	pub state: S,
}

impl<S> Machine<S> {
	/// Create a new machine running `source` of `expression`, with a stack of
	/// exactly `stack_limit` words.
	pub fn new(expression: Rc<Expression>, source: usize, stack_limit: usize, state: S) -> Self {
		Self {
			expression,
			source,
			stack: Stack::new(stack_limit),
			state,
		}
	}

	/// The expression.
	pub fn expression(&self) -> &Expression {
		&self.expression
	}

	/// Index of the running source.
	pub fn source_index(&self) -> usize {
		self.source
	}

	/// Encoded bytes of the running source.
	pub fn code(&self) -> &[u8] {
		self.expression.source(self.source).unwrap_or(&[])
	}
}
