use alloc::rc::Rc;
use core::ops::{Deref, DerefMut};

use crate::{
	error::{ExitError, ExitFatal, ExitResult, ExitSucceed},
	etable::{Control, Efn, Etable},
	expression::{Expression, Op},
	integrity::SourceBounds,
	machine::Machine,
	opcode::{Opcode, Operand, ZipmapOperand, OP_WIDTH},
};

/// Interpreter running one checked source through an evaluation table.
pub struct EtableInterpreter<'etable, S, H, F = Efn<S, H>> {
	position: usize,
	machine: Machine<S>,
	etable: &'etable Etable<S, H, F>,
	bounds: Rc<[SourceBounds]>,
}

impl<'etable, S, H, F> AsRef<Machine<S>> for EtableInterpreter<'etable, S, H, F> {
	fn as_ref(&self) -> &Machine<S> {
		&self.machine
	}
}

impl<'etable, S, H, F> AsMut<Machine<S>> for EtableInterpreter<'etable, S, H, F> {
	fn as_mut(&mut self) -> &mut Machine<S> {
		&mut self.machine
	}
}

impl<'etable, S, H, F> Deref for EtableInterpreter<'etable, S, H, F> {
	type Target = Machine<S>;

	fn deref(&self) -> &Machine<S> {
		&self.machine
	}
}

impl<'etable, S, H, F> DerefMut for EtableInterpreter<'etable, S, H, F> {
	fn deref_mut(&mut self) -> &mut Machine<S> {
		&mut self.machine
	}
}

impl<'etable, S, H, F> EtableInterpreter<'etable, S, H, F> {
	/// Create an interpreter for `source`. The stack is sized to the source's
	/// checked maximum height and starts empty.
	pub fn new(
		expression: Rc<Expression>,
		source: usize,
		bounds: Rc<[SourceBounds]>,
		state: S,
		etable: &'etable Etable<S, H, F>,
	) -> Result<Self, ExitError> {
		let max_height = bounds
			.get(source)
			.ok_or(ExitFatal::UncheckedSource)?
			.max_height;
		let machine = Machine::new(expression, source, max_height, state);

		Ok(Self {
			position: 0,
			machine,
			etable,
			bounds,
		})
	}

	/// Index of the next operation.
	pub const fn position(&self) -> usize {
		self.position
	}

	/// Bounds of the running source.
	pub fn bounds(&self) -> Option<&SourceBounds> {
		self.bounds.get(self.machine.source)
	}

	/// Pick the next operation.
	pub fn peek_op(&self) -> Option<Op> {
		Op::decode(self.machine.code(), self.position * OP_WIDTH)
	}

	/// Explicit exit of the machine. Further step will stop.
	pub fn exit(&mut self) {
		self.position = self.machine.code().len() / OP_WIDTH;
	}

	pub fn deconstruct(self) -> Machine<S> {
		self.machine
	}
}

impl<'etable, S, H, F> EtableInterpreter<'etable, S, H, F>
where
	S: Clone,
	F: Fn(&mut Machine<S>, &mut H, Opcode, Operand) -> Control,
{
	/// Loop stepping the machine until the source ends or fails.
	pub fn run(&mut self, handle: &mut H) -> ExitResult {
		loop {
			match self.step(handle) {
				Ok(()) => (),
				Err(res) => return res,
			}
		}
	}

	/// Execute one operation.
	#[inline]
	pub fn step(&mut self, handle: &mut H) -> Result<(), ExitResult> {
		let op = match self.peek_op() {
			Some(op) => op,
			None => return Err(ExitSucceed::Stopped.into()),
		};

		let control = self
			.etable
			.eval(&mut self.machine, handle, op.opcode, op.operand);

		match control {
			Control::Continue => {
				self.position += 1;
				Ok(())
			}
			Control::Exit(e) => {
				self.exit();
				Err(Err(e))
			}
			Control::Zipmap(zipmap) => match self.zipmap(handle, zipmap) {
				Ok(()) => {
					self.position += 1;
					Ok(())
				}
				Err(e) => {
					self.exit();
					Err(Err(e))
				}
			},
		}
	}

	/// Run `zipmap.source` once per iteration. Iteration `c` receives column
	/// `c` of the popped block, and its outputs are pushed in iteration order.
	fn zipmap(&mut self, handle: &mut H, zipmap: ZipmapOperand) -> Result<(), ExitError> {
		let values = self
			.machine
			.stack
			.popn(zipmap.inputs * zipmap.iterations)?;

		for column in 0..zipmap.iterations {
			let mut child = EtableInterpreter::new(
				self.machine.expression.clone(),
				zipmap.source,
				self.bounds.clone(),
				self.machine.state.clone(),
				self.etable,
			)?;
			for row in 0..zipmap.inputs {
				child
					.machine
					.stack
					.push(values[row * zipmap.iterations + column])?;
			}
			child.run(handle)?;

			for value in child.deconstruct().stack.into_data() {
				self.machine.stack.push(value)?;
			}
		}

		Ok(())
	}
}
