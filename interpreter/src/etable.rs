use core::{
	marker::PhantomData,
	ops::{Deref, DerefMut},
};

use crate::{
	error::{ExitError, ExitFatal},
	eval::*,
	machine::Machine,
	opcode::{Opcode, Operand, ZipmapOperand},
	runtime::{RuntimeBackend, RuntimeFunctions, RuntimeState},
};

/// Control state returned by an evaluation function.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Control {
	/// Continue with the next operation.
	Continue,
	/// Abort the evaluation.
	Exit(ExitError),
	/// Run a zipmap over the given source. Handled by the interpreter loop,
	/// which owns the table needed to run the child source.
	Zipmap(ZipmapOperand),
}

/// Evaluation function type.
pub type Efn<S, H> = fn(&mut Machine<S>, &mut H, Opcode, Operand) -> Control;

/// The evaluation table, indexed by opcode.
pub struct Etable<S, H, F = Efn<S, H>>([F; 256], PhantomData<(S, H)>);

impl<S, H, F> Deref for Etable<S, H, F> {
	type Target = [F; 256];

	fn deref(&self) -> &[F; 256] {
		&self.0
	}
}

impl<S, H, F> DerefMut for Etable<S, H, F> {
	fn deref_mut(&mut self) -> &mut [F; 256] {
		&mut self.0
	}
}

impl<S, H, F> Etable<S, H, F>
where
	F: Fn(&mut Machine<S>, &mut H, Opcode, Operand) -> Control,
{
	/// Evaluate one operation.
	#[inline]
	pub fn eval(
		&self,
		machine: &mut Machine<S>,
		handle: &mut H,
		opcode: Opcode,
		operand: Operand,
	) -> Control {
		self.0[opcode.as_usize()](machine, handle, opcode, operand)
	}

	/// Wrap to create a new Etable.
	pub fn wrap<FW, FR>(self, wrapper: FW) -> Etable<S, H, FR>
	where
		FW: Fn(F, Opcode) -> FR,
		FR: Fn(&mut Machine<S>, &mut H, Opcode, Operand) -> Control,
	{
		let mut current_opcode = Opcode(0);
		Etable(
			self.0.map(|f| {
				let fr = wrapper(f, current_opcode);
				if current_opcode != Opcode(255) {
					current_opcode.0 += 1;
				}
				fr
			}),
			PhantomData,
		)
	}
}

impl<S, H> Etable<S, H> {
	/// Table where every opcode is invalid.
	#[must_use]
	pub fn none() -> Self {
		Self([eval_unknown as _; 256], PhantomData)
	}
}

impl<S, H> Etable<S, H>
where
	S: AsRef<RuntimeState>,
	H: RuntimeBackend + RuntimeFunctions,
{
	/// The full opcode set.
	#[must_use]
	pub fn core() -> Self {
		let mut table = Self::none();

		table[Opcode::CONSTANT.as_usize()] = eval_constant as _;
		table[Opcode::CONTEXT.as_usize()] = eval_context as _;
		table[Opcode::DUP.as_usize()] = eval_dup as _;
		table[Opcode::ZIPMAP.as_usize()] = eval_zipmap as _;
		table[Opcode::CALL.as_usize()] = eval_call as _;

		table[Opcode::EQUAL_TO.as_usize()] = eval_equal_to as _;
		table[Opcode::LESS_THAN.as_usize()] = eval_less_than as _;
		table[Opcode::GREATER_THAN.as_usize()] = eval_greater_than as _;
		table[Opcode::IS_ZERO.as_usize()] = eval_is_zero as _;
		table[Opcode::EAGER_IF.as_usize()] = eval_eager_if as _;
		table[Opcode::ANY.as_usize()] = eval_any as _;
		table[Opcode::EVERY.as_usize()] = eval_every as _;
		table[Opcode::ENSURE.as_usize()] = eval_ensure as _;

		table[Opcode::BLOCK_NUMBER.as_usize()] = eval_block_number as _;
		table[Opcode::BLOCK_TIMESTAMP.as_usize()] = eval_block_timestamp as _;
		table[Opcode::SENDER.as_usize()] = eval_sender as _;
		table[Opcode::THIS_ADDRESS.as_usize()] = eval_this_address as _;

		table[Opcode::GET.as_usize()] = eval_get as _;
		table[Opcode::SET.as_usize()] = eval_set as _;

		table[Opcode::ADD.as_usize()] = eval_add as _;
		table[Opcode::SUB.as_usize()] = eval_sub as _;
		table[Opcode::MUL.as_usize()] = eval_mul as _;
		table[Opcode::DIV.as_usize()] = eval_div as _;
		table[Opcode::MOD.as_usize()] = eval_mod as _;
		table[Opcode::EXP.as_usize()] = eval_exp as _;
		table[Opcode::MIN.as_usize()] = eval_min as _;
		table[Opcode::MAX.as_usize()] = eval_max as _;
		table[Opcode::SATURATING_ADD.as_usize()] = eval_saturating_add as _;
		table[Opcode::SATURATING_SUB.as_usize()] = eval_saturating_sub as _;
		table[Opcode::SATURATING_MUL.as_usize()] = eval_saturating_mul as _;
		table[Opcode::HASH.as_usize()] = eval_hash as _;

		table
	}
}

fn eval_unknown<S, H>(
	_machine: &mut Machine<S>,
	_handle: &mut H,
	opcode: Opcode,
	_operand: Operand,
) -> Control {
	Control::Exit(ExitFatal::InvalidOpcode(opcode).into())
}
