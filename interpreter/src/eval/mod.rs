//! Actual opcode evaluation implementations.

#[macro_use]
mod macros;
mod logic;
mod math;
mod misc;
mod system;

use crate::{
	etable::Control,
	machine::Machine,
	opcode::{Opcode, Operand},
	runtime::{RuntimeBackend, RuntimeEnvironment, RuntimeFunctions, RuntimeState},
	utils::bool_to_u256,
};

/// `CONSTANT`
pub fn eval_constant<S, H>(
	machine: &mut Machine<S>,
	_handle: &mut H,
	_opcode: Opcode,
	operand: Operand,
) -> Control {
	self::misc::constant(machine, operand)
}

/// `CONTEXT`
pub fn eval_context<S: AsRef<RuntimeState>, H>(
	machine: &mut Machine<S>,
	_handle: &mut H,
	_opcode: Opcode,
	operand: Operand,
) -> Control {
	self::misc::context(machine, operand)
}

/// `DUP`
pub fn eval_dup<S, H>(
	machine: &mut Machine<S>,
	_handle: &mut H,
	_opcode: Opcode,
	operand: Operand,
) -> Control {
	self::misc::dup(machine, operand)
}

/// `ZIPMAP`
pub fn eval_zipmap<S, H>(
	_machine: &mut Machine<S>,
	_handle: &mut H,
	_opcode: Opcode,
	operand: Operand,
) -> Control {
	Control::Zipmap(operand.zipmap())
}

/// `CALL`
pub fn eval_call<S, H: RuntimeFunctions>(
	machine: &mut Machine<S>,
	handle: &mut H,
	_opcode: Opcode,
	operand: Operand,
) -> Control {
	self::misc::call(machine, handle, operand)
}

/// `EQUAL_TO`
pub fn eval_equal_to<S, H>(
	machine: &mut Machine<S>,
	_handle: &mut H,
	_opcode: Opcode,
	_operand: Operand,
) -> Control {
	op2_u256_bool_ref!(machine, eq)
}

/// `LESS_THAN`
pub fn eval_less_than<S, H>(
	machine: &mut Machine<S>,
	_handle: &mut H,
	_opcode: Opcode,
	_operand: Operand,
) -> Control {
	op2_u256_bool_ref!(machine, lt)
}

/// `GREATER_THAN`
pub fn eval_greater_than<S, H>(
	machine: &mut Machine<S>,
	_handle: &mut H,
	_opcode: Opcode,
	_operand: Operand,
) -> Control {
	op2_u256_bool_ref!(machine, gt)
}

/// `IS_ZERO`
pub fn eval_is_zero<S, H>(
	machine: &mut Machine<S>,
	_handle: &mut H,
	_opcode: Opcode,
	_operand: Operand,
) -> Control {
	op1_u256_fn!(machine, self::logic::is_zero)
}

/// `EAGER_IF`
pub fn eval_eager_if<S, H>(
	machine: &mut Machine<S>,
	_handle: &mut H,
	_opcode: Opcode,
	_operand: Operand,
) -> Control {
	op3_u256_fn!(machine, self::logic::eager_if)
}

/// `ANY`
pub fn eval_any<S, H>(
	machine: &mut Machine<S>,
	_handle: &mut H,
	_opcode: Opcode,
	operand: Operand,
) -> Control {
	opn_u256_fn!(machine, operand, self::logic::any)
}

/// `EVERY`
pub fn eval_every<S, H>(
	machine: &mut Machine<S>,
	_handle: &mut H,
	_opcode: Opcode,
	operand: Operand,
) -> Control {
	opn_u256_fn!(machine, operand, self::logic::every)
}

/// `ENSURE`
pub fn eval_ensure<S, H>(
	machine: &mut Machine<S>,
	_handle: &mut H,
	_opcode: Opcode,
	operand: Operand,
) -> Control {
	match machine
		.stack
		.perform_pop1_push0(|value| Ok(((), self::logic::ensure(*value, operand.0)?)))
	{
		Ok(()) => Control::Continue,
		Err(e) => Control::Exit(e),
	}
}

/// `BLOCK_NUMBER`
pub fn eval_block_number<S, H: RuntimeEnvironment>(
	machine: &mut Machine<S>,
	handle: &mut H,
	_opcode: Opcode,
	_operand: Operand,
) -> Control {
	self::system::block_number(machine, handle)
}

/// `BLOCK_TIMESTAMP`
pub fn eval_block_timestamp<S, H: RuntimeEnvironment>(
	machine: &mut Machine<S>,
	handle: &mut H,
	_opcode: Opcode,
	_operand: Operand,
) -> Control {
	self::system::block_timestamp(machine, handle)
}

/// `SENDER`
pub fn eval_sender<S: AsRef<RuntimeState>, H>(
	machine: &mut Machine<S>,
	_handle: &mut H,
	_opcode: Opcode,
	_operand: Operand,
) -> Control {
	self::system::sender(machine)
}

/// `THIS_ADDRESS`
pub fn eval_this_address<S: AsRef<RuntimeState>, H>(
	machine: &mut Machine<S>,
	_handle: &mut H,
	_opcode: Opcode,
	_operand: Operand,
) -> Control {
	self::system::this_address(machine)
}

/// `GET`
pub fn eval_get<S: AsRef<RuntimeState>, H: RuntimeBackend>(
	machine: &mut Machine<S>,
	handle: &mut H,
	_opcode: Opcode,
	_operand: Operand,
) -> Control {
	self::system::get(machine, handle)
}

/// `SET`
pub fn eval_set<S: AsRef<RuntimeState>, H: RuntimeBackend>(
	machine: &mut Machine<S>,
	handle: &mut H,
	_opcode: Opcode,
	_operand: Operand,
) -> Control {
	self::system::set(machine, handle)
}

macro_rules! eval_math {
	( $( $(#[$attr:meta])* $name:ident => $op:path ),* $(,)? ) => {
		$(
			$(#[$attr])*
			pub fn $name<S, H>(
				machine: &mut Machine<S>,
				_handle: &mut H,
				_opcode: Opcode,
				operand: Operand,
			) -> Control {
				opn_u256_fn!(machine, operand, $op)
			}
		)*
	};
}

eval_math! {
	/// `ADD`
	eval_add => self::math::add,
	/// `SUB`
	eval_sub => self::math::sub,
	/// `MUL`
	eval_mul => self::math::mul,
	/// `DIV`
	eval_div => self::math::div,
	/// `MOD`
	eval_mod => self::math::rem,
	/// `EXP`
	eval_exp => self::math::exp,
	/// `MIN`
	eval_min => self::math::min,
	/// `MAX`
	eval_max => self::math::max,
	/// `SATURATING_ADD`
	eval_saturating_add => self::math::saturating_add,
	/// `SATURATING_SUB`
	eval_saturating_sub => self::math::saturating_sub,
	/// `SATURATING_MUL`
	eval_saturating_mul => self::math::saturating_mul,
	/// `HASH`
	eval_hash => self::math::hash,
}
