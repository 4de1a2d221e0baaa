use primitive_types::U256;

use crate::{
	error::{ExitException, ExitFatal},
	etable::Control,
	machine::Machine,
	opcode::Operand,
	runtime::{RuntimeFunctions, RuntimeState},
};

#[inline]
pub fn constant<S>(state: &mut Machine<S>, operand: Operand) -> Control {
	let value = match state.expression.constants.get(operand.as_usize()) {
		Some(value) => *value,
		None => return Control::Exit(ExitFatal::UncheckedSource.into()),
	};
	push_u256!(state, value);
	Control::Continue
}

#[inline]
pub fn context<S: AsRef<RuntimeState>>(state: &mut Machine<S>, operand: Operand) -> Control {
	let (row, column) = operand.context();
	let value = match state.state.as_ref().context.get(row, column) {
		Some(value) => value,
		None => return Control::Exit(ExitException::ContextMismatch.into()),
	};
	push_u256!(state, value);
	Control::Continue
}

#[inline]
pub fn dup<S>(state: &mut Machine<S>, operand: Operand) -> Control {
	let value = try_or_fail!(state.stack.peek(operand.as_usize()));
	push_u256!(state, value);
	Control::Continue
}

pub fn call<S, H: RuntimeFunctions>(
	state: &mut Machine<S>,
	handle: &mut H,
	operand: Operand,
) -> Control {
	let call = operand.call();
	let inputs = try_or_fail!(state.stack.popn(call.inputs));
	let outputs: alloc::vec::Vec<U256> = try_or_fail!(handle.call_function(call.function, &inputs));
	if outputs.len() != call.outputs {
		return Control::Exit(ExitException::InvalidFunctionOutput.into());
	}
	for value in outputs {
		push_u256!(state, value);
	}
	Control::Continue
}
