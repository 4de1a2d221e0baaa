use crate::{
	etable::Control,
	machine::Machine,
	runtime::{RuntimeBackend, RuntimeEnvironment, RuntimeState},
	utils::h160_to_u256,
};

pub fn block_number<S, H: RuntimeEnvironment>(machine: &mut Machine<S>, handler: &H) -> Control {
	push_u256!(machine, handler.block_number());
	Control::Continue
}

pub fn block_timestamp<S, H: RuntimeEnvironment>(machine: &mut Machine<S>, handler: &H) -> Control {
	push_u256!(machine, handler.block_timestamp());
	Control::Continue
}

pub fn sender<S: AsRef<RuntimeState>>(machine: &mut Machine<S>) -> Control {
	let caller = h160_to_u256(machine.state.as_ref().caller);
	push_u256!(machine, caller);
	Control::Continue
}

pub fn this_address<S: AsRef<RuntimeState>>(machine: &mut Machine<S>) -> Control {
	let host = h160_to_u256(machine.state.as_ref().scope.host);
	push_u256!(machine, host);
	Control::Continue
}

pub fn get<S: AsRef<RuntimeState>, H: RuntimeBackend>(
	machine: &mut Machine<S>,
	handler: &mut H,
) -> Control {
	let scope = machine.state.as_ref().scope;
	match machine
		.stack
		.perform_pop1_push1(|key| Ok((handler.storage(scope, *key), ())))
	{
		Ok(()) => Control::Continue,
		Err(e) => Control::Exit(e),
	}
}

pub fn set<S: AsRef<RuntimeState>, H: RuntimeBackend>(
	machine: &mut Machine<S>,
	handler: &mut H,
) -> Control {
	let scope = machine.state.as_ref().scope;
	match machine.stack.perform_pop2_push0(|key, value| {
		handler.set_storage(scope, *key, *value)?;
		Ok(((), ()))
	}) {
		Ok(()) => Control::Continue,
		Err(e) => Control::Exit(e),
	}
}
