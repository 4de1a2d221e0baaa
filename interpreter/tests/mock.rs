#![allow(dead_code)]

use std::{collections::BTreeMap, rc::Rc};

use exvm_interpreter::{
	asm, check, Context, Etable, EtableInterpreter, ExitError, ExitException, ExpressionShape,
	IntegrityConfig, RuntimeBackend, RuntimeBaseBackend, RuntimeEnvironment, RuntimeFunctions,
	RuntimeState, Scope, SourceBounds,
};
use primitive_types::{H160, U256};

#[derive(Clone, Debug, Default)]
pub struct MockHandler {
	pub storage: BTreeMap<(Scope, U256), U256>,
	pub block_number: U256,
	pub block_timestamp: U256,
	pub calls: Vec<(usize, Vec<U256>)>,
}

impl RuntimeEnvironment for MockHandler {
	fn block_number(&self) -> U256 {
		self.block_number
	}

	fn block_timestamp(&self) -> U256 {
		self.block_timestamp
	}
}

impl RuntimeBaseBackend for MockHandler {
	fn storage(&self, scope: Scope, key: U256) -> U256 {
		self.storage.get(&(scope, key)).copied().unwrap_or_default()
	}
}

impl RuntimeBackend for MockHandler {
	fn set_storage(&mut self, scope: Scope, key: U256, value: U256) -> Result<(), ExitError> {
		self.storage.insert((scope, key), value);
		Ok(())
	}
}

/// Function 0 returns its inputs reversed, function 1 always fails.
impl RuntimeFunctions for MockHandler {
	fn call_function(&mut self, index: usize, inputs: &[U256]) -> Result<Vec<U256>, ExitError> {
		self.calls.push((index, inputs.to_vec()));
		match index {
			0 => Ok(inputs.iter().rev().copied().collect()),
			_ => Err(ExitException::FunctionFailed("mock failure".into()).into()),
		}
	}
}

pub fn host() -> H160 {
	H160::repeat_byte(0x11)
}

pub fn caller() -> H160 {
	H160::repeat_byte(0x22)
}

pub fn words(values: &[u64]) -> Vec<U256> {
	values.iter().map(|v| U256::from(*v)).collect()
}

pub fn state(context: Context) -> RuntimeState {
	RuntimeState {
		context: Rc::new(context),
		caller: caller(),
		scope: Scope::host(host()),
	}
}

pub fn bounds(text: &str, shape: &ExpressionShape) -> Vec<SourceBounds> {
	let expression = asm::assemble(text).unwrap();
	check(&expression, shape, &IntegrityConfig::default()).unwrap()
}

/// Assemble, check and run entrypoint 0 of `text`.
pub fn evaluate(
	text: &str,
	shape: ExpressionShape,
	context: Context,
	handler: &mut MockHandler,
) -> Result<Vec<U256>, ExitError> {
	let expression = Rc::new(asm::assemble(text).unwrap());
	let bounds: Rc<[SourceBounds]> = check(&expression, &shape, &IntegrityConfig::default())
		.unwrap()
		.into();
	let etable = Etable::core();

	let mut vm = EtableInterpreter::new(expression, 0, bounds, state(context), &etable)?;
	vm.run(handler)?;
	Ok(vm.deconstruct().stack.into_data())
}

/// Like [evaluate] with a single entrypoint of at least one output, no
/// context and both mock functions.
pub fn evaluate_simple(text: &str, handler: &mut MockHandler) -> Result<Vec<U256>, ExitError> {
	evaluate(
		text,
		ExpressionShape::new(vec![0]).with_functions(2),
		Context::default(),
		handler,
	)
}
