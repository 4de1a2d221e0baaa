//! Attaching expressions and evaluating them against a backend.

use alloc::{boxed::Box, rc::Rc, vec::Vec};
use core::fmt;

use exvm_interpreter::{
	check, Context, Control, Etable, EtableInterpreter, ExitError, ExitFatal, Expression,
	ExpressionShape, IntegrityError, Machine, Opcode, Operand, RuntimeBackend,
	RuntimeBaseBackend, RuntimeEnvironment, RuntimeFunctions, RuntimeState, Scope, SourceBounds,
};
use primitive_types::{H160, U256};

use crate::{
	backend::{ApplyBackend, MergeStrategy, OverlayedBackend, OverlayedChangeSet},
	Config,
};

/// Extension function reachable through `CALL`. Receives its inputs in push
/// order and must return exactly as many words as the calling operand
/// declares.
pub trait ExternalFunction {
	fn call(&self, inputs: &[U256]) -> Result<Vec<U256>, ExitError>;
}

impl<F> ExternalFunction for F
where
	F: Fn(&[U256]) -> Result<Vec<U256>, ExitError>,
{
	fn call(&self, inputs: &[U256]) -> Result<Vec<U256>, ExitError> {
		self(inputs)
	}
}

/// Handle of an attached expression.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpressionId(pub usize);

impl fmt::Display for ExpressionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Arguments of one evaluation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EvalArgs {
	/// Entrypoint to run.
	pub source: usize,
	/// Context rows.
	pub context: Context,
	/// Immediate caller.
	pub caller: H160,
	/// Store segment within the host.
	pub subject: U256,
}

struct Attached {
	host: H160,
	expression: Rc<Expression>,
	shape: ExpressionShape,
	bounds: Rc<[SourceBounds]>,
}

/// Handler seen by the interpreter: the overlay plus the registered
/// functions.
struct InvokerHandler<'a, B> {
	backend: OverlayedBackend<B>,
	functions: &'a [Box<dyn ExternalFunction>],
}

impl<'a, B: RuntimeEnvironment> RuntimeEnvironment for InvokerHandler<'a, B> {
	fn block_number(&self) -> U256 {
		self.backend.block_number()
	}

	fn block_timestamp(&self) -> U256 {
		self.backend.block_timestamp()
	}
}

impl<'a, B: RuntimeBaseBackend> RuntimeBaseBackend for InvokerHandler<'a, B> {
	fn storage(&self, scope: Scope, key: U256) -> U256 {
		self.backend.storage(scope, key)
	}
}

impl<'a, B: RuntimeBaseBackend> RuntimeBackend for InvokerHandler<'a, B> {
	fn set_storage(&mut self, scope: Scope, key: U256, value: U256) -> Result<(), ExitError> {
		self.backend.set_storage(scope, key, value)
	}
}

impl<'a, B> RuntimeFunctions for InvokerHandler<'a, B> {
	fn call_function(&mut self, index: usize, inputs: &[U256]) -> Result<Vec<U256>, ExitError> {
		match self.functions.get(index) {
			Some(function) => function.call(inputs),
			None => Err(ExitFatal::Other("unregistered function".into()).into()),
		}
	}
}

/// Owns the attached expressions, the store and the extension functions.
pub struct Invoker<B> {
	backend: B,
	config: Config,
	expressions: Vec<Attached>,
	functions: Vec<Box<dyn ExternalFunction>>,
}

impl<B> Invoker<B> {
	pub fn new(backend: B, config: Config) -> Self {
		Self {
			backend,
			config,
			expressions: Vec::new(),
			functions: Vec::new(),
		}
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn backend(&self) -> &B {
		&self.backend
	}

	pub fn into_backend(self) -> B {
		self.backend
	}

	/// Register an extension function, returning its `CALL` index. Only
	/// expressions attached afterwards can reach it.
	pub fn register_function<F: ExternalFunction + 'static>(&mut self, function: F) -> usize {
		self.functions.push(Box::new(function));
		self.functions.len() - 1
	}

	/// Number of registered extension functions.
	pub fn function_count(&self) -> usize {
		self.functions.len()
	}

	/// Integrity check `expression` and attach it to `host`. The declared
	/// function count is capped at the registered one.
	pub fn attach(
		&mut self,
		host: H160,
		expression: Expression,
		mut shape: ExpressionShape,
	) -> Result<ExpressionId, IntegrityError> {
		shape.functions = shape.functions.min(self.functions.len());

		let bounds = match check(&expression, &shape, &self.config.integrity) {
			Ok(bounds) => bounds,
			Err(err) => {
				log::debug!(target: "exvm", "Attach to host {:?} rejected: {}", host, err);
				return Err(err);
			}
		};

		let id = ExpressionId(self.expressions.len());
		log::debug!(
			target: "exvm",
			"Attached expression {} to host {:?}, bounds {:?}",
			id,
			host,
			bounds
		);
		self.expressions.push(Attached {
			host,
			expression: Rc::new(expression),
			shape,
			bounds: bounds.into(),
		});
		Ok(id)
	}

	/// Host an expression is attached to.
	pub fn host(&self, id: ExpressionId) -> Option<H160> {
		self.expressions.get(id.0).map(|attached| attached.host)
	}

	pub fn expression(&self, id: ExpressionId) -> Option<&Expression> {
		self.expressions.get(id.0).map(|attached| &*attached.expression)
	}

	pub fn shape(&self, id: ExpressionId) -> Option<&ExpressionShape> {
		self.expressions.get(id.0).map(|attached| &attached.shape)
	}

	pub fn bounds(&self, id: ExpressionId) -> Option<&[SourceBounds]> {
		self.expressions.get(id.0).map(|attached| &attached.bounds[..])
	}
}

impl<B: RuntimeBaseBackend> Invoker<B> {
	/// Evaluate an entrypoint without touching the store. Returns the output
	/// and the writes the evaluation made, to be handed to [Invoker::finish].
	pub fn transact(
		&self,
		id: ExpressionId,
		args: EvalArgs,
	) -> Result<(Vec<U256>, OverlayedChangeSet), ExitError> {
		let attached = self
			.expressions
			.get(id.0)
			.ok_or(ExitFatal::UnknownExpression)?;
		if args.source >= attached.shape.min_outputs.len() {
			return Err(ExitFatal::NotEntrypoint.into());
		}
		args.context.check_shape(&attached.shape.context)?;

		let state = RuntimeState {
			context: Rc::new(args.context),
			caller: args.caller,
			scope: Scope {
				host: attached.host,
				subject: args.subject,
			},
		};
		let mut handler = InvokerHandler {
			backend: OverlayedBackend::new(&self.backend),
			functions: &self.functions,
		};

		let etable = Etable::core();
		let result = if log::log_enabled!(target: "exvm", log::Level::Trace) {
			run(attached, args.source, state, &traced(etable), &mut handler)
		} else {
			run(attached, args.source, state, &etable, &mut handler)
		};

		match &result {
			Ok(output) => log::debug!(
				target: "exvm",
				"Evaluated {} source {}: {} outputs",
				id,
				args.source,
				output.len()
			),
			Err(err) => log::debug!(
				target: "exvm",
				"Evaluated {} source {}: {}",
				id,
				args.source,
				err
			),
		}

		let output = result?;
		let (_, changeset) = handler.backend.deconstruct();
		Ok((output, changeset))
	}

	/// Evaluate an entrypoint and discard its writes.
	pub fn preview(&self, id: ExpressionId, args: EvalArgs) -> Result<Vec<U256>, ExitError> {
		self.transact(id, args).map(|(output, _)| output)
	}
}

impl<B: ApplyBackend> Invoker<B> {
	/// Merge or drop the writes of a [Invoker::transact] call.
	pub fn finish(&mut self, changeset: OverlayedChangeSet, strategy: MergeStrategy) {
		log::trace!(
			target: "exvm",
			"Finishing change set of {} entries: {:?}",
			changeset.len(),
			strategy
		);
		match strategy {
			MergeStrategy::Commit => self.backend.apply_overlayed(&changeset),
			MergeStrategy::Discard => (),
		}
	}

	/// Evaluate an entrypoint and commit its writes. A failed evaluation
	/// writes nothing.
	pub fn evaluate(&mut self, id: ExpressionId, args: EvalArgs) -> Result<Vec<U256>, ExitError> {
		let (output, changeset) = self.transact(id, args)?;
		self.finish(changeset, MergeStrategy::Commit);
		Ok(output)
	}
}

fn run<H, F>(
	attached: &Attached,
	source: usize,
	state: RuntimeState,
	etable: &Etable<RuntimeState, H, F>,
	handler: &mut H,
) -> Result<Vec<U256>, ExitError>
where
	F: Fn(&mut Machine<RuntimeState>, &mut H, Opcode, Operand) -> Control,
{
	let mut vm = EtableInterpreter::new(
		attached.expression.clone(),
		source,
		attached.bounds.clone(),
		state,
		etable,
	)?;
	vm.run(handler)?;
	Ok(vm.deconstruct().stack.into_data())
}

/// Wrap every entry of `etable` with per-opcode trace logging.
fn traced<H, F>(
	etable: Etable<RuntimeState, H, F>,
) -> Etable<RuntimeState, H, impl Fn(&mut Machine<RuntimeState>, &mut H, Opcode, Operand) -> Control>
where
	F: Fn(&mut Machine<RuntimeState>, &mut H, Opcode, Operand) -> Control,
{
	etable.wrap(|f, _| {
		move |machine: &mut Machine<RuntimeState>, handle: &mut H, opcode: Opcode, operand: Operand| {
			log::trace!(
				target: "exvm",
				"Running opcode: {:?} {:#06x}, source {}, stack height {}",
				opcode,
				operand.0,
				machine.source_index(),
				machine.stack.len()
			);
			f(machine, handle, opcode, operand)
		}
	})
}
