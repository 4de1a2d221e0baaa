
use exvm::{
	backend::{MergeStrategy, RuntimeBaseBackend},
	Config, ExitError, ExitException, ExitFatal, ExpressionId, ExpressionShape,
	IntegrityErrorKind, Scope,
};
use primitive_types::U256;

use crate::mock::{args, assemble, caller, host, invoker, other, words};

const COUNTER: &str = "
	push 1        # key
	push 1
	get
	push 1
	add 2         # stored + 1
	set
	push 1
	get
";

#[test]
fn store_persists_across_evaluations() {
	let mut invoker = invoker(Config::default());
	let id = invoker
		.attach(host(), assemble(COUNTER), ExpressionShape::new(vec![1]))
		.unwrap();

	assert_eq!(invoker.evaluate(id, args(0, vec![])).unwrap(), words(&[1]));
	assert_eq!(invoker.evaluate(id, args(0, vec![])).unwrap(), words(&[2]));
	assert_eq!(invoker.evaluate(id, args(0, vec![])).unwrap(), words(&[3]));
	assert_eq!(
		invoker.backend().storage(Scope::host(host()), U256::one()),
		U256::from(3)
	);
	assert_eq!(
		invoker.backend().storage(Scope::host(host()), U256::from(2)),
		U256::zero()
	);
}

#[test]
fn hosts_and_subjects_do_not_collide() {
	let mut invoker = invoker(Config::default());
	let first = invoker
		.attach(host(), assemble(COUNTER), ExpressionShape::new(vec![1]))
		.unwrap();
	let second = invoker
		.attach(other(), assemble(COUNTER), ExpressionShape::new(vec![1]))
		.unwrap();

	invoker.evaluate(first, args(0, vec![])).unwrap();
	invoker.evaluate(first, args(0, vec![])).unwrap();
	assert_eq!(invoker.evaluate(second, args(0, vec![])).unwrap(), words(&[1]));

	let mut segment = args(0, vec![]);
	segment.subject = U256::from(7);
	assert_eq!(invoker.evaluate(first, segment).unwrap(), words(&[1]));
	assert_eq!(invoker.evaluate(first, args(0, vec![])).unwrap(), words(&[3]));

	let backend = invoker.backend();
	assert_eq!(backend.storage.len(), 3);
	assert_eq!(
		backend.storage(
			Scope {
				host: host(),
				subject: U256::from(7),
			},
			U256::one()
		),
		U256::one()
	);
}

#[test]
fn failed_ensure_rolls_back_writes() {
	let mut invoker = invoker(Config::default());
	let id = invoker
		.attach(
			host(),
			assemble("push 1\npush 9\nset\npush 0\nensure 4\npush 1"),
			ExpressionShape::new(vec![1]),
		)
		.unwrap();

	assert_eq!(
		invoker.evaluate(id, args(0, vec![])),
		Err(ExitException::EnsureFailed(4).into())
	);
	assert!(invoker.backend().storage.is_empty());
}

#[test]
fn preview_matches_evaluate_and_does_not_commit() {
	let mut invoker = invoker(Config::default());
	let id = invoker
		.attach(host(), assemble(COUNTER), ExpressionShape::new(vec![1]))
		.unwrap();

	let previewed = invoker.preview(id, args(0, vec![])).unwrap();
	assert!(invoker.backend().storage.is_empty());
	assert_eq!(invoker.preview(id, args(0, vec![])).unwrap(), previewed);

	let evaluated = invoker.evaluate(id, args(0, vec![])).unwrap();
	assert_eq!(previewed, evaluated);
	assert_eq!(invoker.backend().storage.len(), 1);
}

#[test]
fn transact_then_discard() {
	let mut invoker = invoker(Config::default());
	let id = invoker
		.attach(host(), assemble(COUNTER), ExpressionShape::new(vec![1]))
		.unwrap();

	let (output, changeset) = invoker.transact(id, args(0, vec![])).unwrap();
	assert_eq!(output, words(&[1]));
	assert_eq!(changeset.len(), 1);
	invoker.finish(changeset, MergeStrategy::Discard);
	assert!(invoker.backend().storage.is_empty());

	let (_, changeset) = invoker.transact(id, args(0, vec![])).unwrap();
	invoker.finish(changeset, MergeStrategy::Commit);
	assert_eq!(invoker.backend().storage.len(), 1);
}

#[test]
fn caller_errors() {
	let mut invoker = invoker(Config::default());
	let id = invoker
		.attach(
			host(),
			assemble("context 0 1\n---\npush 1"),
			ExpressionShape::new(vec![1, 1]).with_context(vec![2]),
		)
		.unwrap();

	assert_eq!(
		invoker.evaluate(ExpressionId(9), args(0, vec![words(&[1, 2])])),
		Err(ExitFatal::UnknownExpression.into())
	);
	assert_eq!(
		invoker.evaluate(id, args(2, vec![words(&[1, 2])])),
		Err(ExitFatal::NotEntrypoint.into())
	);
	assert_eq!(
		invoker.evaluate(id, args(0, vec![words(&[1])])),
		Err(ExitException::ContextMismatch.into())
	);
	assert_eq!(
		invoker.evaluate(id, args(0, vec![words(&[1, 2])])).unwrap(),
		words(&[2])
	);
	assert_eq!(
		invoker.evaluate(id, args(1, vec![words(&[1, 2])])).unwrap(),
		words(&[1])
	);
}

#[test]
fn environment_reaches_the_expression() {
	let mut invoker = invoker(Config::default());
	let id = invoker
		.attach(
			host(),
			assemble("block_number\nsender\nthis_address"),
			ExpressionShape::new(vec![3]),
		)
		.unwrap();

	let output = invoker.evaluate(id, args(0, vec![])).unwrap();
	assert_eq!(output[0], U256::from(100));
	assert_eq!(output[1], exvm::interpreter::utils::h160_to_u256(caller()));
	assert_eq!(output[2], exvm::interpreter::utils::h160_to_u256(host()));
}

#[test]
fn attach_rejects_bad_expressions() {
	let mut invoker = invoker(Config::default());

	let err = invoker
		.attach(host(), assemble("push 1"), ExpressionShape::new(vec![2]))
		.unwrap_err();
	assert_eq!(
		err.kind,
		IntegrityErrorKind::InsufficientOutputs {
			expected: 2,
			actual: 1,
		}
	);

	let err = invoker
		.attach(host(), assemble("push 1\nadd 2"), ExpressionShape::new(vec![1]))
		.unwrap_err();
	assert_eq!(err.kind, IntegrityErrorKind::StackUnderflow);
	assert_eq!(err.position, Some(1));

	assert_eq!(invoker.function_count(), 0);
	let err = invoker
		.attach(
			host(),
			assemble("push 1\ncall 0 1 1"),
			ExpressionShape::new(vec![1]).with_functions(4),
		)
		.unwrap_err();
	assert_eq!(err.kind, IntegrityErrorKind::FunctionOutOfRange);
	assert_eq!(invoker.host(ExpressionId(0)), None);
}

#[test]
fn registered_functions_are_callable() {
	let mut invoker = invoker(Config::default());
	let sum = invoker.register_function(|inputs: &[U256]| -> Result<Vec<U256>, ExitError> {
		Ok(vec![inputs[0] + inputs[1], inputs[0]])
	});
	let fail = invoker.register_function(|_: &[U256]| -> Result<Vec<U256>, ExitError> {
		Err(ExitException::FunctionFailed("unpriced".into()).into())
	});
	assert_eq!((sum, fail), (0, 1));

	let id = invoker
		.attach(
			host(),
			assemble("push 3\npush 4\ncall 0 2 2\n---\ncall 1 0 1"),
			ExpressionShape::new(vec![2, 1]).with_functions(2),
		)
		.unwrap();

	assert_eq!(invoker.evaluate(id, args(0, vec![])).unwrap(), words(&[7, 3]));
	assert_eq!(
		invoker.evaluate(id, args(1, vec![])),
		Err(ExitException::FunctionFailed("unpriced".into()).into())
	);
}

#[test]
fn zipmap_runs_child_sources() {
	let mut invoker = invoker(Config::default());
	let id = invoker
		.attach(
			host(),
			assemble(
				"
				push 1
				push 2
				push 3
				zipmap 1 1 3
				---
				push 10
				mul 2
				",
			),
			ExpressionShape::new(vec![3]),
		)
		.unwrap();

	assert_eq!(invoker.bounds(id).unwrap()[1].inputs, 1);
	assert_eq!(
		invoker.evaluate(id, args(0, vec![])).unwrap(),
		words(&[10, 20, 30])
	);
}

#[test]
fn attach_rejects_unbounded_work() {
	let chain = |len: usize| -> String {
		(1..len)
			.map(|next| format!("zipmap {} 0 63\n---\n", next))
			.collect::<String>()
	};
	let mut invoker = invoker(Config::default());

	let id = invoker
		.attach(host(), assemble(&chain(4)), ExpressionShape::new(vec![0]))
		.unwrap();
	assert_eq!(invoker.bounds(id).unwrap()[0].work, 1 + 63 * 64);
	assert_eq!(invoker.evaluate(id, args(0, vec![])).unwrap(), Vec::<U256>::new());

	let err = invoker
		.attach(host(), assemble(&chain(9)), ExpressionShape::new(vec![0]))
		.unwrap_err();
	assert_eq!(err.kind, IntegrityErrorKind::WorkLimitExceeded);
}
