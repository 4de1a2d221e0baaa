//! Static integrity checker. Runs once when an expression is attached and
//! proves the stack bounds every later evaluation relies on.

use alloc::{vec, vec::Vec};
use core::fmt;

use crate::{
	expression::Expression,
	opcode::{Opcode, Operand, ZipmapOperand, OP_WIDTH},
};

/// Limits applied by the integrity checker.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntegrityConfig {
	/// Maximum stack height any source may reach.
	pub stack_limit: usize,
	/// Maximum number of sources in one expression.
	pub source_limit: usize,
	/// Maximum number of operations one run of an entrypoint may execute,
	/// counting every zipped iteration.
	pub work_limit: u64,
}

impl Default for IntegrityConfig {
	fn default() -> Self {
		Self {
			stack_limit: 1024,
			source_limit: 32,
			work_limit: 1 << 16,
		}
	}
}

/// What the attaching caller declares about an expression.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpressionShape {
	/// Width of every context row the expression may read.
	pub context: Vec<usize>,
	/// Number of extension functions reachable through `CALL`.
	pub functions: usize,
	/// Minimum output count of every entrypoint. Sources
	/// `0..min_outputs.len()` are entrypoints.
	pub min_outputs: Vec<usize>,
}

impl ExpressionShape {
	/// Shape with the given entrypoints, no context and no functions.
	#[must_use]
	pub fn new(min_outputs: Vec<usize>) -> Self {
		Self {
			context: Vec::new(),
			functions: 0,
			min_outputs,
		}
	}

	/// Declare the context row widths.
	#[must_use]
	pub fn with_context(mut self, context: Vec<usize>) -> Self {
		self.context = context;
		self
	}

	/// Declare the number of extension functions.
	#[must_use]
	pub fn with_functions(mut self, functions: usize) -> Self {
		self.functions = functions;
		self
	}
}

/// Checked bounds of one source.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceBounds {
	/// Words on the stack when the source starts.
	pub inputs: usize,
	/// Words on the stack when the source ends.
	pub outputs: usize,
	/// Highest stack the source can reach.
	pub max_height: usize,
	/// Operations one run of the source executes, zipped sources included.
	pub work: u64,
}

/// Kind of integrity fault.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntegrityErrorKind {
	/// Source length is not a multiple of the operation width.
	MalformedSource,
	/// Opcode id has no integrity function.
	InvalidOpcode,
	/// N-ary opcode with an arity of zero.
	ZeroArity,
	/// The operation would pop below the bottom of the stack.
	StackUnderflow,
	/// The operation would grow the stack past the configured limit.
	StackOverflow,
	/// Constant index past the end of the pool.
	ConstantOutOfRange,
	/// Context cell outside the declared shape.
	ContextOutOfRange,
	/// Source index past the last source.
	SourceOutOfRange,
	/// Function index past the declared function count.
	FunctionOutOfRange,
	/// More sources than the configured limit. The error names the first
	/// source past the limit.
	TooManySources,
	/// No entrypoint declared.
	NoEntrypoint,
	/// A source runs itself, directly or through other sources.
	RecursiveSource,
	/// A source that is neither an entrypoint nor run by `ZIPMAP`.
	UnreachableSource,
	/// A source is run with two different input counts.
	InputsMismatch,
	/// Running the source would execute more operations than the configured
	/// limit.
	WorkLimitExceeded,
	/// An entrypoint leaves fewer values than declared.
	InsufficientOutputs {
		/// Declared minimum.
		expected: usize,
		/// Values actually left.
		actual: usize,
	},
}

/// First integrity fault found in an expression.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntegrityError {
	/// Source index.
	pub source: usize,
	/// Operation index within the source, if the fault is tied to one.
	pub position: Option<usize>,
	/// Opcode of the faulting operation.
	pub opcode: Option<Opcode>,
	/// Operand of the faulting operation.
	pub operand: Option<Operand>,
	/// What went wrong.
	pub kind: IntegrityErrorKind,
}

impl IntegrityError {
	fn at_source(source: usize, kind: IntegrityErrorKind) -> Self {
		Self {
			source,
			position: None,
			opcode: None,
			operand: None,
			kind,
		}
	}
}

#[cfg(feature = "std")]
impl std::error::Error for IntegrityError {}

impl fmt::Display for IntegrityErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::MalformedSource => write!(f, "malformed source"),
			Self::InvalidOpcode => write!(f, "invalid opcode"),
			Self::ZeroArity => write!(f, "zero arity"),
			Self::StackUnderflow => write!(f, "stack underflow"),
			Self::StackOverflow => write!(f, "stack overflow"),
			Self::ConstantOutOfRange => write!(f, "constant out of range"),
			Self::ContextOutOfRange => write!(f, "context out of range"),
			Self::SourceOutOfRange => write!(f, "source out of range"),
			Self::FunctionOutOfRange => write!(f, "function out of range"),
			Self::TooManySources => write!(f, "too many sources"),
			Self::NoEntrypoint => write!(f, "no entrypoint"),
			Self::RecursiveSource => write!(f, "recursive source"),
			Self::UnreachableSource => write!(f, "unreachable source"),
			Self::InputsMismatch => write!(f, "source run with different input counts"),
			Self::WorkLimitExceeded => write!(f, "work limit exceeded"),
			Self::InsufficientOutputs { expected, actual } => {
				write!(f, "expected at least {} outputs, got {}", expected, actual)
			}
		}
	}
}

impl fmt::Display for IntegrityError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "integrity check failed in source {}", self.source)?;
		if let Some(position) = self.position {
			write!(f, " at operation {}", position)?;
		}
		if let Some(opcode) = self.opcode {
			write!(f, " ({:?}", opcode)?;
			if let Some(operand) = self.operand {
				write!(f, " 0x{:04x}", operand.0)?;
			}
			write!(f, ")")?;
		}
		write!(f, ": {}", self.kind)
	}
}

/// Static stack effect of one operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StackEffect {
	/// Pops and pushes known from the operation alone.
	Fixed {
		/// Words popped.
		pops: usize,
		/// Words pushed.
		pushes: usize,
	},
	/// Depends on the bounds of the zipped source.
	Zipmap(ZipmapOperand),
}

impl StackEffect {
	const fn fixed(pops: usize, pushes: usize) -> Self {
		Self::Fixed { pops, pushes }
	}
}

/// What an integrity function may look at.
pub struct IntegrityState<'a> {
	/// Size of the constant pool.
	pub constants: usize,
	/// Declared context row widths.
	pub context: &'a [usize],
	/// Number of sources.
	pub sources: usize,
	/// Declared function count.
	pub functions: usize,
	/// Stack height before the operation.
	pub height: usize,
}

/// Integrity function type.
pub type Ifn = fn(&IntegrityState<'_>, Operand) -> Result<StackEffect, IntegrityErrorKind>;

/// Integrity function of an opcode, or `None` if the opcode id is unused.
#[must_use]
pub fn integrity_fn(opcode: Opcode) -> Option<Ifn> {
	static TABLE: [Option<Ifn>; 256] = {
		let mut table: [Option<Ifn>; 256] = [None; 256];
		macro_rules! table_elem {
			($operation:ident, $state:ident, $operand:ident, $definition:expr) => {
				#[allow(non_snake_case)]
				fn $operation(
					$state: &IntegrityState<'_>,
					$operand: Operand,
				) -> Result<StackEffect, IntegrityErrorKind> {
					$definition
				}
				table[Opcode::$operation.as_usize()] = Some($operation as Ifn);
			};
			($operation:ident, $pops:expr, $pushes:expr) => {
				table_elem!($operation, _state, _operand, {
					Ok(StackEffect::fixed($pops, $pushes))
				})
			};
		}
		macro_rules! table_nary {
			($($operation:ident),*) => {
				$(
					table_elem!($operation, _state, operand, {
						if operand.as_usize() == 0 {
							return Err(IntegrityErrorKind::ZeroArity);
						}
						Ok(StackEffect::fixed(operand.as_usize(), 1))
					});
				)*
			};
		}

		table_elem!(CONSTANT, state, operand, {
			if operand.as_usize() >= state.constants {
				return Err(IntegrityErrorKind::ConstantOutOfRange);
			}
			Ok(StackEffect::fixed(0, 1))
		});
		table_elem!(CONTEXT, state, operand, {
			let (row, column) = operand.context();
			match state.context.get(row) {
				Some(width) if column < *width => Ok(StackEffect::fixed(0, 1)),
				_ => Err(IntegrityErrorKind::ContextOutOfRange),
			}
		});
		table_elem!(DUP, state, operand, {
			if operand.as_usize() >= state.height {
				return Err(IntegrityErrorKind::StackUnderflow);
			}
			Ok(StackEffect::fixed(0, 1))
		});
		table_elem!(ZIPMAP, state, operand, {
			let zipmap = operand.zipmap();
			if zipmap.source >= state.sources {
				return Err(IntegrityErrorKind::SourceOutOfRange);
			}
			Ok(StackEffect::Zipmap(zipmap))
		});
		table_elem!(CALL, state, operand, {
			let call = operand.call();
			if call.function >= state.functions {
				return Err(IntegrityErrorKind::FunctionOutOfRange);
			}
			Ok(StackEffect::fixed(call.inputs, call.outputs))
		});

		table_elem!(EQUAL_TO, 2, 1);
		table_elem!(LESS_THAN, 2, 1);
		table_elem!(GREATER_THAN, 2, 1);
		table_elem!(IS_ZERO, 1, 1);
		table_elem!(EAGER_IF, 3, 1);
		table_elem!(ENSURE, 1, 0);

		table_elem!(BLOCK_NUMBER, 0, 1);
		table_elem!(BLOCK_TIMESTAMP, 0, 1);
		table_elem!(SENDER, 0, 1);
		table_elem!(THIS_ADDRESS, 0, 1);

		table_elem!(GET, 1, 1);
		table_elem!(SET, 2, 0);

		table_nary!(
			ANY,
			EVERY,
			ADD,
			SUB,
			MUL,
			DIV,
			MOD,
			EXP,
			MIN,
			MAX,
			SATURATING_ADD,
			SATURATING_SUB,
			SATURATING_MUL,
			HASH
		);

		table
	};

	TABLE[opcode.as_usize()]
}

/// Check an expression against its declared shape. On success returns the
/// bounds of every source, indexed by source.
pub fn check(
	expression: &Expression,
	shape: &ExpressionShape,
	config: &IntegrityConfig,
) -> Result<Vec<SourceBounds>, IntegrityError> {
	let count = expression.sources.len();
	if count > config.source_limit {
		return Err(IntegrityError::at_source(
			config.source_limit,
			IntegrityErrorKind::TooManySources,
		));
	}
	if shape.min_outputs.is_empty() {
		return Err(IntegrityError::at_source(0, IntegrityErrorKind::NoEntrypoint));
	}
	if shape.min_outputs.len() > count {
		return Err(IntegrityError::at_source(
			count,
			IntegrityErrorKind::SourceOutOfRange,
		));
	}
	for (index, source) in expression.sources.iter().enumerate() {
		if source.len() % OP_WIDTH != 0 {
			return Err(IntegrityError::at_source(
				index,
				IntegrityErrorKind::MalformedSource,
			));
		}
	}

	let mut checker = Checker {
		expression,
		shape,
		config,
		bounds: vec![None; count],
		visiting: vec![false; count],
	};

	for (index, min_outputs) in shape.min_outputs.iter().enumerate() {
		let bounds = match checker.bounds[index] {
			Some(bounds) if bounds.inputs != 0 => {
				return Err(IntegrityError::at_source(
					index,
					IntegrityErrorKind::InputsMismatch,
				))
			}
			Some(bounds) => bounds,
			None => checker.source(index, 0)?,
		};
		if bounds.outputs < *min_outputs {
			return Err(IntegrityError::at_source(
				index,
				IntegrityErrorKind::InsufficientOutputs {
					expected: *min_outputs,
					actual: bounds.outputs,
				},
			));
		}
	}

	checker
		.bounds
		.into_iter()
		.enumerate()
		.map(|(index, bounds)| {
			bounds.ok_or_else(|| {
				IntegrityError::at_source(index, IntegrityErrorKind::UnreachableSource)
			})
		})
		.collect()
}

struct Checker<'a> {
	expression: &'a Expression,
	shape: &'a ExpressionShape,
	config: &'a IntegrityConfig,
	bounds: Vec<Option<SourceBounds>>,
	visiting: Vec<bool>,
}

impl<'a> Checker<'a> {
	fn source(&mut self, index: usize, inputs: usize) -> Result<SourceBounds, IntegrityError> {
		let expression = self.expression;
		self.visiting[index] = true;

		let mut height = inputs;
		let mut max_height = inputs;
		let mut work: u64 = 0;
		if max_height > self.config.stack_limit {
			return Err(IntegrityError::at_source(
				index,
				IntegrityErrorKind::StackOverflow,
			));
		}

		for (position, op) in expression.ops(index) {
			let fault = |kind| IntegrityError {
				source: index,
				position: Some(position),
				opcode: Some(op.opcode),
				operand: Some(op.operand),
				kind,
			};

			let f = integrity_fn(op.opcode).ok_or_else(|| fault(IntegrityErrorKind::InvalidOpcode))?;
			let state = IntegrityState {
				constants: expression.constants.len(),
				context: &self.shape.context,
				sources: expression.sources.len(),
				functions: self.shape.functions,
				height,
			};
			let (pops, pushes, cost) = match f(&state, op.operand).map_err(fault)? {
				StackEffect::Fixed { pops, pushes } => (pops, pushes, 1),
				StackEffect::Zipmap(zipmap) => {
					let child = match self.bounds[zipmap.source] {
						Some(child) if child.inputs != zipmap.inputs => {
							return Err(fault(IntegrityErrorKind::InputsMismatch))
						}
						Some(child) => child,
						None if self.visiting[zipmap.source] => {
							return Err(fault(IntegrityErrorKind::RecursiveSource))
						}
						None => self.source(zipmap.source, zipmap.inputs)?,
					};
					(
						zipmap.inputs * zipmap.iterations,
						child.outputs * zipmap.iterations,
						(zipmap.iterations as u64)
							.saturating_mul(child.work)
							.saturating_add(1),
					)
				}
			};

			if height < pops {
				return Err(fault(IntegrityErrorKind::StackUnderflow));
			}
			height = height - pops + pushes;
			if height > self.config.stack_limit {
				return Err(fault(IntegrityErrorKind::StackOverflow));
			}
			max_height = max_height.max(height);

			work = work.saturating_add(cost);
			if work > self.config.work_limit {
				return Err(fault(IntegrityErrorKind::WorkLimitExceeded));
			}
		}

		let bounds = SourceBounds {
			inputs,
			outputs: height,
			max_height,
			work,
		};
		self.visiting[index] = false;
		self.bounds[index] = Some(bounds);
		Ok(bounds)
	}
}

#[cfg(test)]
mod tests {
	use primitive_types::U256;

	use super::*;
	use crate::expression::SourceBuilder;

	fn constants(n: u64) -> Vec<U256> {
		(0..n).map(U256::from).collect()
	}

	fn kind_of(
		sources: Vec<Vec<u8>>,
		constants: Vec<U256>,
		shape: ExpressionShape,
	) -> IntegrityErrorKind {
		let expression = Expression::new(sources, constants);
		check(&expression, &shape, &IntegrityConfig::default())
			.unwrap_err()
			.kind
	}

	#[test]
	fn computes_max_height() {
		let source = SourceBuilder::new()
			.op(Opcode::CONSTANT, 0)
			.op(Opcode::CONSTANT, 1)
			.op(Opcode::CONSTANT, 0)
			.op(Opcode::ADD, 3)
			.op(Opcode::DUP, 0)
			.build();
		let expression = Expression::new(vec![source], constants(2));
		let bounds = check(
			&expression,
			&ExpressionShape::new(vec![2]),
			&IntegrityConfig::default(),
		)
		.unwrap();
		assert_eq!(
			bounds,
			vec![SourceBounds {
				inputs: 0,
				outputs: 2,
				max_height: 3,
				work: 5,
			}]
		);
	}

	#[test]
	fn zipmap_bounds_use_child_outputs() {
		let outer = SourceBuilder::new()
			.op(Opcode::CONSTANT, 0)
			.op(Opcode::CONSTANT, 0)
			.op(Opcode::CONSTANT, 0)
			.op(Opcode::CONSTANT, 0)
			.op(Opcode::ZIPMAP, Operand::from_zipmap(1, 2, 2).unwrap().0)
			.build();
		// Two inputs, three outputs.
		let inner = SourceBuilder::new()
			.op(Opcode::DUP, 1)
			.op(Opcode::ADD, 2)
			.op(Opcode::DUP, 0)
			.build();
		let expression = Expression::new(vec![outer, inner], constants(1));
		let bounds = check(
			&expression,
			&ExpressionShape::new(vec![6]),
			&IntegrityConfig::default(),
		)
		.unwrap();
		assert_eq!(
			bounds[0],
			SourceBounds {
				inputs: 0,
				outputs: 6,
				max_height: 6,
				work: 11,
			}
		);
		assert_eq!(
			bounds[1],
			SourceBounds {
				inputs: 2,
				outputs: 3,
				max_height: 3,
				work: 3,
			}
		);
	}

	#[test]
	fn rejects_operand_faults() {
		let shape = ExpressionShape::new(vec![0]).with_context(vec![2]);

		let source = SourceBuilder::new().op(Opcode::CONSTANT, 1).build();
		assert_eq!(
			kind_of(vec![source], constants(1), shape.clone()),
			IntegrityErrorKind::ConstantOutOfRange
		);

		let source = SourceBuilder::new()
			.op(Opcode::CONTEXT, Operand::from_context(0, 2).0)
			.build();
		assert_eq!(
			kind_of(vec![source], constants(0), shape.clone()),
			IntegrityErrorKind::ContextOutOfRange
		);

		let source = SourceBuilder::new()
			.op(Opcode::CONTEXT, Operand::from_context(1, 0).0)
			.build();
		assert_eq!(
			kind_of(vec![source], constants(0), shape.clone()),
			IntegrityErrorKind::ContextOutOfRange
		);

		let source = SourceBuilder::new()
			.op(Opcode::CALL, Operand::from_call(0, 0, 1).unwrap().0)
			.build();
		assert_eq!(
			kind_of(vec![source], constants(0), shape.clone()),
			IntegrityErrorKind::FunctionOutOfRange
		);

		let source = SourceBuilder::new()
			.op(Opcode::ZIPMAP, Operand::from_zipmap(4, 0, 1).unwrap().0)
			.build();
		assert_eq!(
			kind_of(vec![source], constants(0), shape.clone()),
			IntegrityErrorKind::SourceOutOfRange
		);

		let source = SourceBuilder::new().op(Opcode::ANY, 0).build();
		assert_eq!(
			kind_of(vec![source], constants(0), shape.clone()),
			IntegrityErrorKind::ZeroArity
		);

		let source = SourceBuilder::new().op0(Opcode(0xfe)).build();
		assert_eq!(
			kind_of(vec![source], constants(0), shape),
			IntegrityErrorKind::InvalidOpcode
		);
	}

	#[test]
	fn rejects_stack_faults() {
		let shape = ExpressionShape::new(vec![0]);

		let source = SourceBuilder::new()
			.op(Opcode::CONSTANT, 0)
			.op0(Opcode::EQUAL_TO)
			.build();
		let err = check(
			&Expression::new(vec![source], constants(1)),
			&shape,
			&IntegrityConfig::default(),
		)
		.unwrap_err();
		assert_eq!(err.kind, IntegrityErrorKind::StackUnderflow);
		assert_eq!(err.position, Some(1));
		assert_eq!(err.opcode, Some(Opcode::EQUAL_TO));

		let source = SourceBuilder::new()
			.op(Opcode::CONSTANT, 0)
			.op(Opcode::DUP, 1)
			.build();
		assert_eq!(
			kind_of(vec![source], constants(1), shape.clone()),
			IntegrityErrorKind::StackUnderflow
		);

		let source = SourceBuilder::new()
			.op(Opcode::CONSTANT, 0)
			.op(Opcode::CONSTANT, 0)
			.op(Opcode::CONSTANT, 0)
			.build();
		let err = check(
			&Expression::new(vec![source], constants(1)),
			&shape,
			&IntegrityConfig {
				stack_limit: 2,
				..IntegrityConfig::default()
			},
		)
		.unwrap_err();
		assert_eq!(err.kind, IntegrityErrorKind::StackOverflow);
		assert_eq!(err.position, Some(2));
	}

	#[test]
	fn rejects_expression_faults() {
		assert_eq!(
			kind_of(vec![vec![0x00, 0x00]], constants(1), ExpressionShape::new(vec![0])),
			IntegrityErrorKind::MalformedSource
		);
		assert_eq!(
			kind_of(vec![Vec::new()], constants(0), ExpressionShape::new(vec![])),
			IntegrityErrorKind::NoEntrypoint
		);
		assert_eq!(
			kind_of(vec![Vec::new()], constants(0), ExpressionShape::new(vec![0, 0])),
			IntegrityErrorKind::SourceOutOfRange
		);
		assert_eq!(
			kind_of(
				vec![Vec::new(), Vec::new()],
				constants(0),
				ExpressionShape::new(vec![0])
			),
			IntegrityErrorKind::UnreachableSource
		);
		assert_eq!(
			kind_of(vec![Vec::new()], constants(0), ExpressionShape::new(vec![1])),
			IntegrityErrorKind::InsufficientOutputs {
				expected: 1,
				actual: 0
			}
		);

		let sources = vec![Vec::new(); 3];
		let err = check(
			&Expression::new(sources, constants(0)),
			&ExpressionShape::new(vec![0, 0, 0]),
			&IntegrityConfig {
				source_limit: 2,
				..IntegrityConfig::default()
			},
		)
		.unwrap_err();
		assert_eq!(err.kind, IntegrityErrorKind::TooManySources);
		assert_eq!(err.source, 2);
	}

	#[test]
	fn rejects_recursion_and_mismatched_inputs() {
		let recursive = SourceBuilder::new()
			.op(Opcode::ZIPMAP, Operand::from_zipmap(1, 0, 1).unwrap().0)
			.build();
		let back = SourceBuilder::new()
			.op(Opcode::ZIPMAP, Operand::from_zipmap(0, 0, 1).unwrap().0)
			.build();
		assert_eq!(
			kind_of(
				vec![recursive, back],
				constants(0),
				ExpressionShape::new(vec![0])
			),
			IntegrityErrorKind::RecursiveSource
		);

		let outer = SourceBuilder::new()
			.op(Opcode::CONSTANT, 0)
			.op(Opcode::ZIPMAP, Operand::from_zipmap(1, 1, 1).unwrap().0)
			.op(Opcode::CONSTANT, 0)
			.op(Opcode::CONSTANT, 0)
			.op(Opcode::ZIPMAP, Operand::from_zipmap(1, 2, 1).unwrap().0)
			.build();
		assert_eq!(
			kind_of(
				vec![outer, Vec::new()],
				constants(1),
				ExpressionShape::new(vec![0])
			),
			IntegrityErrorKind::InputsMismatch
		);
	}

	#[test]
	fn bounds_work_of_nested_zipmaps() {
		// Source `i` runs source `i + 1` 63 times; the last source is empty.
		let chain = |len: usize| -> Vec<Vec<u8>> {
			(0..len)
				.map(|index| {
					if index + 1 == len {
						return Vec::new();
					}
					SourceBuilder::new()
						.op(
							Opcode::ZIPMAP,
							Operand::from_zipmap(index + 1, 0, 63).unwrap().0,
						)
						.build()
				})
				.collect()
		};

		let bounds = check(
			&Expression::new(chain(4), Vec::new()),
			&ExpressionShape::new(vec![0]),
			&IntegrityConfig::default(),
		)
		.unwrap();
		assert_eq!(
			bounds.iter().map(|b| b.work).collect::<Vec<_>>(),
			vec![1 + 63 * 64, 64, 1, 0]
		);

		let err = check(
			&Expression::new(chain(9), Vec::new()),
			&ExpressionShape::new(vec![0]),
			&IntegrityConfig::default(),
		)
		.unwrap_err();
		assert_eq!(err.kind, IntegrityErrorKind::WorkLimitExceeded);
		assert_eq!(err.source, 4);
		assert_eq!(err.position, Some(0));
		assert_eq!(err.opcode, Some(Opcode::ZIPMAP));

		let err = check(
			&Expression::new(chain(3), Vec::new()),
			&ExpressionShape::new(vec![0]),
			&IntegrityConfig {
				work_limit: 63,
				..IntegrityConfig::default()
			},
		)
		.unwrap_err();
		assert_eq!(err.kind, IntegrityErrorKind::WorkLimitExceeded);
		assert_eq!(err.source, 0);
	}

	#[test]
	fn display_names_the_fault() {
		let source = SourceBuilder::new().op(Opcode::CONSTANT, 3).build();
		let err = check(
			&Expression::new(vec![source], Vec::new()),
			&ExpressionShape::new(vec![1]),
			&IntegrityConfig::default(),
		)
		.unwrap_err();
		assert_eq!(
			alloc::format!("{}", err),
			"integrity check failed in source 0 at operation 0 (CONSTANT 0x0003): constant out of range"
		);
	}
}
