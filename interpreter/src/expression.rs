//! Compiled expressions: sources of fixed-width operations plus a shared
//! constant pool.

use alloc::vec::Vec;

use primitive_types::U256;

use crate::opcode::{Opcode, Operand, OP_WIDTH};

/// One decoded operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Op {
	/// Opcode.
	pub opcode: Opcode,
	/// Operand.
	pub operand: Operand,
}

impl Op {
	/// Create a new operation.
	#[must_use]
	pub const fn new(opcode: Opcode, operand: u16) -> Self {
		Self {
			opcode,
			operand: Operand(operand),
		}
	}

	/// Encode into the wire form.
	#[must_use]
	pub const fn encode(&self) -> [u8; OP_WIDTH] {
		let operand = self.operand.0.to_be_bytes();
		[self.opcode.0, operand[0], operand[1]]
	}

	/// Decode the operation starting at byte `offset` of `source`. Returns
	/// `None` if fewer than [OP_WIDTH] bytes remain.
	#[must_use]
	pub fn decode(source: &[u8], offset: usize) -> Option<Self> {
		let bytes = source.get(offset..offset.checked_add(OP_WIDTH)?)?;
		Some(Self {
			opcode: Opcode(bytes[0]),
			operand: Operand(u16::from_be_bytes([bytes[1], bytes[2]])),
		})
	}
}

/// An expression: one or more sources and the constant pool they share.
/// Immutable once attached.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Expression {
	/// Encoded sources.
	pub sources: Vec<Vec<u8>>,
	/// Constant pool.
	pub constants: Vec<U256>,
}

impl Expression {
	/// Create a new expression.
	#[must_use]
	pub fn new(sources: Vec<Vec<u8>>, constants: Vec<U256>) -> Self {
		Self { sources, constants }
	}

	/// Encoded bytes of the given source.
	#[must_use]
	pub fn source(&self, index: usize) -> Option<&[u8]> {
		self.sources.get(index).map(|s| &s[..])
	}

	/// Iterate the operations of a source, yielding `(position, op)` where
	/// `position` is the operation index. Trailing bytes that do not form a
	/// whole operation are not yielded.
	pub fn ops(&self, index: usize) -> impl Iterator<Item = (usize, Op)> + '_ {
		let source = self.source(index).unwrap_or(&[]);
		(0..source.len() / OP_WIDTH)
			.filter_map(move |i| Op::decode(source, i * OP_WIDTH).map(|op| (i, op)))
	}
}

/// Builder for a single encoded source.
#[derive(Clone, Debug, Default)]
pub struct SourceBuilder(Vec<u8>);

impl SourceBuilder {
	/// Create an empty source.
	#[must_use]
	pub fn new() -> Self {
		Self(Vec::new())
	}

	/// Append an operation.
	#[must_use]
	pub fn op(mut self, opcode: Opcode, operand: u16) -> Self {
		self.0.extend_from_slice(&Op::new(opcode, operand).encode());
		self
	}

	/// Append an operation without an operand.
	#[must_use]
	pub fn op0(self, opcode: Opcode) -> Self {
		self.op(opcode, 0)
	}

	/// Finish the source.
	#[must_use]
	pub fn build(self) -> Vec<u8> {
		self.0
	}
}
