//! Text form of expressions.
//!
//! One operation per line, `#` starts a comment and a line holding only
//! `---` starts the next source. Numbers are decimal or `0x` hex.
//!
//! ```text
//! push 10          # allocate a constant and load it
//! context 0 1      # row, column
//! less_than
//! ensure 7
//! ---
//! dup 0
//! add 2
//! ```
//!
//! `zipmap` takes `source inputs iterations`, `call` takes
//! `function inputs outputs`, every other opcode takes an optional plain
//! operand. `raw <opcode> <operand>` emits an operation by id, and
//! `const <value>` appends a value to the constant pool without emitting an
//! operation, so `constant <index>` can address it.

use alloc::{
	format,
	string::{String, ToString},
	vec::Vec,
};
use core::fmt;

use primitive_types::U256;

use crate::{
	expression::{Expression, Op},
	opcode::{Opcode, Operand},
};

/// Assembler error, naming the 1-based line it occurred on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AsmError {
	/// Line number, starting at 1.
	pub line: usize,
	/// What went wrong.
	pub kind: AsmErrorKind,
}

/// Kind of assembler error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AsmErrorKind {
	/// Mnemonic does not name an opcode.
	UnknownOpcode(String),
	/// Token is not a number, or does not fit its slot.
	InvalidNumber(String),
	/// Wrong number of operands for the mnemonic.
	OperandCount {
		/// Operands the mnemonic takes.
		expected: usize,
		/// Operands given.
		found: usize,
	},
	/// A packed operand field does not fit.
	OperandOutOfRange,
	/// More constants than a `CONSTANT` operand can address.
	TooManyConstants,
}

#[cfg(feature = "std")]
impl std::error::Error for AsmError {}

impl fmt::Display for AsmError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "line {}: ", self.line)?;
		match &self.kind {
			AsmErrorKind::UnknownOpcode(name) => write!(f, "unknown opcode `{}`", name),
			AsmErrorKind::InvalidNumber(token) => write!(f, "invalid number `{}`", token),
			AsmErrorKind::OperandCount { expected, found } => {
				write!(f, "expected {} operands, found {}", expected, found)
			}
			AsmErrorKind::OperandOutOfRange => write!(f, "operand out of range"),
			AsmErrorKind::TooManyConstants => write!(f, "too many constants"),
		}
	}
}

fn parse_u256(token: &str) -> Result<U256, AsmErrorKind> {
	let parsed = match token.strip_prefix("0x") {
		Some(hex) => U256::from_str_radix(hex, 16).ok(),
		None => U256::from_dec_str(token).ok(),
	};
	parsed.ok_or_else(|| AsmErrorKind::InvalidNumber(token.to_string()))
}

fn parse_usize(token: &str) -> Result<usize, AsmErrorKind> {
	let parsed = match token.strip_prefix("0x") {
		Some(hex) => usize::from_str_radix(hex, 16).ok(),
		None => token.parse().ok(),
	};
	parsed.ok_or_else(|| AsmErrorKind::InvalidNumber(token.to_string()))
}

fn parse_u16(token: &str) -> Result<u16, AsmErrorKind> {
	u16::try_from(parse_usize(token)?).map_err(|_| AsmErrorKind::InvalidNumber(token.to_string()))
}

fn parse_u8(token: &str) -> Result<u8, AsmErrorKind> {
	u8::try_from(parse_usize(token)?).map_err(|_| AsmErrorKind::InvalidNumber(token.to_string()))
}

fn expect_operands(args: &[&str], expected: usize) -> Result<(), AsmErrorKind> {
	if args.len() != expected {
		return Err(AsmErrorKind::OperandCount {
			expected,
			found: args.len(),
		});
	}
	Ok(())
}

#[derive(Default)]
struct Assembler {
	sources: Vec<Vec<u8>>,
	current: Vec<u8>,
	constants: Vec<U256>,
}

impl Assembler {
	fn emit(&mut self, op: Op) {
		self.current.extend_from_slice(&op.encode());
	}

	fn constant(&mut self, value: U256) -> Result<u16, AsmErrorKind> {
		if let Some(index) = self.constants.iter().position(|c| *c == value) {
			return u16::try_from(index).map_err(|_| AsmErrorKind::TooManyConstants);
		}
		let index = u16::try_from(self.constants.len()).map_err(|_| AsmErrorKind::TooManyConstants)?;
		self.constants.push(value);
		Ok(index)
	}

	fn line(&mut self, mnemonic: &str, args: &[&str]) -> Result<(), AsmErrorKind> {
		if mnemonic.eq_ignore_ascii_case("push") {
			expect_operands(args, 1)?;
			let index = self.constant(parse_u256(args[0])?)?;
			self.emit(Op::new(Opcode::CONSTANT, index));
			return Ok(());
		}
		if mnemonic.eq_ignore_ascii_case("const") {
			expect_operands(args, 1)?;
			if self.constants.len() > u16::MAX as usize {
				return Err(AsmErrorKind::TooManyConstants);
			}
			self.constants.push(parse_u256(args[0])?);
			return Ok(());
		}
		if mnemonic.eq_ignore_ascii_case("raw") {
			expect_operands(args, 2)?;
			self.emit(Op::new(Opcode(parse_u8(args[0])?), parse_u16(args[1])?));
			return Ok(());
		}

		let opcode = Opcode::from_name(mnemonic)
			.ok_or_else(|| AsmErrorKind::UnknownOpcode(mnemonic.to_string()))?;
		let operand = match opcode {
			Opcode::CONTEXT => {
				expect_operands(args, 2)?;
				Operand::from_context(parse_u8(args[0])?, parse_u8(args[1])?)
			}
			Opcode::ZIPMAP => {
				expect_operands(args, 3)?;
				Operand::from_zipmap(
					parse_usize(args[0])?,
					parse_usize(args[1])?,
					parse_usize(args[2])?,
				)
				.ok_or(AsmErrorKind::OperandOutOfRange)?
			}
			Opcode::CALL => {
				expect_operands(args, 3)?;
				Operand::from_call(
					parse_usize(args[0])?,
					parse_usize(args[1])?,
					parse_usize(args[2])?,
				)
				.ok_or(AsmErrorKind::OperandOutOfRange)?
			}
			_ => match args {
				[] => Operand(0),
				[operand] => Operand(parse_u16(operand)?),
				_ => {
					return Err(AsmErrorKind::OperandCount {
						expected: 1,
						found: args.len(),
					})
				}
			},
		};
		self.emit(Op { opcode, operand });
		Ok(())
	}

	fn finish_source(&mut self) {
		self.sources.push(core::mem::take(&mut self.current));
	}
}

/// Assemble expression text.
pub fn assemble(text: &str) -> Result<Expression, AsmError> {
	let mut assembler = Assembler::default();

	for (index, raw) in text.lines().enumerate() {
		let line = raw.split('#').next().unwrap_or("").trim();
		if line.is_empty() {
			continue;
		}
		if line == "---" {
			assembler.finish_source();
			continue;
		}

		let mut tokens = line.split_whitespace();
		let mnemonic = tokens.next().unwrap_or("");
		let args: Vec<&str> = tokens.collect();
		assembler
			.line(mnemonic, &args)
			.map_err(|kind| AsmError {
				line: index + 1,
				kind,
			})?;
	}
	assembler.finish_source();

	Ok(Expression::new(assembler.sources, assembler.constants))
}

/// Render an expression as text that assembles back to the same expression.
/// The pool is written as leading `const` lines and loads as
/// `constant <index>`, so pool order and duplicates are kept.
#[must_use]
pub fn disassemble(expression: &Expression) -> String {
	let mut out = String::new();
	for (index, constant) in expression.constants.iter().enumerate() {
		out.push_str(&format!("const 0x{:x}    # {}\n", constant, index));
	}

	for index in 0..expression.sources.len() {
		if index > 0 {
			out.push_str("---\n");
		}
		for (_, op) in expression.ops(index) {
			let line = match (op.opcode, op.opcode.name()) {
				(Opcode::CONTEXT, _) => {
					let (row, column) = op.operand.context();
					format!("context {} {}", row, column)
				}
				(Opcode::ZIPMAP, _) => {
					let zipmap = op.operand.zipmap();
					format!(
						"zipmap {} {} {}",
						zipmap.source, zipmap.inputs, zipmap.iterations
					)
				}
				(Opcode::CALL, _) => {
					let call = op.operand.call();
					format!("call {} {} {}", call.function, call.inputs, call.outputs)
				}
				(_, Some(name)) if op.operand.0 == 0 => name.to_string(),
				(_, Some(name)) => format!("{} {}", name, op.operand.0),
				(opcode, None) => format!("raw 0x{:02x} 0x{:04x}", opcode.0, op.operand.0),
			};
			out.push_str(&line);
			out.push('\n');
		}
	}
	out
}
