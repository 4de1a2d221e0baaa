use core::fmt;

/// Width in bytes of one encoded operation: the opcode byte followed by a
/// big-endian `u16` operand.
pub const OP_WIDTH: usize = 3;

/// Opcode enum. One-to-one corresponding to an `u8` value.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Opcode(pub u8);

// Stack and input opcodes.
impl Opcode {
	/// `CONSTANT`
	pub const CONSTANT: Opcode = Opcode(0x00);
	/// `CONTEXT`
	pub const CONTEXT: Opcode = Opcode(0x01);
	/// `DUP`
	pub const DUP: Opcode = Opcode(0x02);
	/// `ZIPMAP`
	pub const ZIPMAP: Opcode = Opcode(0x03);
	/// `CALL`
	pub const CALL: Opcode = Opcode(0x04);
}

// Logic opcodes.
impl Opcode {
	/// `EQUAL_TO`
	pub const EQUAL_TO: Opcode = Opcode(0x10);
	/// `LESS_THAN`
	pub const LESS_THAN: Opcode = Opcode(0x11);
	/// `GREATER_THAN`
	pub const GREATER_THAN: Opcode = Opcode(0x12);
	/// `IS_ZERO`
	pub const IS_ZERO: Opcode = Opcode(0x13);
	/// `EAGER_IF`
	pub const EAGER_IF: Opcode = Opcode(0x14);
	/// `ANY`
	pub const ANY: Opcode = Opcode(0x15);
	/// `EVERY`
	pub const EVERY: Opcode = Opcode(0x16);
	/// `ENSURE`
	pub const ENSURE: Opcode = Opcode(0x17);
}

// Environment opcodes.
impl Opcode {
	/// `BLOCK_NUMBER`
	pub const BLOCK_NUMBER: Opcode = Opcode(0x20);
	/// `BLOCK_TIMESTAMP`
	pub const BLOCK_TIMESTAMP: Opcode = Opcode(0x21);
	/// `SENDER`
	pub const SENDER: Opcode = Opcode(0x22);
	/// `THIS_ADDRESS`
	pub const THIS_ADDRESS: Opcode = Opcode(0x23);
}

// State opcodes.
impl Opcode {
	/// `GET`
	pub const GET: Opcode = Opcode(0x30);
	/// `SET`
	pub const SET: Opcode = Opcode(0x31);
}

// Math opcodes.
impl Opcode {
	/// `ADD`
	pub const ADD: Opcode = Opcode(0x40);
	/// `SUB`
	pub const SUB: Opcode = Opcode(0x41);
	/// `MUL`
	pub const MUL: Opcode = Opcode(0x42);
	/// `DIV`
	pub const DIV: Opcode = Opcode(0x43);
	/// `MOD`
	pub const MOD: Opcode = Opcode(0x44);
	/// `EXP`
	pub const EXP: Opcode = Opcode(0x45);
	/// `MIN`
	pub const MIN: Opcode = Opcode(0x46);
	/// `MAX`
	pub const MAX: Opcode = Opcode(0x47);
	/// `SATURATING_ADD`
	pub const SATURATING_ADD: Opcode = Opcode(0x48);
	/// `SATURATING_SUB`
	pub const SATURATING_SUB: Opcode = Opcode(0x49);
	/// `SATURATING_MUL`
	pub const SATURATING_MUL: Opcode = Opcode(0x4a);

	/// `HASH`
	pub const HASH: Opcode = Opcode(0x50);
}

const NAMES: &[(Opcode, &str)] = &[
	(Opcode::CONSTANT, "constant"),
	(Opcode::CONTEXT, "context"),
	(Opcode::DUP, "dup"),
	(Opcode::ZIPMAP, "zipmap"),
	(Opcode::CALL, "call"),
	(Opcode::EQUAL_TO, "equal_to"),
	(Opcode::LESS_THAN, "less_than"),
	(Opcode::GREATER_THAN, "greater_than"),
	(Opcode::IS_ZERO, "is_zero"),
	(Opcode::EAGER_IF, "eager_if"),
	(Opcode::ANY, "any"),
	(Opcode::EVERY, "every"),
	(Opcode::ENSURE, "ensure"),
	(Opcode::BLOCK_NUMBER, "block_number"),
	(Opcode::BLOCK_TIMESTAMP, "block_timestamp"),
	(Opcode::SENDER, "sender"),
	(Opcode::THIS_ADDRESS, "this_address"),
	(Opcode::GET, "get"),
	(Opcode::SET, "set"),
	(Opcode::ADD, "add"),
	(Opcode::SUB, "sub"),
	(Opcode::MUL, "mul"),
	(Opcode::DIV, "div"),
	(Opcode::MOD, "mod"),
	(Opcode::EXP, "exp"),
	(Opcode::MIN, "min"),
	(Opcode::MAX, "max"),
	(Opcode::SATURATING_ADD, "saturating_add"),
	(Opcode::SATURATING_SUB, "saturating_sub"),
	(Opcode::SATURATING_MUL, "saturating_mul"),
	(Opcode::HASH, "hash"),
];

impl Opcode {
	/// Raw opcode byte.
	#[inline]
	#[must_use]
	pub const fn as_u8(&self) -> u8 {
		self.0
	}

	/// Cast the opcode to `usize`, for table lookups.
	#[inline]
	#[must_use]
	pub const fn as_usize(&self) -> usize {
		self.0 as usize
	}

	/// Lower case mnemonic of a known opcode.
	#[must_use]
	pub fn name(&self) -> Option<&'static str> {
		NAMES
			.iter()
			.find(|(opcode, _)| opcode == self)
			.map(|(_, name)| *name)
	}

	/// Look up an opcode by mnemonic. Case insensitive.
	#[must_use]
	pub fn from_name(name: &str) -> Option<Opcode> {
		NAMES
			.iter()
			.find(|(_, n)| n.eq_ignore_ascii_case(name))
			.map(|(opcode, _)| *opcode)
	}
}

impl fmt::Debug for Opcode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.name() {
			Some(name) => write!(f, "{}", name.to_ascii_uppercase()),
			None => write!(f, "Opcode(0x{:02x})", self.0),
		}
	}
}

/// Raw 16-bit operand of an operation, with decoders for the packed layouts
/// used by `CONTEXT`, `ZIPMAP` and `CALL`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Operand(pub u16);

/// Decoded `ZIPMAP` operand.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ZipmapOperand {
	/// Index of the source run on each iteration.
	pub source: usize,
	/// Number of words handed to each iteration.
	pub inputs: usize,
	/// Number of iterations.
	pub iterations: usize,
}

/// Decoded `CALL` operand.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CallOperand {
	/// Index of the registered extension function.
	pub function: usize,
	/// Number of words popped and passed to the function.
	pub inputs: usize,
	/// Number of words the function must return.
	pub outputs: usize,
}

impl Operand {
	/// Largest source index a `ZIPMAP` operand can address.
	pub const MAX_ZIPMAP_SOURCE: usize = 0x1f;
	/// Largest input count a `ZIPMAP` operand can carry.
	pub const MAX_ZIPMAP_INPUTS: usize = 0x1f;
	/// Largest iteration count a `ZIPMAP` operand can carry.
	pub const MAX_ZIPMAP_ITERATIONS: usize = 0x3f;
	/// Largest input or output count a `CALL` operand can carry.
	pub const MAX_CALL_ARITY: usize = 0x0f;

	/// Operand as plain count or index.
	#[inline]
	#[must_use]
	pub const fn as_usize(&self) -> usize {
		self.0 as usize
	}

	/// `CONTEXT` operand: `(row, column)`.
	#[inline]
	#[must_use]
	pub const fn context(&self) -> (usize, usize) {
		((self.0 >> 8) as usize, (self.0 & 0xff) as usize)
	}

	/// Build a `CONTEXT` operand.
	#[must_use]
	pub const fn from_context(row: u8, column: u8) -> Self {
		Self(((row as u16) << 8) | column as u16)
	}

	/// `ZIPMAP` operand.
	#[inline]
	#[must_use]
	pub const fn zipmap(&self) -> ZipmapOperand {
		ZipmapOperand {
			source: (self.0 & 0x1f) as usize,
			inputs: ((self.0 >> 5) & 0x1f) as usize,
			iterations: ((self.0 >> 10) & 0x3f) as usize,
		}
	}

	/// Build a `ZIPMAP` operand. Returns `None` if a field does not fit.
	#[must_use]
	pub fn from_zipmap(source: usize, inputs: usize, iterations: usize) -> Option<Self> {
		if source > Self::MAX_ZIPMAP_SOURCE
			|| inputs > Self::MAX_ZIPMAP_INPUTS
			|| iterations > Self::MAX_ZIPMAP_ITERATIONS
		{
			return None;
		}
		Some(Self(
			(source as u16) | ((inputs as u16) << 5) | ((iterations as u16) << 10),
		))
	}

	/// `CALL` operand.
	#[inline]
	#[must_use]
	pub const fn call(&self) -> CallOperand {
		CallOperand {
			function: (self.0 & 0xff) as usize,
			inputs: ((self.0 >> 8) & 0x0f) as usize,
			outputs: ((self.0 >> 12) & 0x0f) as usize,
		}
	}

	/// Build a `CALL` operand. Returns `None` if a field does not fit.
	#[must_use]
	pub fn from_call(function: usize, inputs: usize, outputs: usize) -> Option<Self> {
		if function > 0xff || inputs > Self::MAX_CALL_ARITY || outputs > Self::MAX_CALL_ARITY {
			return None;
		}
		Some(Self(
			(function as u16) | ((inputs as u16) << 8) | ((outputs as u16) << 12),
		))
	}
}

impl From<u16> for Operand {
	fn from(v: u16) -> Self {
		Self(v)
	}
}
