//! Bounded expression interpreter.

#![forbid(unsafe_code, unused_variables)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod asm;
mod error;
mod etable;
pub mod eval;
mod expression;
pub mod integrity;
mod interpreter;
mod machine;
mod opcode;
mod runtime;
pub mod utils;

pub use crate::error::{ExitError, ExitException, ExitFatal, ExitResult, ExitSucceed};
pub use crate::etable::{Control, Efn, Etable};
pub use crate::expression::{Expression, Op, SourceBuilder};
pub use crate::integrity::{
	check, ExpressionShape, IntegrityConfig, IntegrityError, IntegrityErrorKind, SourceBounds,
};
pub use crate::interpreter::EtableInterpreter;
pub use crate::machine::{Machine, Stack};
pub use crate::opcode::{CallOperand, Opcode, Operand, ZipmapOperand, OP_WIDTH};
pub use crate::runtime::{
	Context, RuntimeBackend, RuntimeBaseBackend, RuntimeEnvironment, RuntimeFunctions,
	RuntimeState, Scope,
};
