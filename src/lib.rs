//! Bounded expression virtual machine.
//!
//! Expressions are integrity checked once when attached to an [Invoker] and
//! then evaluated against a storage backend. The [Flow] and [Gate]
//! collaborators build on the invoker.

#![forbid(unsafe_code, unused_variables)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod backend;
mod config;
mod flow;
mod gate;
mod invoker;
pub mod sentinel;

pub use exvm_interpreter as interpreter;
pub use exvm_interpreter::{
	asm, check, Context, ExitError, ExitException, ExitFatal, Expression, ExpressionShape,
	IntegrityConfig, IntegrityError, IntegrityErrorKind, Opcode, Scope, SourceBounds,
};

pub use crate::config::Config;
pub use crate::flow::{
	AssetMover, Erc1155Transfer, Erc20Transfer, Erc721Transfer, Flow, FlowError, FlowTransfers,
	NativeTransfer, FLOW_WIDTHS,
};
pub use crate::gate::Gate;
pub use crate::invoker::{EvalArgs, ExpressionId, ExternalFunction, Invoker};
