//! Flow collaborator: an expression that describes asset transfers as
//! sentinel-delimited lists.

use alloc::{borrow::Cow, vec, vec::Vec};
use core::fmt;

use exvm_interpreter::{
	utils::u256_to_h160, ExitError, Expression, ExpressionShape, IntegrityError,
};
use primitive_types::{H160, U256};

use crate::{
	backend::{ApplyBackend, MergeStrategy, RuntimeBaseBackend},
	invoker::{EvalArgs, ExpressionId, Invoker},
	sentinel::{decode_lists, SentinelError},
};

/// Record widths of the four transfer kinds, in decoding order.
pub const FLOW_WIDTHS: [usize; 4] = [3, 4, 4, 5];

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NativeTransfer {
	pub from: H160,
	pub to: H160,
	pub amount: U256,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Erc20Transfer {
	pub token: H160,
	pub from: H160,
	pub to: H160,
	pub amount: U256,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Erc721Transfer {
	pub token: H160,
	pub from: H160,
	pub to: H160,
	pub id: U256,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Erc1155Transfer {
	pub token: H160,
	pub from: H160,
	pub to: H160,
	pub id: U256,
	pub amount: U256,
}

/// Every transfer one flow evaluation asks for.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlowTransfers {
	pub native: Vec<NativeTransfer>,
	pub erc20: Vec<Erc20Transfer>,
	pub erc721: Vec<Erc721Transfer>,
	pub erc1155: Vec<Erc1155Transfer>,
}

impl FlowTransfers {
	/// Total number of transfers.
	#[must_use]
	pub fn len(&self) -> usize {
		self.native.len() + self.erc20.len() + self.erc721.len() + self.erc1155.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Decode the four transfer lists from an evaluation output.
	pub fn decode(output: &[U256]) -> Result<Self, FlowError> {
		let lists = decode_lists(output, &FLOW_WIDTHS)?;
		let mut lists = lists.into_iter();
		let mut next = || lists.next().unwrap_or_default();

		let native = records(next(), |r| {
			Ok(NativeTransfer {
				from: address(r[0])?,
				to: address(r[1])?,
				amount: r[2],
			})
		})?;
		let erc20 = records(next(), |r| {
			Ok(Erc20Transfer {
				token: address(r[0])?,
				from: address(r[1])?,
				to: address(r[2])?,
				amount: r[3],
			})
		})?;
		let erc721 = records(next(), |r| {
			Ok(Erc721Transfer {
				token: address(r[0])?,
				from: address(r[1])?,
				to: address(r[2])?,
				id: r[3],
			})
		})?;
		let erc1155 = records(next(), |r| {
			Ok(Erc1155Transfer {
				token: address(r[0])?,
				from: address(r[1])?,
				to: address(r[2])?,
				id: r[3],
				amount: r[4],
			})
		})?;

		Ok(Self {
			native,
			erc20,
			erc721,
			erc1155,
		})
	}

	/// Senders of every transfer, in decoding order.
	pub fn senders(&self) -> impl Iterator<Item = H160> + '_ {
		self.native
			.iter()
			.map(|t| t.from)
			.chain(self.erc20.iter().map(|t| t.from))
			.chain(self.erc721.iter().map(|t| t.from))
			.chain(self.erc1155.iter().map(|t| t.from))
	}
}

fn records<T>(
	list: Vec<Vec<U256>>,
	f: impl Fn(&[U256]) -> Result<T, FlowError>,
) -> Result<Vec<T>, FlowError> {
	list.iter().map(|record| f(record.as_slice())).collect()
}

fn address(word: U256) -> Result<H160, FlowError> {
	if word.bits() > 160 {
		return Err(FlowError::InvalidAddress(word));
	}
	Ok(u256_to_h160(word))
}

/// Executes the transfers a flow decoded. Asset movement itself lives
/// outside this crate.
#[auto_impl::auto_impl(&mut, Box)]
pub trait AssetMover {
	fn move_native(&mut self, transfer: &NativeTransfer) -> Result<(), Cow<'static, str>>;
	fn move_erc20(&mut self, transfer: &Erc20Transfer) -> Result<(), Cow<'static, str>>;
	fn move_erc721(&mut self, transfer: &Erc721Transfer) -> Result<(), Cow<'static, str>>;
	fn move_erc1155(&mut self, transfer: &Erc1155Transfer) -> Result<(), Cow<'static, str>>;
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FlowError {
	/// The evaluation failed.
	Exit(ExitError),
	/// The output is not four well-formed transfer lists.
	Sentinel(SentinelError),
	/// A transfer is sent by neither the caller nor the host.
	UnauthorizedParty { from: H160 },
	/// A word meant as an address has bits above 160.
	InvalidAddress(U256),
	/// The asset mover refused a transfer.
	Mover(Cow<'static, str>),
}

#[cfg(feature = "std")]
impl std::error::Error for FlowError {}

impl fmt::Display for FlowError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Exit(e) => write!(f, "{}", e),
			Self::Sentinel(e) => write!(f, "malformed flow output: {}", e),
			Self::UnauthorizedParty { from } => {
				write!(f, "transfer from {:?} is not authorised", from)
			}
			Self::InvalidAddress(word) => write!(f, "{:#x} is not an address", word),
			Self::Mover(reason) => write!(f, "asset mover failed: {}", reason),
		}
	}
}

impl From<ExitError> for FlowError {
	fn from(e: ExitError) -> Self {
		Self::Exit(e)
	}
}

impl From<SentinelError> for FlowError {
	fn from(e: SentinelError) -> Self {
		Self::Sentinel(e)
	}
}

/// A flow expression attached to an invoker.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Flow {
	id: ExpressionId,
}

impl Flow {
	/// Attach `expression` as a flow of `host`. Source 0 must leave at
	/// least the four list sentinels.
	pub fn attach<B>(
		invoker: &mut Invoker<B>,
		host: H160,
		expression: Expression,
		context: Vec<usize>,
	) -> Result<Self, IntegrityError> {
		let shape = ExpressionShape::new(vec![FLOW_WIDTHS.len()])
			.with_context(context)
			.with_functions(invoker.function_count());
		let id = invoker.attach(host, expression, shape)?;
		Ok(Self { id })
	}

	pub fn id(&self) -> ExpressionId {
		self.id
	}

	/// Evaluate and decode without moving assets or committing.
	pub fn preview_flow<B: RuntimeBaseBackend>(
		&self,
		invoker: &Invoker<B>,
		args: EvalArgs,
	) -> Result<FlowTransfers, FlowError> {
		let output = invoker.preview(self.id, args)?;
		FlowTransfers::decode(&output)
	}

	/// Evaluate, authorise and move every transfer, then commit the store.
	/// Nothing is committed if any step fails; transfers the mover already
	/// executed are the mover's to undo.
	pub fn flow<B: ApplyBackend, M: AssetMover>(
		&self,
		invoker: &mut Invoker<B>,
		mut mover: M,
		args: EvalArgs,
	) -> Result<FlowTransfers, FlowError> {
		let caller = args.caller;
		let (output, changeset) = invoker.transact(self.id, args)?;

		match self.execute(invoker, &mut mover, caller, &output) {
			Ok(transfers) => {
				log::debug!(
					target: "exvm",
					"Flow {} moved {} transfers",
					self.id,
					transfers.len()
				);
				invoker.finish(changeset, MergeStrategy::Commit);
				Ok(transfers)
			}
			Err(err) => {
				log::debug!(target: "exvm", "Flow {} failed: {}", self.id, err);
				invoker.finish(changeset, MergeStrategy::Discard);
				Err(err)
			}
		}
	}

	fn execute<B, M: AssetMover>(
		&self,
		invoker: &Invoker<B>,
		mover: &mut M,
		caller: H160,
		output: &[U256],
	) -> Result<FlowTransfers, FlowError> {
		let transfers = FlowTransfers::decode(output)?;

		if invoker.config().flow_party_check {
			let host = invoker.host(self.id).unwrap_or_default();
			if let Some(from) = transfers
				.senders()
				.find(|from| *from != caller && *from != host)
			{
				return Err(FlowError::UnauthorizedParty { from });
			}
		}

		for transfer in &transfers.native {
			mover.move_native(transfer).map_err(FlowError::Mover)?;
		}
		for transfer in &transfers.erc20 {
			mover.move_erc20(transfer).map_err(FlowError::Mover)?;
		}
		for transfer in &transfers.erc721 {
			mover.move_erc721(transfer).map_err(FlowError::Mover)?;
		}
		for transfer in &transfers.erc1155 {
			mover.move_erc1155(transfer).map_err(FlowError::Mover)?;
		}

		Ok(transfers)
	}
}
