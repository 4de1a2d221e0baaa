//! Gate collaborator: admission and tier reports computed by an expression
//! over a single account.

use alloc::vec;

use exvm_interpreter::{
	utils::h160_to_u256, Context, ExitError, ExitException, Expression, ExpressionShape,
	IntegrityError,
};
use primitive_types::{H160, U256};

use crate::{
	backend::{ApplyBackend, MergeStrategy, RuntimeBaseBackend},
	invoker::{EvalArgs, ExpressionId, Invoker},
};

/// A gating expression attached to an invoker. Source 0 reads the account
/// from context cell `(0, 0)` and leaves at least one word.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Gate {
	id: ExpressionId,
}

impl Gate {
	pub fn attach<B>(
		invoker: &mut Invoker<B>,
		host: H160,
		expression: Expression,
	) -> Result<Self, IntegrityError> {
		let shape = ExpressionShape::new(vec![1])
			.with_context(vec![1])
			.with_functions(invoker.function_count());
		let id = invoker.attach(host, expression, shape)?;
		Ok(Self { id })
	}

	pub fn id(&self) -> ExpressionId {
		self.id
	}

	fn args(account: H160, caller: H160) -> EvalArgs {
		EvalArgs {
			source: 0,
			context: Context::new(vec![vec![h160_to_u256(account)]]),
			caller,
			subject: U256::zero(),
		}
	}

	/// Whether `account` passes the gate. Only an admitting evaluation
	/// commits its store writes. A failed `ENSURE` or a zero top value
	/// means not admitted; any other failure is returned.
	pub fn admits<B: ApplyBackend>(
		&self,
		invoker: &mut Invoker<B>,
		account: H160,
		caller: H160,
	) -> Result<bool, ExitError> {
		let (output, changeset) = match invoker.transact(self.id, Self::args(account, caller)) {
			Ok(transacted) => transacted,
			Err(ExitError::Exception(ExitException::EnsureFailed(code))) => {
				log::debug!(
					target: "exvm",
					"Gate {} refused {:?} with code {}",
					self.id,
					account,
					code
				);
				return Ok(false);
			}
			Err(err) => return Err(err),
		};

		let admitted = output.last().map_or(false, |top| !top.is_zero());
		if admitted {
			invoker.finish(changeset, MergeStrategy::Commit);
		} else {
			log::debug!(target: "exvm", "Gate {} refused {:?}", self.id, account);
			invoker.finish(changeset, MergeStrategy::Discard);
		}
		Ok(admitted)
	}

	/// Top value of the expression for `account`, without committing.
	pub fn report<B: RuntimeBaseBackend>(
		&self,
		invoker: &Invoker<B>,
		account: H160,
	) -> Result<U256, ExitError> {
		let output = invoker.preview(self.id, Self::args(account, account))?;
		Ok(output.last().copied().unwrap_or_default())
	}
}
