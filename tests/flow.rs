
use exvm::{
	backend::RuntimeBaseBackend,
	interpreter::utils::h160_to_u256,
	sentinel::{sentinel, SentinelError},
	Config, Erc20Transfer, ExitException, Flow, FlowError, NativeTransfer, Scope,
};
use primitive_types::{H160, U256};

use crate::mock::{args, assemble, caller, host, invoker, other, MockMover, Moved};

fn token() -> H160 {
	H160::from_low_u64_be(0x99)
}

/// Records a store write, then asks for one native transfer from the host
/// to the caller and one erc20 transfer of `context(0, 0)` tokens from
/// `erc20_from` to [other].
fn flow_text(erc20_from: &str) -> String {
	format!(
		"
		push 7
		push 1
		set
		push {sentinel}     # erc1155
		push {sentinel}     # erc721
		push {sentinel}     # erc20
		context 0 0
		push {other}
		{erc20_from}
		push {token}
		push {sentinel}     # native
		push 5
		sender
		this_address
		",
		sentinel = format!("0x{:x}", sentinel()),
		other = format!("0x{:x}", h160_to_u256(other())),
		token = format!("0x{:x}", h160_to_u256(token())),
		erc20_from = erc20_from,
	)
}

fn expected_native() -> NativeTransfer {
	NativeTransfer {
		from: host(),
		to: caller(),
		amount: U256::from(5),
	}
}

fn expected_erc20(from: H160) -> Erc20Transfer {
	Erc20Transfer {
		token: token(),
		from,
		to: other(),
		amount: U256::from(250),
	}
}

fn written(invoker: &exvm::Invoker<exvm::backend::InMemoryBackend>) -> U256 {
	invoker
		.backend()
		.storage(Scope::host(host()), U256::from(7))
}

#[test]
fn flow_moves_and_commits() {
	let mut invoker = invoker(Config::default());
	let flow = Flow::attach(&mut invoker, host(), assemble(&flow_text("sender")), vec![1]).unwrap();
	let mut mover = MockMover::default();

	let transfers = flow
		.flow(&mut invoker, &mut mover, args(0, vec![vec![U256::from(250)]]))
		.unwrap();

	assert_eq!(transfers.native, vec![expected_native()]);
	assert_eq!(transfers.erc20, vec![expected_erc20(caller())]);
	assert!(transfers.erc721.is_empty());
	assert!(transfers.erc1155.is_empty());
	assert_eq!(
		mover.moved,
		vec![
			Moved::Native(expected_native()),
			Moved::Erc20(expected_erc20(caller())),
		]
	);
	assert_eq!(written(&invoker), U256::one());
}

#[test]
fn preview_flow_neither_moves_nor_commits() {
	let mut invoker = invoker(Config::default());
	let flow = Flow::attach(&mut invoker, host(), assemble(&flow_text("sender")), vec![1]).unwrap();

	let transfers = flow
		.preview_flow(&invoker, args(0, vec![vec![U256::from(250)]]))
		.unwrap();
	assert_eq!(transfers.len(), 2);
	assert_eq!(written(&invoker), U256::zero());
}

#[test]
fn party_check_rejects_third_party_senders() {
	let text = flow_text(&format!("push 0x{:x}", h160_to_u256(other())));

	let mut checked = invoker(Config::default());
	let flow = Flow::attach(&mut checked, host(), assemble(&text), vec![1]).unwrap();
	let mut mover = MockMover::default();
	assert_eq!(
		flow.flow(&mut checked, &mut mover, args(0, vec![vec![U256::from(250)]])),
		Err(FlowError::UnauthorizedParty { from: other() })
	);
	assert!(mover.moved.is_empty());
	assert_eq!(written(&checked), U256::zero());

	let mut unchecked = invoker(Config::unchecked_flow());
	let flow = Flow::attach(&mut unchecked, host(), assemble(&text), vec![1]).unwrap();
	let transfers = flow
		.flow(&mut unchecked, &mut mover, args(0, vec![vec![U256::from(250)]]))
		.unwrap();
	assert_eq!(transfers.erc20, vec![expected_erc20(other())]);
	assert_eq!(written(&unchecked), U256::one());
}

#[test]
fn mover_failure_rolls_back_the_store() {
	let mut invoker = invoker(Config::default());
	let flow = Flow::attach(&mut invoker, host(), assemble(&flow_text("sender")), vec![1]).unwrap();
	let mut mover = MockMover {
		fail_at: Some(1),
		..Default::default()
	};

	assert_eq!(
		flow.flow(&mut invoker, &mut mover, args(0, vec![vec![U256::from(250)]])),
		Err(FlowError::Mover("mover refused".into()))
	);
	assert_eq!(mover.moved, vec![Moved::Native(expected_native())]);
	assert_eq!(written(&invoker), U256::zero());
}

#[test]
fn evaluation_and_decoding_failures() {
	let mut invoker = invoker(Config::default());
	let flow = Flow::attach(&mut invoker, host(), assemble(&flow_text("sender")), vec![1]).unwrap();
	let mut mover = MockMover::default();
	assert_eq!(
		flow.flow(&mut invoker, &mut mover, args(0, vec![])),
		Err(FlowError::Exit(ExitException::ContextMismatch.into()))
	);

	let flow = Flow::attach(
		&mut invoker,
		host(),
		assemble("push 1\npush 2\npush 3\npush 4"),
		vec![],
	)
	.unwrap();
	assert_eq!(
		flow.flow(&mut invoker, &mut mover, args(0, vec![])),
		Err(FlowError::Sentinel(SentinelError::TruncatedRecord {
			list: 0,
			record: 1,
		}))
	);
	assert!(mover.moved.is_empty());
}
