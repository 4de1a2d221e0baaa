macro_rules! try_or_fail {
	( $e:expr ) => {
		match $e {
			Ok(v) => v,
			Err(e) => return Control::Exit(e.into()),
		}
	};
}

macro_rules! push_u256 {
	( $machine:expr, $( $x:expr ),* ) => (
		$(
			match $machine.stack.push($x) {
				Ok(()) => (),
				Err(e) => return Control::Exit(e),
			}
		)*
	)
}

macro_rules! op1_u256_fn {
	( $machine:expr, $op:path ) => {
		match $machine.stack.perform_pop1_push1(|a| Ok(($op(*a), ()))) {
			Ok(()) => Control::Continue,
			Err(e) => Control::Exit(e),
		}
	};
}

macro_rules! op2_u256_bool_ref {
	( $machine:expr, $op:ident ) => {
		match $machine
			.stack
			.perform_pop2_push1(|a, b| Ok((bool_to_u256(a.$op(b)), ())))
		{
			Ok(()) => Control::Continue,
			Err(e) => Control::Exit(e),
		}
	};
}

macro_rules! op3_u256_fn {
	( $machine:expr, $op:path ) => {
		match $machine
			.stack
			.perform_pop3_push1(|a, b, c| Ok(($op(*a, *b, *c), ())))
		{
			Ok(()) => Control::Continue,
			Err(e) => Control::Exit(e),
		}
	};
}

macro_rules! opn_u256_fn {
	( $machine:expr, $operand:expr, $op:path ) => {{
		let values = try_or_fail!($machine.stack.popn($operand.as_usize()));
		let ret = try_or_fail!($op(&values[..]));
		push_u256!($machine, ret);
		Control::Continue
	}};
}
