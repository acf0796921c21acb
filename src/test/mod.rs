//! Function fixtures shared by the unit tests.

use crate::ir::{BinaryOp, BlockId, ComparePredicate, Function, FunctionBuilder};

/// `entry -> {left, right} -> join`, branching on the only argument. No values are computed.
pub fn diamond() -> (Function, [BlockId; 4]) {
    let mut b = FunctionBuilder::new("diamond");
    let cond = b.add_argument();
    let entry = b.create_block();
    let left = b.create_block();
    let right = b.create_block();
    let join = b.create_block();
    b.cond_br(entry, cond, left, right).unwrap();
    b.br(left, join).unwrap();
    b.br(right, join).unwrap();
    b.ret(join, None).unwrap();
    (b.build().unwrap(), [entry, left, right, join])
}

/// `2 * max(a, b)`, with the maximum selected by a phi in the join block.
pub fn max_function() -> Function {
    let mut b = FunctionBuilder::new("max");
    let a = b.add_argument();
    let c = b.add_argument();
    let entry = b.create_named_block("entry");
    let take_a = b.create_named_block("take_a");
    let take_b = b.create_named_block("take_b");
    let join = b.create_named_block("join");

    let gt = b.compare(entry, ComparePredicate::Gt, a, c).unwrap();
    b.cond_br(entry, gt, take_a, take_b).unwrap();
    let x = b.copy(take_a, a).unwrap();
    b.br(take_a, join).unwrap();
    let y = b.copy(take_b, c).unwrap();
    b.br(take_b, join).unwrap();
    let m = b.phi(join, &[(take_a, x), (take_b, y)]).unwrap();
    let doubled = b.binary(join, BinaryOp::Add, m, m).unwrap();
    b.ret(join, Some(doubled)).unwrap();
    b.build().unwrap()
}

/// A single block computing `x * x` and returning it.
pub fn straight_line() -> Function {
    let mut b = FunctionBuilder::new("line");
    let x = b.add_argument();
    let entry = b.create_block();
    let y = b.binary(entry, BinaryOp::Mul, x, x).unwrap();
    b.ret(entry, Some(y)).unwrap();
    b.build().unwrap()
}
