//! Random-tree generation.

use crate::node::Node;
use crate::op::{OpCode, ValueType};
use crate::program::Program;

const TERMINAL_PROB: f32 = 1.0 / 3.0;
const CONST_MIN: i32 = -10;
const CONST_MAX: i32 = 10;
const VOID_MEM_WRITE_PROB: f32 = 1.0 / 3.0;

/// Builds `SEQ(OUTPUT(<random Int tree>), OUTPUT(CONST 0))`, so a freshly
/// generated program always produces at least one output on evaluation.
pub fn create_random_program(num_inputs: usize, max_depth: usize) -> Program {
    let first_output = Node::with_children(OpCode::Output, 0, vec![random_tree(ValueType::Int, 0, num_inputs, max_depth)]);
    let second_output = Node::with_children(OpCode::Output, 0, vec![Node::new(OpCode::Const, 0)]);
    let root = Node::with_children(OpCode::Seq, 0, vec![first_output, second_output]);
    Program::new(root)
}

/// Recursive type-driven random tree generation (SPEC_FULL.md §4.2): with
/// probability 1/3, or once `depth == max_depth`, emit a terminal matching
/// `required`; otherwise pick uniformly among non-terminal operators of that
/// return type (`LIBRARY`/`FUNC_CALL`/`PARAM` excluded — library injection is a
/// separate variation step).
pub fn random_tree(required: ValueType, depth: usize, num_inputs: usize, max_depth: usize) -> Node {
    if depth >= max_depth || crate::random::bool(TERMINAL_PROB) {
        return random_terminal(required, num_inputs, depth, max_depth);
    }

    let ops: Vec<OpCode> = OpCode::sampleable(required).collect();
    let op = *crate::random::choose(&ops);
    let arity = op
        .arity()
        .fixed()
        .expect("sampleable() only yields fixed-arity operators");

    let children = (0..arity)
        .map(|_| {
            let child_type = child_required_type(op);
            random_tree(child_type, depth + 1, num_inputs, max_depth)
        })
        .collect();
    Node::with_children(op, 0, children)
}

/// Every fixed-arity non-ADF operator except `SEQ` takes `Int` children; `SEQ`
/// takes two `Void` children. `OUTPUT`/`MEM_WRITE` also take an `Int` child.
fn child_required_type(op: OpCode) -> ValueType {
    match op {
        OpCode::Seq => ValueType::Void,
        _ => ValueType::Int,
    }
}

fn random_terminal(required: ValueType, num_inputs: usize, depth: usize, max_depth: usize) -> Node {
    match required {
        ValueType::Int => random_int_terminal(num_inputs),
        ValueType::Void => random_void_terminal(num_inputs, depth, max_depth),
    }
}

fn random_int_terminal(num_inputs: usize) -> Node {
    match crate::random::index(3) {
        0 if num_inputs > 0 => Node::new(OpCode::Input, crate::random::index(num_inputs) as i32),
        1 => Node::new(OpCode::MemRead, crate::random::index(crate::config::MAX_MEMORY) as i32),
        _ => Node::new(OpCode::Const, crate::random::range(CONST_MIN..CONST_MAX)),
    }
}

fn random_void_terminal(num_inputs: usize, depth: usize, max_depth: usize) -> Node {
    if crate::random::bool(VOID_MEM_WRITE_PROB) {
        let slot = crate::random::index(crate::config::MAX_MEMORY) as i32;
        Node::with_children(OpCode::MemWrite, slot, vec![random_tree(ValueType::Int, depth + 1, num_inputs, max_depth)])
    } else {
        Node::with_children(OpCode::Output, 0, vec![random_tree(ValueType::Int, depth + 1, num_inputs, max_depth)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_program_has_seq_of_two_outputs_root() {
        crate::random::set_seed(1);
        let program = create_random_program(3, 5);
        assert_eq!(program.root.op, OpCode::Seq);
        assert_eq!(program.root.children().len(), 2);
        assert_eq!(program.root.children()[0].op, OpCode::Output);
        assert_eq!(program.root.children()[1].op, OpCode::Output);
        assert_eq!(program.root.children()[1].children()[0].op, OpCode::Const);
    }

    #[test]
    fn random_tree_never_exceeds_max_depth() {
        crate::random::set_seed(7);
        for _ in 0..50 {
            let tree = random_tree(ValueType::Int, 0, 2, 4);
            assert!(tree.depth() <= 4);
        }
    }

    #[test]
    fn random_tree_never_samples_adf_ops() {
        crate::random::set_seed(42);
        for _ in 0..50 {
            let tree = random_tree(ValueType::Int, 0, 2, 6);
            for node in tree.iter_pre_order() {
                assert!(!matches!(node.op, OpCode::Library | OpCode::FuncCall | OpCode::Param));
            }
        }
    }
}
