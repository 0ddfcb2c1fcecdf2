//! The tree-walking interpreter.

use crate::context::Context;
use crate::library::LibraryEntry;
use crate::node::Node;
use crate::op::OpCode;
use crate::program::Program;

const SIN_TANH_SCALE: f64 = 1000.0;

/// Evaluates `program.root` once against `ctx`, resolving `LIBRARY`/`FUNC_CALL`
/// against `library`. The root is expected to be `Void`-returning (a `SEQ` of
/// `OUTPUT`s by convention); its return value is discarded, matching how the
/// original driver only ever inspects `ctx.outputs` afterwards.
///
/// This is the Rust realisation of the spec's `execute_program(program, context,
/// pop)` — `pop` is narrowed to the slice of library entries the interpreter
/// actually needs, since nothing else in `Population` is relevant to evaluation.
pub fn execute_program(program: &Program, ctx: &mut Context, library: &[LibraryEntry]) {
    ctx.reset_outputs();
    execute_node(&program.root, ctx, library);
}

/// Evaluates a single node and returns its integer result (`Void`-returning
/// nodes return `0`, a value no caller should rely on).
pub fn execute_node(node: &Node, ctx: &mut Context, library: &[LibraryEntry]) -> i32 {
    let c = node.children();
    match node.op {
        OpCode::Add => execute_node(&c[0], ctx, library).wrapping_add(execute_node(&c[1], ctx, library)),
        OpCode::Sub => execute_node(&c[0], ctx, library).wrapping_sub(execute_node(&c[1], ctx, library)),
        OpCode::Mul => execute_node(&c[0], ctx, library).wrapping_mul(execute_node(&c[1], ctx, library)),
        OpCode::Div => {
            let (a, b) = (execute_node(&c[0], ctx, library), execute_node(&c[1], ctx, library));
            if b == 0 { 0 } else { a.wrapping_div(b) }
        }
        OpCode::Mod => {
            let (a, b) = (execute_node(&c[0], ctx, library), execute_node(&c[1], ctx, library));
            if b == 0 { 0 } else { a.wrapping_rem(b) }
        }
        OpCode::And => execute_node(&c[0], ctx, library) & execute_node(&c[1], ctx, library),
        OpCode::Or => execute_node(&c[0], ctx, library) | execute_node(&c[1], ctx, library),
        OpCode::Xor => execute_node(&c[0], ctx, library) ^ execute_node(&c[1], ctx, library),
        OpCode::Not => !execute_node(&c[0], ctx, library),
        OpCode::Const => node.value,
        OpCode::Input => ctx.input(node.value),
        OpCode::Output => {
            let v = execute_node(&c[0], ctx, library);
            ctx.push_output(v);
            0
        }
        OpCode::IfGt => {
            let (a, b) = (execute_node(&c[0], ctx, library), execute_node(&c[1], ctx, library));
            if a > b {
                execute_node(&c[2], ctx, library)
            } else {
                execute_node(&c[3], ctx, library)
            }
        }
        OpCode::Seq => {
            execute_node(&c[0], ctx, library);
            execute_node(&c[1], ctx, library);
            0
        }
        OpCode::MemRead => ctx.mem_read(node.value),
        OpCode::MemWrite => {
            let v = execute_node(&c[0], ctx, library);
            ctx.mem_write(node.value, v);
            0
        }
        OpCode::Library => {
            library
                .get(node.value as usize)
                .map(|entry| execute_node(&entry.tree, ctx, library))
                .unwrap_or(0)
        }
        OpCode::FuncCall => {
            let Some(entry) = library.get(node.value as usize) else {
                return 0;
            };
            let args: Vec<i32> = c.iter().map(|child| execute_node(child, ctx, library)).collect();
            let saved = ctx.push_frame(&args);
            let result = execute_node(&entry.tree, ctx, library);
            ctx.pop_frame(saved);
            result
        }
        OpCode::Param => ctx.param(node.value),
        OpCode::Eq => i32::from(execute_node(&c[0], ctx, library) == execute_node(&c[1], ctx, library)),
        OpCode::Lt => i32::from(execute_node(&c[0], ctx, library) < execute_node(&c[1], ctx, library)),
        OpCode::Lte => i32::from(execute_node(&c[0], ctx, library) <= execute_node(&c[1], ctx, library)),
        OpCode::Gt => i32::from(execute_node(&c[0], ctx, library) > execute_node(&c[1], ctx, library)),
        OpCode::Abs => execute_node(&c[0], ctx, library).wrapping_abs(),
        OpCode::Neg => execute_node(&c[0], ctx, library).wrapping_neg(),
        OpCode::Max => execute_node(&c[0], ctx, library).max(execute_node(&c[1], ctx, library)),
        OpCode::Min => execute_node(&c[0], ctx, library).min(execute_node(&c[1], ctx, library)),
        OpCode::If => {
            if execute_node(&c[0], ctx, library) != 0 {
                execute_node(&c[1], ctx, library)
            } else {
                execute_node(&c[2], ctx, library)
            }
        }
        OpCode::Sin => {
            let x = execute_node(&c[0], ctx, library) as f64 / SIN_TANH_SCALE;
            (x.sin() * SIN_TANH_SCALE) as i32
        }
        OpCode::Tanh => {
            let x = execute_node(&c[0], ctx, library) as f64 / SIN_TANH_SCALE;
            (x.tanh() * SIN_TANH_SCALE) as i32
        }
        OpCode::Step => i32::from(execute_node(&c[0], ctx, library) > 0),
        OpCode::Ident => execute_node(&c[0], ctx, library),
    }
}
