//! A genetic programming engine for typed integer expression trees, with a
//! learned library of parameterised subtree abstractions ("automatically
//! defined functions") mined from elites and fed back into the operator set.
//!
//! The core loop is [`Population::evolve_generation`]: tournament selection,
//! subtree crossover and mutation, elitism, and parallel fitness evaluation
//! over a population of [`Program`]s. Every [`config::LIBRARY_UPDATE_INTERVAL`]
//! generations, the [`library`] module mines candidate subtrees from the
//! current elites, parameterises and scores them, and folds the survivors back
//! into the instruction set as `LIBRARY`/`FUNC_CALL` operators.

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod generator;
pub mod interpreter;
pub mod library;
pub mod node;
pub mod op;
pub mod population;
pub mod program;
pub mod random;
pub mod selection;
pub mod variation;

pub mod prelude {
    pub use crate::config::GpConfig;
    pub use crate::context::Context;
    pub use crate::engine::{Engine, EngineExt, GpEngine};
    pub use crate::error::{GpError, GpResult};
    pub use crate::interpreter::{execute_node, execute_program};
    pub use crate::library::LibraryEntry;
    pub use crate::node::{print_tree, Node};
    pub use crate::op::{Arity, OpCode, ValueType};
    pub use crate::population::{run_program, BestSummary, Population};
    pub use crate::program::Program;
}

pub use prelude::*;
