//! Construction-time errors.
//!
//! Per the engine's error-handling design, there are no recoverable errors at
//! evaluation or evolution time: out-of-range indices, division by zero, and a
//! missing library entry all degrade silently to `0` and the run continues. The
//! error type here only covers misconfiguration discovered before a single node
//! is ever evaluated.

use thiserror::Error;

pub type GpResult<T> = Result<T, GpError>;

#[derive(Debug, Error)]
pub enum GpError {
    #[error("num_inputs must be in 1..={max}, got {got}")]
    InvalidInputCount { got: usize, max: usize },

    #[error("pop_size must be greater than elite_size ({elite_size})")]
    PopulationTooSmall { elite_size: usize },
}
