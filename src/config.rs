//! Fixed numeric parameters and their caller-tunable [`GpConfig`] wrapper.
//!
//! The constants below are the spec's fixed values, kept as `pub const` so code
//! that doesn't thread a [`GpConfig`] through (tree structural limits, mostly)
//! still has a single source of truth. [`GpConfig`] exposes the same values as
//! ordinary fields with matching defaults, for callers who want a smaller
//! population or shorter tree depth in a smoke test.

pub const POP_SIZE: usize = 2000;
pub const TOURNAMENT_SIZE: usize = 7;
pub const ELITE_SIZE: usize = 20;
pub const MAX_LIBRARY: usize = 32;
pub const MAX_INPUTS: usize = 16;
pub const MAX_OUTPUTS: usize = 8;
pub const MAX_MEMORY: usize = 8;
pub const MAX_CHILDREN: usize = 4;
pub const MAX_DEPTH: usize = 10;
pub const LIBRARY_UPDATE_INTERVAL: usize = 5;
pub const MUTATION_POINT_RATE: f32 = 1.0 / 5.0;
pub const CROSSOVER_RATE: f32 = 7.0 / 10.0;
pub const LIBRARY_INJECTION_TREE_RATE: f32 = 1.0 / 3.0;
pub const LIBRARY_INJECTION_NODE_RATE: f32 = 1.0 / 20.0;

/// Caller-tunable evolutionary parameters. `Default` reproduces the spec's fixed
/// constants exactly; harnesses typically only override `pop_size` and
/// `max_depth` for fast smoke tests.
#[derive(Debug, Clone)]
pub struct GpConfig {
    pub pop_size: usize,
    pub tournament_size: usize,
    pub elite_size: usize,
    pub max_library: usize,
    pub max_depth: usize,
    pub library_update_interval: usize,
    pub mutation_point_rate: f32,
    pub crossover_rate: f32,
    pub library_injection_tree_rate: f32,
    pub library_injection_node_rate: f32,
}

impl Default for GpConfig {
    fn default() -> Self {
        GpConfig {
            pop_size: POP_SIZE,
            tournament_size: TOURNAMENT_SIZE,
            elite_size: ELITE_SIZE,
            max_library: MAX_LIBRARY,
            max_depth: MAX_DEPTH,
            library_update_interval: LIBRARY_UPDATE_INTERVAL,
            mutation_point_rate: MUTATION_POINT_RATE,
            crossover_rate: CROSSOVER_RATE,
            library_injection_tree_rate: LIBRARY_INJECTION_TREE_RATE,
            library_injection_node_rate: LIBRARY_INJECTION_NODE_RATE,
        }
    }
}
