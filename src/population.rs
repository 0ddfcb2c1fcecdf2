//! Population state and the generation-evolution driver.

use crate::context::Context;
use crate::error::{GpError, GpResult};
use crate::generator::create_random_program;
use crate::interpreter::execute_program;
use crate::library::{update_library, LibraryEntry};
use crate::program::{Program, UNEVALUATED};
use crate::selection::tournament_select;
use crate::variation::{crossover, inject_library_calls, mutate};
use rayon::prelude::*;
use std::sync::Mutex;

/// Caller-tunable evolutionary parameters. `Default` reproduces the spec's fixed
/// constants exactly; harnesses typically only override `pop_size` and
/// `max_depth` for fast smoke tests.
pub use crate::config::GpConfig;

struct BestSlot {
    program: Option<Program>,
    fitness: f32,
}

/// The current generation, the learned library, and the best individual seen
/// so far, plus the synchronisation object guarding concurrent best-updates.
pub struct Population {
    pub programs: Vec<Program>,
    pub library: Vec<LibraryEntry>,
    pub generation: usize,
    pub avg_fitness: f32,
    pub num_inputs: usize,
    pub config: GpConfig,
    best: Mutex<BestSlot>,
}

impl Population {
    pub fn new(num_inputs: usize, config: GpConfig) -> GpResult<Self> {
        if num_inputs == 0 || num_inputs > crate::config::MAX_INPUTS {
            return Err(GpError::InvalidInputCount {
                got: num_inputs,
                max: crate::config::MAX_INPUTS,
            });
        }
        if config.pop_size <= config.elite_size {
            return Err(GpError::PopulationTooSmall {
                elite_size: config.elite_size,
            });
        }
        Ok(Population {
            programs: Vec::new(),
            library: Vec::new(),
            generation: 0,
            avg_fitness: 0.0,
            num_inputs,
            config,
            best: Mutex::new(BestSlot {
                program: None,
                fitness: UNEVALUATED,
            }),
        })
    }

    pub fn best(&self) -> Option<Program> {
        self.best.lock().unwrap().program.clone()
    }

    pub fn best_fitness(&self) -> f32 {
        self.best.lock().unwrap().fitness
    }

    /// Plain-data snapshot of the run's current state, for a caller that wants
    /// to print progress without reaching into internals (the role every
    /// original harness played by hand).
    pub fn describe_best(&self) -> BestSummary {
        let slot = self.best.lock().unwrap();
        BestSummary {
            generation: self.generation,
            best_fitness: slot.fitness,
            avg_fitness: self.avg_fitness,
            population_size: self.programs.len(),
            library_size: self.library.len(),
        }
    }

    /// Runs one full generation: lazy init, parallel fitness evaluation,
    /// elitism extraction, tournament-based breeding, replacement, and
    /// (every `library_update_interval` generations) a library update.
    pub fn evolve_generation<F>(&mut self, fitness_fn: F)
    where
        F: Fn(&Program, &mut Context, &[LibraryEntry]) -> f32 + Sync,
    {
        if self.programs.is_empty() {
            self.programs = (0..self.config.pop_size)
                .map(|_| create_random_program(self.num_inputs, self.config.max_depth))
                .collect();
        }

        self.evaluate_fitness(&fitness_fn);

        let elites = self.extract_elites();

        let mut next_gen = elites;
        while next_gen.len() < self.config.pop_size {
            if crate::random::bool(self.config.crossover_rate) {
                let p1 = &self.programs[tournament_select(&self.programs, self.config.tournament_size)];
                let p2 = &self.programs[tournament_select(&self.programs, self.config.tournament_size)];
                let mut child = crossover(p1, p2);
                inject_library_calls(&mut child, &mut self.library, self.num_inputs);
                next_gen.push(child);
            } else {
                let parent = &self.programs[tournament_select(&self.programs, self.config.tournament_size)];
                let mut child = mutate(parent, self.num_inputs);
                inject_library_calls(&mut child, &mut self.library, self.num_inputs);
                next_gen.push(child);
            }
        }

        self.programs = next_gen;
        self.generation += 1;

        if self.generation % self.config.library_update_interval == 0 {
            update_library(&self.programs, &mut self.library);
        }

        tracing::debug!(
            generation = self.generation,
            best_fitness = self.best_fitness(),
            avg_fitness = self.avg_fitness,
            pop_size = self.programs.len(),
            library_size = self.library.len(),
            "generation complete"
        );
    }

    fn evaluate_fitness<F>(&mut self, fitness_fn: &F)
    where
        F: Fn(&Program, &mut Context, &[LibraryEntry]) -> f32 + Sync,
    {
        let num_inputs = self.num_inputs;
        let library = &self.library;
        let best = &self.best;

        let partial_sums: Vec<f32> = self
            .programs
            .par_chunks_mut(chunk_size(self.programs.len()))
            .map(|chunk| {
                let mut partial = 0.0f32;
                for program in chunk.iter_mut() {
                    let mut ctx = Context::new(num_inputs);
                    let mut raw = fitness_fn(program, &mut ctx, library);
                    if raw.is_nan() {
                        raw = UNEVALUATED;
                    }
                    program.fitness = raw;
                    partial += raw;

                    let mut slot = best.lock().unwrap();
                    if raw > slot.fitness {
                        slot.fitness = raw;
                        slot.program = Some(program.clone());
                    }
                }
                partial
            })
            .collect();

        self.avg_fitness = partial_sums.iter().sum::<f32>() / self.programs.len() as f32;
    }

    /// Repeated linear max-scan extraction of the top `elite_size` individuals;
    /// chosen slots are fitness-sentinelled during the scan and restored
    /// afterwards, matching the original's wasteful-but-harmless re-evaluation
    /// note (see DESIGN.md) — here restoration is just putting the remembered
    /// fitness back, which is cheaper than a real re-evaluation but
    /// observationally equivalent for everything downstream.
    fn extract_elites(&mut self) -> Vec<Program> {
        let elite_size = self.config.elite_size.min(self.programs.len());
        let mut elites = Vec::with_capacity(elite_size);
        let mut taken: Vec<(usize, f32)> = Vec::with_capacity(elite_size);

        for _ in 0..elite_size {
            let mut best_idx = None;
            let mut best_fitness = UNEVALUATED;
            for (i, program) in self.programs.iter().enumerate() {
                if program.fitness > best_fitness {
                    best_fitness = program.fitness;
                    best_idx = Some(i);
                }
            }
            let Some(idx) = best_idx else { break };
            elites.push(self.programs[idx].clone());
            taken.push((idx, self.programs[idx].fitness));
            self.programs[idx].fitness = UNEVALUATED;
        }

        for (idx, fitness) in taken {
            self.programs[idx].fitness = fitness;
        }

        elites
    }
}

fn chunk_size(pop_size: usize) -> usize {
    let workers = rayon::current_num_threads().max(1);
    pop_size.div_ceil(workers).max(1)
}

/// Plain-data snapshot returned by [`Population::describe_best`].
#[derive(Debug, Clone, Copy)]
pub struct BestSummary {
    pub generation: usize,
    pub best_fitness: f32,
    pub avg_fitness: f32,
    pub population_size: usize,
    pub library_size: usize,
}

/// Runs `program` once against `ctx`, resolving library references against
/// `pop`'s current library — the public entry point named in the spec's
/// external interface.
pub fn run_program(program: &Program, ctx: &mut Context, pop: &Population) {
    execute_program(program, ctx, &pop.library);
}
