//! Thin `Iterator`-flavoured wrapper over [`Population::evolve_generation`].

use crate::context::Context;
use crate::library::LibraryEntry;
use crate::population::{BestSummary, Population};
use crate::program::Program;

/// A single step of the evolutionary process. Implementors define how the
/// population progresses from one generation to the next; `run` then drives
/// that progression under a caller-supplied termination predicate.
pub trait Engine {
    type Epoch;

    fn next(&mut self) -> Self::Epoch;
}

pub trait EngineExt: Engine {
    /// Calls `next()` until `limit` returns `true`, and returns that epoch.
    fn run<F>(&mut self, limit: F) -> Self::Epoch
    where
        F: Fn(&Self::Epoch) -> bool;
}

impl<E: Engine> EngineExt for E {
    fn run<F>(&mut self, limit: F) -> Self::Epoch
    where
        F: Fn(&Self::Epoch) -> bool,
    {
        loop {
            let epoch = self.next();
            if limit(&epoch) {
                return epoch;
            }
        }
    }
}

/// Couples a [`Population`] with a fitness function so it can drive itself
/// through [`Engine::next`] calls.
pub struct GpEngine<F>
where
    F: Fn(&Program, &mut Context, &[LibraryEntry]) -> f32 + Sync,
{
    population: Population,
    fitness_fn: F,
}

impl<F> GpEngine<F>
where
    F: Fn(&Program, &mut Context, &[LibraryEntry]) -> f32 + Sync,
{
    pub fn new(population: Population, fitness_fn: F) -> Self {
        GpEngine { population, fitness_fn }
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn into_population(self) -> Population {
        self.population
    }
}

impl<F> Engine for GpEngine<F>
where
    F: Fn(&Program, &mut Context, &[LibraryEntry]) -> f32 + Sync,
{
    type Epoch = BestSummary;

    fn next(&mut self) -> Self::Epoch {
        self.population.evolve_generation(&self.fitness_fn);
        self.population.describe_best()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GpConfig;

    #[test]
    fn run_stops_at_generation_limit() {
        crate::random::set_seed(21);
        let mut config = GpConfig::default();
        config.pop_size = 20;
        config.elite_size = 2;
        config.max_depth = 3;
        let population = Population::new(1, config).unwrap();

        let fitness_fn = |program: &Program, ctx: &mut Context, library: &[LibraryEntry]| {
            crate::interpreter::execute_program(program, ctx, library);
            -(ctx.outputs.get(0).copied().unwrap_or(0).abs() as f32)
        };

        let mut engine = GpEngine::new(population, fitness_fn);
        let final_epoch = engine.run(|epoch| epoch.generation >= 3);
        assert_eq!(final_epoch.generation, 3);
    }
}
