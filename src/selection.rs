//! Tournament selection.

use crate::program::Program;

/// Draws `tournament_size` uniform-random indices (with replacement) from
/// `programs` and returns the index of the fittest contender; ties go to
/// whichever contender was drawn first (a linear max-scan, not a sort, so two
/// equally-fit draws never reorder on stability grounds).
pub fn tournament_select(programs: &[Program], tournament_size: usize) -> usize {
    let mut best_idx = crate::random::index(programs.len());
    let mut best_fitness = programs[best_idx].fitness;
    for _ in 1..tournament_size {
        let idx = crate::random::index(programs.len());
        if programs[idx].fitness > best_fitness {
            best_idx = idx;
            best_fitness = programs[idx].fitness;
        }
    }
    best_idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::op::OpCode;

    fn program_with_fitness(fitness: f32) -> Program {
        let mut p = Program::new(Node::new(OpCode::Const, 0));
        p.fitness = fitness;
        p
    }

    #[test]
    fn tournament_selects_fittest_contender() {
        crate::random::set_seed(1);
        let programs: Vec<Program> = (0..20).map(|i| program_with_fitness(i as f32)).collect();
        let mut saw_max = false;
        for _ in 0..200 {
            let idx = tournament_select(&programs, 7);
            if idx == 19 {
                saw_max = true;
                break;
            }
        }
        assert!(saw_max, "tournament should pick the best program at least once across many draws");
    }

    #[test]
    fn equal_fitness_population_still_selects_a_valid_index() {
        let programs: Vec<Program> = (0..10).map(|_| program_with_fitness(1.0)).collect();
        crate::random::set_seed(2);
        let idx = tournament_select(&programs, 7);
        assert!(idx < programs.len());
    }
}
