//! Learned subtree abstractions mined from elites ("automatically defined
//! functions") and the manager that extracts, filters, scores, inserts, evicts,
//! and decays them.

use crate::config::{ELITE_SIZE, MAX_CHILDREN, MAX_LIBRARY};
use crate::node::Node;
use crate::op::OpCode;
use crate::program::Program;

const CANDIDATE_MIN_SIZE: usize = 5;
const CANDIDATE_MAX_SIZE: usize = 12;
const CANDIDATE_CAP: usize = 100;
const SIMILARITY_REJECT_THRESHOLD: f32 = 0.7;
const TOP_K_EXAMINED: usize = 5;
const TOP_K_INSERTED: usize = 5;
const THRESHOLD_FRACTION: f32 = 0.2;
const EVICTION_FRACTION: f32 = 0.25;
const DECAY_FACTOR: f32 = 0.98;

/// A learned abstraction: a body whose free `INPUT` references have been
/// rewritten to `PARAM` references, invoked as a terminal (`num_params == 0`)
/// or a call node (`num_params > 0`).
#[derive(Debug, Clone)]
pub struct LibraryEntry {
    pub name: String,
    pub tree: Node,
    pub uses: u32,
    pub avg_fitness: f32,
    pub num_params: usize,
}

impl LibraryEntry {
    fn new(name: String, tree: Node, num_params: usize, avg_fitness: f32) -> Self {
        LibraryEntry {
            name,
            tree,
            uses: 1,
            avg_fitness,
            num_params,
        }
    }
}

/// Runs one library-update cycle (SPEC_FULL.md §4.6) against the current
/// population, in place on `library`.
pub fn update_library(programs: &[Program], library: &mut Vec<LibraryEntry>) {
    if programs.is_empty() {
        return;
    }

    let mut ranked: Vec<&Program> = programs.iter().collect();
    ranked.sort_by(|a, b| b.fitness.partial_cmp(&a.fitness).unwrap_or(std::cmp::Ordering::Equal));

    let best = ranked[0].fitness;
    let worst = ranked[ranked.len() - 1].fitness;
    let threshold = best - THRESHOLD_FRACTION * (best - worst);

    let eligible: Vec<&Program> = ranked
        .iter()
        .filter(|p| p.fitness >= threshold)
        .take(ELITE_SIZE.min(TOP_K_EXAMINED))
        .copied()
        .collect();

    // Each candidate is paired with the fitness of the elite it was mined
    // from (spec.md §3's `LibraryEntry.avg_fitness`), not the batch-wide best.
    let mut candidates: Vec<(&Node, f32)> = Vec::new();
    'outer: for program in &eligible {
        for node in program.root.iter_pre_order() {
            let size = node.size();
            if size >= CANDIDATE_MIN_SIZE && size <= CANDIDATE_MAX_SIZE {
                candidates.push((node, program.fitness));
                if candidates.len() >= CANDIDATE_CAP {
                    break 'outer;
                }
            }
        }
    }

    let positive_fitness_elites = eligible.iter().filter(|p| p.fitness > 0.0).count();

    let mut scored: Vec<(f32, &Node, f32)> = Vec::new();
    for (candidate, source_fitness) in candidates {
        if !passes_filter(candidate, library) {
            continue;
        }
        let quality = quality_score(candidate, positive_fitness_elites);
        if quality > 0.0 {
            scored.push((quality, candidate, source_fitness));
        }
    }

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    for (_, candidate, source_fitness) in scored.into_iter().take(TOP_K_INSERTED) {
        let (body, num_params) = parameterize(candidate);
        let name = format!("adf_{}", library.len());
        insert_entry(library, LibraryEntry::new(name, body, num_params, source_fitness));
    }

    if library.len() >= MAX_LIBRARY {
        prune(library);
    }

    decay(library);
}

/// Drops candidates smaller than 5 nodes, childless candidates, structural
/// duplicates of an existing body, and candidates too similar to one.
fn passes_filter(candidate: &Node, library: &[LibraryEntry]) -> bool {
    if candidate.size() < CANDIDATE_MIN_SIZE {
        tracing::trace!("library candidate rejected: too small");
        return false;
    }
    if candidate.is_leaf() {
        tracing::trace!("library candidate rejected: no children");
        return false;
    }
    for entry in library {
        if candidate.duplicate_of(&entry.tree) {
            tracing::trace!(name = %entry.name, "library candidate rejected: structural duplicate");
            return false;
        }
        if similarity(candidate, &entry.tree) > SIMILARITY_REJECT_THRESHOLD {
            tracing::trace!(name = %entry.name, "library candidate rejected: too similar");
            return false;
        }
    }
    true
}

/// Recursive similarity score `s(a, b)` per SPEC_FULL.md §4.6 item 5: equal ops
/// with matching, non-empty arities recurse into a mean of paired children.
fn similarity(a: &Node, b: &Node) -> f32 {
    if a.op != b.op {
        return 0.3;
    }
    let (ac, bc) = (a.children(), b.children());
    if ac.len() != bc.len() || ac.is_empty() {
        return 0.6;
    }
    let mean_child: f32 = ac.iter().zip(bc.iter()).map(|(x, y)| similarity(x, y)).sum::<f32>() / ac.len() as f32;
    0.6 + 0.4 * mean_child
}

fn quality_score(candidate: &Node, positive_fitness_elites: usize) -> f32 {
    let size = candidate.size();
    let mut score = 0.0;
    if (5..=10).contains(&size) {
        score += 10.0;
    }
    if size < 5 {
        score -= 20.0;
    }
    if size > 15 {
        score -= 10.0;
    }
    score += positive_fitness_elites as f32;
    score
}

/// Rewrites a candidate's distinct `INPUT` values (in first-pre-order-encounter
/// order, capped at `MAX_CHILDREN`) into `PARAM` references; unmapped inputs are
/// left untouched so they still read the caller's actual inputs.
pub fn parameterize(candidate: &Node) -> (Node, usize) {
    let mut input_map: Vec<i32> = Vec::new();
    for node in candidate.iter_pre_order() {
        if node.op == OpCode::Input && !input_map.contains(&node.value) && input_map.len() < MAX_CHILDREN {
            input_map.push(node.value);
        }
    }
    let body = rewrite_inputs(candidate, &input_map);
    (body, input_map.len())
}

fn rewrite_inputs(node: &Node, input_map: &[i32]) -> Node {
    if node.op == OpCode::Input {
        if let Some(pos) = input_map.iter().position(|&v| v == node.value) {
            return Node::new(OpCode::Param, pos as i32);
        }
        return node.clone();
    }
    let children = node.children().iter().map(|c| rewrite_inputs(c, input_map)).collect();
    Node::with_children(node.op, node.value, children)
}

/// Appends if space remains, else evicts the entry with the smallest `uses`
/// (first-seen ties win — a linear scan that never replaces on equal `uses`).
fn insert_entry(library: &mut Vec<LibraryEntry>, entry: LibraryEntry) {
    if library.len() < MAX_LIBRARY {
        tracing::debug!(name = %entry.name, num_params = entry.num_params, "library entry inserted");
        library.push(entry);
        return;
    }
    let mut evict_idx = 0;
    for (i, e) in library.iter().enumerate() {
        if e.uses < library[evict_idx].uses {
            evict_idx = i;
        }
    }
    tracing::debug!(
        evicted = %library[evict_idx].name,
        uses = library[evict_idx].uses,
        inserted = %entry.name,
        "library entry evicted for new candidate"
    );
    library[evict_idx] = entry;
}

/// Competitive pruning at capacity: evicts the bottom 25% ranked by
/// `uses * max(avg_fitness, 0.1)`.
fn prune(library: &mut Vec<LibraryEntry>) {
    let evict_count = (library.len() as f32 * EVICTION_FRACTION) as usize;
    if evict_count == 0 {
        return;
    }
    let mut scored: Vec<(f32, usize)> = library
        .iter()
        .enumerate()
        .map(|(i, e)| (e.uses as f32 * e.avg_fitness.max(0.1), i))
        .collect();
    scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut to_evict: Vec<usize> = scored.into_iter().take(evict_count).map(|(_, i)| i).collect();
    to_evict.sort_unstable_by(|a, b| b.cmp(a));
    for idx in to_evict {
        let evicted = library.remove(idx);
        tracing::debug!(name = %evicted.name, uses = evicted.uses, "library entry pruned");
    }
}

fn decay(library: &mut [LibraryEntry]) {
    for entry in library.iter_mut() {
        entry.uses = ((entry.uses as f32) * DECAY_FACTOR) as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(op: OpCode, value: i32) -> Node {
        Node::new(op, value)
    }

    #[test]
    fn parameterize_maps_distinct_inputs_in_first_encounter_order() {
        let candidate = Node::with_children(
            OpCode::Add,
            0,
            vec![leaf(OpCode::Input, 2), leaf(OpCode::Input, 3)],
        );
        let (body, num_params) = parameterize(&candidate);
        assert_eq!(num_params, 2);
        assert_eq!(body.children()[0].op, OpCode::Param);
        assert_eq!(body.children()[0].value, 0);
        assert_eq!(body.children()[1].value, 1);
    }

    #[test]
    fn parameterize_with_no_inputs_yields_parameterless_entry() {
        let candidate = Node::with_children(
            OpCode::Add,
            0,
            vec![leaf(OpCode::Const, 1), leaf(OpCode::Const, 2)],
        );
        let (_, num_params) = parameterize(&candidate);
        assert_eq!(num_params, 0);
    }

    #[test]
    fn similarity_of_identical_trees_is_one() {
        let a = Node::with_children(OpCode::Add, 0, vec![leaf(OpCode::Const, 1), leaf(OpCode::Const, 2)]);
        let b = a.clone();
        assert!((similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn insert_entry_evicts_smallest_uses_when_full() {
        let mut library: Vec<LibraryEntry> = (0..MAX_LIBRARY)
            .map(|i| {
                let mut e = LibraryEntry::new(format!("e{i}"), leaf(OpCode::Const, 0), 0, 1.0);
                e.uses = 10 + i as u32;
                e
            })
            .collect();
        library[3].uses = 0;
        let fresh = LibraryEntry::new("fresh".into(), leaf(OpCode::Const, 1), 0, 1.0);
        insert_entry(&mut library, fresh);
        assert_eq!(library.len(), MAX_LIBRARY);
        assert_eq!(library[3].name, "fresh");
    }

    #[test]
    fn decay_truncates_toward_zero() {
        let mut library = vec![LibraryEntry::new("a".into(), leaf(OpCode::Const, 0), 0, 1.0)];
        library[0].uses = 100;
        decay(&mut library);
        assert_eq!(library[0].uses, 98);
    }
}
