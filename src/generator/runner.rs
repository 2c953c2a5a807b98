//! Enumeration engine.
//!
//! # Algorithm
//!
//! 1. Drop rows without candidates; fail if none remain
//! 2. The first remaining row is the seed row: one tree per candidate
//! 3. Grow every tree row by row. A candidate is attached under a frontier
//!    node unless the node's inherited incompatibility set contains it; the
//!    child inherits the parent's set plus the candidate's own declared set
//! 4. Every node created, in any tree, draws from one shared budget;
//!    exceeding the limit aborts the whole call
//! 5. Count the final frontiers, or walk each leaf back to its root to
//!    materialize the bindings

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{info, warn};

use super::config::GeneratorConfig;
use super::tree::{BranchBudget, SolutionTree};
use super::types::{Candidate, CandidateRow, Enumeration, GeneratedSolution, GenerationMode};
use crate::error::{MorphError, Result};

/// Solution tree builder.
pub struct SolutionGenerator;

impl SolutionGenerator {
    /// Counts every combination without materializing it.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_morph::generator::{Candidate, CandidateRow, GeneratorConfig, SolutionGenerator};
    /// use u_morph::{DsId, FrId};
    ///
    /// let rows = vec![
    ///     CandidateRow::new(FrId(1), vec![
    ///         Candidate::new(DsId(1), [DsId(3)]),
    ///         Candidate::new(DsId(2), []),
    ///     ]),
    ///     CandidateRow::new(FrId(2), vec![
    ///         Candidate::new(DsId(3), [DsId(1)]),
    ///         Candidate::new(DsId(4), []),
    ///     ]),
    /// ];
    /// let count = SolutionGenerator::count(&rows, &GeneratorConfig::default()).unwrap();
    /// assert_eq!(count, 3);
    /// ```
    pub fn count(rows: &[CandidateRow], config: &GeneratorConfig) -> Result<usize> {
        Self::run(rows, config, GenerationMode::Count).map(|result| result.len())
    }

    /// Materializes every combination.
    ///
    /// Solutions are named `generated-solution-0001`, `-0002`, … in tree
    /// order, then frontier order within a tree.
    pub fn generate(
        rows: &[CandidateRow],
        config: &GeneratorConfig,
    ) -> Result<Vec<GeneratedSolution>> {
        match Self::run(rows, config, GenerationMode::Materialize)? {
            Enumeration::Solutions(solutions) => Ok(solutions),
            Enumeration::Count(_) => unreachable!("materialize mode always yields solutions"),
        }
    }

    /// Runs one enumeration call in the given mode.
    ///
    /// Fails with [`MorphError::NoDesignSolutions`] if no row has a
    /// candidate and with [`MorphError::GenerationCapacity`] as soon as the
    /// node budget is exceeded. On failure nothing is returned; the trees
    /// built so far are dropped.
    pub fn run(
        rows: &[CandidateRow],
        config: &GeneratorConfig,
        mode: GenerationMode,
    ) -> Result<Enumeration> {
        config.validate()?;

        let rows: Vec<&CandidateRow> = rows.iter().filter(|row| !row.is_empty()).collect();
        let Some((seed_row, rest)) = rows.split_first() else {
            return Err(MorphError::NoDesignSolutions);
        };

        info!(
            event = "generation_start",
            rows = rows.len(),
            seeds = seed_row.candidates.len(),
            limit = config.limit,
            mode = ?mode,
        );

        let budget = BranchBudget::new(config.limit);
        let trees = match build_trees(seed_row, rest, &budget, config.parallel) {
            Ok(trees) => trees,
            Err(err) => {
                warn!(event = "generation_aborted", limit = config.limit, error = %err);
                return Err(err);
            }
        };

        let leaves: usize = trees.iter().map(SolutionTree::leaf_count).sum();
        let nodes: usize = trees.iter().map(SolutionTree::node_count).sum();
        info!(
            event = "generation_end",
            leaves,
            nodes,
            budget_used = budget.created(),
        );

        Ok(match mode {
            GenerationMode::Count => Enumeration::Count(leaves),
            GenerationMode::Materialize => Enumeration::Solutions(materialize(&trees, leaves)),
        })
    }
}

fn build_tree(
    seed_row: &CandidateRow,
    seed: &Candidate,
    rest: &[&CandidateRow],
    budget: &BranchBudget,
) -> Result<SolutionTree> {
    let mut tree = SolutionTree::seed(seed_row.fr, seed, budget)?;
    for row in rest {
        tree.grow(row, budget)?;
        if tree.leaf_count() == 0 {
            break;
        }
    }
    Ok(tree)
}

#[cfg(feature = "parallel")]
fn build_trees(
    seed_row: &CandidateRow,
    rest: &[&CandidateRow],
    budget: &BranchBudget,
    parallel: bool,
) -> Result<Vec<SolutionTree>> {
    if parallel {
        return seed_row
            .candidates
            .par_iter()
            .map(|seed| build_tree(seed_row, seed, rest, budget))
            .collect();
    }
    build_trees_sequential(seed_row, rest, budget)
}

#[cfg(not(feature = "parallel"))]
fn build_trees(
    seed_row: &CandidateRow,
    rest: &[&CandidateRow],
    budget: &BranchBudget,
    _parallel: bool,
) -> Result<Vec<SolutionTree>> {
    build_trees_sequential(seed_row, rest, budget)
}

fn build_trees_sequential(
    seed_row: &CandidateRow,
    rest: &[&CandidateRow],
    budget: &BranchBudget,
) -> Result<Vec<SolutionTree>> {
    seed_row
        .candidates
        .iter()
        .map(|seed| build_tree(seed_row, seed, rest, budget))
        .collect()
}

fn materialize(trees: &[SolutionTree], leaves: usize) -> Vec<GeneratedSolution> {
    let mut solutions = Vec::with_capacity(leaves);
    for tree in trees {
        for bindings in tree.leaves() {
            solutions.push(GeneratedSolution {
                name: format!("generated-solution-{:04}", solutions.len() + 1),
                bindings,
            });
        }
    }
    solutions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{DsId, FrId};

    /// Rows of `sizes[i]` candidates each, ids allocated sequentially.
    fn grid(sizes: &[usize]) -> Vec<CandidateRow> {
        let mut next = 1;
        sizes
            .iter()
            .enumerate()
            .map(|(r, &n)| {
                let candidates = (0..n)
                    .map(|_| {
                        next += 1;
                        Candidate::new(DsId(next - 1), [])
                    })
                    .collect();
                CandidateRow::new(FrId(r as u64 + 1), candidates)
            })
            .collect()
    }

    fn link(rows: &mut [CandidateRow], a: DsId, b: DsId) {
        for row in rows.iter_mut() {
            for c in row.candidates.iter_mut() {
                if c.ds == a {
                    let mut set = (*c.incompatible).clone();
                    set.insert(b);
                    c.incompatible = std::sync::Arc::new(set);
                } else if c.ds == b {
                    let mut set = (*c.incompatible).clone();
                    set.insert(a);
                    c.incompatible = std::sync::Arc::new(set);
                }
            }
        }
    }

    #[test]
    fn test_two_by_two_counts_four() {
        let rows = grid(&[2, 2]);
        assert_eq!(SolutionGenerator::count(&rows, &GeneratorConfig::default()), Ok(4));
    }

    #[test]
    fn test_cross_row_incompatibility_counts_three() {
        let mut rows = grid(&[2, 2]);
        link(&mut rows, DsId(1), DsId(3));
        assert_eq!(SolutionGenerator::count(&rows, &GeneratorConfig::default()), Ok(3));

        let solutions = SolutionGenerator::generate(&rows, &GeneratorConfig::default()).unwrap();
        assert_eq!(solutions.len(), 3);
        assert!(solutions.iter().all(|s| !(s.bindings[&FrId(1)] == DsId(1)
            && s.bindings[&FrId(2)] == DsId(3))));
    }

    #[test]
    fn test_empty_rows_are_excluded() {
        let rows = grid(&[2, 0, 3]);
        assert_eq!(SolutionGenerator::count(&rows, &GeneratorConfig::default()), Ok(6));

        let solutions = SolutionGenerator::generate(&rows, &GeneratorConfig::default()).unwrap();
        assert!(solutions.iter().all(|s| !s.bindings.contains_key(&FrId(2))));
    }

    #[test]
    fn test_no_candidates_fails() {
        let rows = grid(&[0, 0]);
        assert_eq!(
            SolutionGenerator::count(&rows, &GeneratorConfig::default()),
            Err(MorphError::NoDesignSolutions)
        );
        assert_eq!(
            SolutionGenerator::count(&[], &GeneratorConfig::default()),
            Err(MorphError::NoDesignSolutions)
        );
    }

    #[test]
    fn test_single_row_yields_one_solution_per_cell() {
        let rows = grid(&[3]);
        let solutions = SolutionGenerator::generate(&rows, &GeneratorConfig::default()).unwrap();
        assert_eq!(solutions.len(), 3);
        assert!(solutions.iter().all(|s| s.bindings.len() == 1));
    }

    #[test]
    fn test_names_follow_tree_then_frontier_order() {
        let rows = grid(&[2, 2]);
        let solutions = SolutionGenerator::generate(&rows, &GeneratorConfig::default()).unwrap();

        let named: Vec<(&str, DsId, DsId)> = solutions
            .iter()
            .map(|s| (s.name.as_str(), s.bindings[&FrId(1)], s.bindings[&FrId(2)]))
            .collect();
        assert_eq!(
            named,
            vec![
                ("generated-solution-0001", DsId(1), DsId(3)),
                ("generated-solution-0002", DsId(1), DsId(4)),
                ("generated-solution-0003", DsId(2), DsId(3)),
                ("generated-solution-0004", DsId(2), DsId(4)),
            ]
        );
    }

    #[test]
    fn test_capacity_counts_every_node() {
        // 2 roots + 4 children = 6 nodes.
        let rows = grid(&[2, 2]);
        assert_eq!(
            SolutionGenerator::count(&rows, &GeneratorConfig::default().with_limit(6)),
            Ok(4)
        );
        assert_eq!(
            SolutionGenerator::count(&rows, &GeneratorConfig::default().with_limit(5)),
            Err(MorphError::GenerationCapacity { limit: 5 })
        );
    }

    #[test]
    fn test_capacity_is_shared_across_seed_trees() {
        // Each tree alone needs 1 + 3 = 4 nodes; three trees need 12.
        let rows = grid(&[3, 3]);
        let config = GeneratorConfig::default().with_limit(10);
        assert!(matches!(
            SolutionGenerator::generate(&rows, &config),
            Err(MorphError::GenerationCapacity { limit: 10 })
        ));
    }

    #[test]
    fn test_limit_plus_one_combinations_abort() {
        let rows = grid(&[201]);
        assert_eq!(
            SolutionGenerator::count(&rows, &GeneratorConfig::default()),
            Err(MorphError::GenerationCapacity { limit: 200 })
        );
    }

    #[test]
    fn test_count_matches_generate() {
        let mut rows = grid(&[3, 2, 4]);
        link(&mut rows, DsId(1), DsId(4));
        link(&mut rows, DsId(5), DsId(9));
        let config = GeneratorConfig::default();

        let count = SolutionGenerator::count(&rows, &config).unwrap();
        let solutions = SolutionGenerator::generate(&rows, &config).unwrap();
        assert_eq!(count, solutions.len());
        assert_eq!(count, SolutionGenerator::count(&rows, &config).unwrap());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let rows = grid(&[1]);
        assert!(matches!(
            SolutionGenerator::count(&rows, &GeneratorConfig::default().with_limit(0)),
            Err(MorphError::InvalidConfig(_))
        ));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let mut rows = grid(&[4, 3, 3]);
        link(&mut rows, DsId(2), DsId(6));
        let sequential = GeneratorConfig::default();
        let parallel = GeneratorConfig::default().with_parallel(true);

        assert_eq!(
            SolutionGenerator::generate(&rows, &sequential),
            SolutionGenerator::generate(&rows, &parallel)
        );
        assert!(matches!(
            SolutionGenerator::count(&rows, &parallel.with_limit(20)),
            Err(MorphError::GenerationCapacity { limit: 20 })
        ));
    }
}
