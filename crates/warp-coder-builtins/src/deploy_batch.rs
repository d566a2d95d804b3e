// warp-coder-builtins/src/deploy_batch.rs
// ============================================================================
// Module: Deploy Batch
// Description: Pure fixed-point helper computing which sibling issue runs
//              should deploy together.
// Purpose: Let the `deploy` context provider inject a deterministic batch of
//          repo-overlapping runs, independent of candidate order.
// Dependencies: std::collections::BTreeSet, warp_coder_core
// ============================================================================

//! ## Overview
//! A deploy batch starts at the triggering run and grows to include every
//! candidate run that shares at least one repository with a current batch
//! member, closed under that relation (§4.7, §9 invariant 10). The fixed
//! point is computed with the same worklist traversal
//! `warp_coder_core::graph::analysis::GraphAnalysis::find_reachable_acts`
//! uses for graph reachability, generalized from "next act" edges to
//! "shares a repo" edges between candidates.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::collections::VecDeque;

use warp_coder_core::IssueRunId;

// ============================================================================
// SECTION: Public Types
// ============================================================================

/// A candidate run awaiting or running deploy, as seen by the `deploy`
/// context provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployCandidate {
    /// The candidate's issue run id.
    pub run_id: IssueRunId,
    /// Repositories this run's deploy touches.
    pub repos: BTreeSet<String>,
}

// ============================================================================
// SECTION: Deploy Batch
// ============================================================================

/// Computes the deploy batch: the fixed point of "shares a repo with a batch
/// member," starting from `trigger` among `candidates`.
///
/// Deterministic regardless of the order `candidates` is supplied in: the
/// result is a set, and ties in traversal order never change membership
/// because the relation is symmetric and transitive closure is taken to
/// completion.
///
/// Returns an empty batch if `trigger` is not present in `candidates`.
#[must_use]
pub fn compute_deploy_batch(trigger: &IssueRunId, candidates: &[DeployCandidate]) -> BTreeSet<IssueRunId> {
    if !candidates.iter().any(|candidate| &candidate.run_id == trigger) {
        return BTreeSet::new();
    }

    let mut batch = BTreeSet::new();
    let mut queue = VecDeque::new();
    queue.push_back(trigger.clone());

    while let Some(run_id) = queue.pop_front() {
        if !batch.insert(run_id.clone()) {
            continue;
        }
        let Some(member_repos) = candidates
            .iter()
            .find(|candidate| candidate.run_id == run_id)
            .map(|candidate| &candidate.repos)
        else {
            continue;
        };
        for candidate in candidates {
            if batch.contains(&candidate.run_id) {
                continue;
            }
            if candidate.repos.intersection(member_repos).next().is_some() {
                queue.push_back(candidate.run_id.clone());
            }
        }
    }
    batch
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]
mod tests {
    use std::collections::BTreeSet;

    use warp_coder_core::IssueRunId;
    use warp_coder_core::Timestamp;

    use super::DeployCandidate;
    use super::compute_deploy_batch;

    fn run(seed: i64) -> IssueRunId {
        IssueRunId::generate(Timestamp::from_unix_millis(seed))
    }

    fn repos(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| (*name).to_string()).collect()
    }

    #[test]
    fn batch_contains_only_the_trigger_when_no_overlap() {
        let trigger = run(1);
        let other = run(2);
        let candidates = vec![
            DeployCandidate { run_id: trigger.clone(), repos: repos(&["acme/a"]) },
            DeployCandidate { run_id: other, repos: repos(&["acme/b"]) },
        ];
        let batch = compute_deploy_batch(&trigger, &candidates);
        assert_eq!(batch.len(), 1);
        assert!(batch.contains(&trigger));
    }

    #[test]
    fn batch_grows_transitively_across_shared_repos() {
        let a = run(1);
        let b = run(2);
        let c = run(3);
        let candidates = vec![
            DeployCandidate { run_id: a.clone(), repos: repos(&["acme/a"]) },
            DeployCandidate { run_id: b.clone(), repos: repos(&["acme/a", "acme/b"]) },
            DeployCandidate { run_id: c.clone(), repos: repos(&["acme/b", "acme/c"]) },
        ];
        let batch = compute_deploy_batch(&a, &candidates);
        assert_eq!(batch, BTreeSet::from([a, b, c]));
    }

    #[test]
    fn batch_is_independent_of_candidate_order() {
        let a = run(1);
        let b = run(2);
        let c = run(3);
        let forward = vec![
            DeployCandidate { run_id: a.clone(), repos: repos(&["acme/a"]) },
            DeployCandidate { run_id: b.clone(), repos: repos(&["acme/a", "acme/b"]) },
            DeployCandidate { run_id: c.clone(), repos: repos(&["acme/b"]) },
        ];
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(compute_deploy_batch(&a, &forward), compute_deploy_batch(&a, &reversed));
    }

    #[test]
    fn empty_batch_when_trigger_is_not_a_candidate() {
        let trigger = run(1);
        let candidates = vec![DeployCandidate { run_id: run(2), repos: repos(&["acme/a"]) }];
        assert!(compute_deploy_batch(&trigger, &candidates).is_empty());
    }
}
