// warp-coder-cli/src/interactive.rs
// ============================================================================
// Module: Interactive Debug Executor
// Description: A WorkflowExecutor that resolves its result type by asking the
//              operator at a terminal, instead of doing real work.
// Purpose: Let the `debug` command drive the real processRun algorithm
//          (warp_coder_scheduler::process_run) through a live graph rather
//          than re-implementing edge-commit logic ad hoc.
// Dependencies: async_trait, tokio, warp_coder_core
// ============================================================================

//! ## Overview
//! One [`InteractiveExecutor`] is registered per distinct executor name the
//! graph's work-act nodes reference. Its declared `result_types` is the union
//! of every result key any of those nodes carries, so [`ExecutorRegistry`]'s
//! own declared-result-type check (§4.5, §8 invariant 3) still applies to an
//! operator's choice exactly as it would to a real executor.

use std::collections::BTreeSet;
use std::io::BufRead;
use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use warp_coder_core::Context;
use warp_coder_core::ExecutorError;
use warp_coder_core::ExecutorResult;
use warp_coder_core::ResultType;
use warp_coder_core::WorkflowExecutor;
use warp_coder_core::entities::IssueRun;
use warp_coder_core::graph::Graph;

use crate::t;

/// Builds one [`InteractiveExecutor`] per distinct executor name referenced
/// by a non-phase-group node in `graph`.
#[must_use]
pub fn interactive_executors(graph: &Arc<Graph>) -> Vec<Arc<dyn WorkflowExecutor>> {
    let mut names: BTreeSet<String> =
        graph.act_names().filter_map(|act_name| graph.node(act_name)).filter_map(|node| node.executor.clone()).collect();
    names.drain(..).map(|name| Arc::new(InteractiveExecutor::new(name, Arc::clone(graph))) as Arc<dyn WorkflowExecutor>).collect()
}

/// A [`WorkflowExecutor`] that prompts stdin for its result type.
struct InteractiveExecutor {
    /// The executor name this instance stands in for.
    name: String,
    /// The compiled graph, consulted to find the pending act's valid choices.
    graph: Arc<Graph>,
    /// Every result key any node registered under `name` declares.
    result_types: BTreeSet<String>,
}

impl InteractiveExecutor {
    /// Builds an interactive stand-in for the executor named `name`.
    fn new(name: String, graph: Arc<Graph>) -> Self {
        let result_types = graph
            .act_names()
            .filter_map(|act_name| graph.node(act_name))
            .filter(|node| node.executor.as_deref() == Some(name.as_str()))
            .flat_map(|node| node.results.keys().cloned())
            .collect();
        Self {
            name,
            graph,
            result_types,
        }
    }
}

#[async_trait]
impl WorkflowExecutor for InteractiveExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    fn result_types(&self) -> &BTreeSet<String> {
        &self.result_types
    }

    async fn execute(&self, run: &IssueRun, _ctx: &Context) -> Result<ExecutorResult, ExecutorError> {
        let act_name = run.pending_act.as_ref().map(|act| act.name.clone()).ok_or_else(|| unregistered(&self.name))?;
        let node = self.graph.node(&act_name).ok_or_else(|| unregistered(&self.name))?;
        let mut choices: Vec<String> = node.results.keys().cloned().collect();
        choices.sort();

        let prompt = t!("debug.prompt.act", act = act_name.as_str(), label = node.label.as_str());
        let choice = tokio::task::spawn_blocking(move || prompt_choice(&prompt, &choices))
            .await
            .map_err(|_| unregistered(&act_name))?
            .ok_or_else(|| unregistered(&act_name))?;
        Ok(ExecutorResult::new(ResultType::from(choice.as_str())))
    }
}

/// Builds the "abort this invocation" error this module reuses for both an
/// inconsistent graph lookup and the operator closing stdin.
fn unregistered(name: &str) -> ExecutorError {
    ExecutorError::NotRegistered(name.to_string())
}

/// Blocks the calling thread until the operator enters one of `choices`, or
/// returns `None` on end-of-input.
fn prompt_choice(prompt: &str, choices: &[String]) -> Option<String> {
    let stdin = std::io::stdin();
    let options = choices.join(", ");
    loop {
        let mut stdout = std::io::stdout();
        let _ = writeln!(&mut stdout, "{prompt} [{options}]");
        let _ = stdout.flush();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            return None;
        }
        let trimmed = line.trim();
        if choices.iter().any(|choice| choice == trimmed) {
            return Some(trimmed.to_string());
        }
        let mut stderr = std::io::stderr();
        let _ = writeln!(&mut stderr, "unrecognized choice {trimmed:?}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use warp_coder_core::graph::Graph;
    use warp_coder_core::graph::document::EdgeDocument;
    use warp_coder_core::graph::document::GraphDocument;
    use warp_coder_core::graph::document::NodeDocument;

    use super::interactive_executors;

    fn sample_graph() -> Arc<Graph> {
        let mut acts = BTreeMap::new();
        acts.insert(
            "Implement".to_string(),
            NodeDocument {
                label: "Implement".to_string(),
                executor: "implement".to_string(),
                group: None,
                results: BTreeMap::from([(
                    "pr".to_string(),
                    vec![EdgeDocument {
                        name: "PrCreated".to_string(),
                        container: None,
                        next: None,
                    }],
                )]),
            },
        );
        let states = BTreeMap::from([("PrCreated".to_string(), "inReview".to_string())]);
        let document = GraphDocument {
            acts,
            states,
            initial_act: "Implement".to_string(),
        };
        Arc::new(Graph::compile(&document, &BTreeMap::new()).expect("compiles"))
    }

    #[test]
    fn builds_one_executor_per_distinct_name() {
        let graph = sample_graph();
        let executors = interactive_executors(&graph);
        assert_eq!(executors.len(), 1);
        assert_eq!(executors[0].name(), "implement");
        assert!(executors[0].result_types().contains("pr"));
    }
}
