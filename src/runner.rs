//! Toy workflow runner: simulated processing or markdown export.

use crate::{Edge, Node, NodeStatus, NodeType, SeparatorKind, SharedStore};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const LOG_STARTING: &str = "Starting workflow...";
pub const LOG_STOPPED: &str = "Workflow stopped.";
pub const LOG_COMPLETE: &str = "Workflow processing complete.";
pub const LOG_EXPORTED: &str = "Markdown file exported successfully!";

/// Default file name for markdown exports
pub const EXPORT_FILE_NAME: &str = "workflow-export.md";

#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    /// Simulated processing time per node
    pub step_delay: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(2000),
        }
    }
}

/// Runner lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    /// Stop requested; the active run has not observed it yet
    Stopped,
}

/// Handle to one run; invalid once the run is stopped
#[derive(Debug, Clone)]
pub struct RunToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl RunToken {
    pub fn is_valid(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.generation
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Document nodes were present; the graph was rendered to markdown
    Exported { document: String },
    /// Every reachable node was processed
    Completed { processed: usize },
    /// `stop()` was called mid-run; statuses were reset
    Stopped,
    /// Every node has an incoming edge, or the given start id is unknown
    NoStartNode,
    /// Another run is active
    AlreadyRunning,
}

/// Result of a run with the log lines shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub log: Vec<String>,
}

impl RunReport {
    fn new(outcome: RunOutcome, log: Vec<String>) -> Self {
        Self { outcome, log }
    }
}

/// Runs one workflow at a time against a shared store
pub struct GraphRunner {
    config: RunnerConfig,
    state: Mutex<RunState>,
    generation: Arc<AtomicU64>,
}

impl GraphRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(RunState::Idle),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn state(&self) -> RunState {
        *self.state.lock()
    }

    /// Request the active run to stop. Returns false when nothing is running.
    pub fn stop(&self) -> bool {
        let mut state = self.state.lock();
        if *state != RunState::Running {
            return false;
        }

        self.generation.fetch_add(1, Ordering::AcqRel);
        *state = RunState::Stopped;
        info!("workflow stop requested");
        true
    }

    /// Run the workflow from `start`, or from the first node without
    /// incoming edges.
    ///
    /// If any markdown or separator node exists the graph is exported
    /// instead of simulated; exports ignore `start`.
    pub async fn run(&self, store: &SharedStore, start: Option<&str>) -> RunReport {
        if self.state() != RunState::Idle {
            return RunReport::new(RunOutcome::AlreadyRunning, Vec::new());
        }

        let (nodes, edges) = {
            let store = store.lock();
            (store.nodes().to_vec(), store.edges().to_vec())
        };

        // Exports always walk from the first source node
        let exporting = nodes.iter().any(|n| n.node_type.is_document());
        let start = if exporting { None } else { start };

        let Some(start_id) = resolve_start(&nodes, &edges, start) else {
            warn!("no starting node found in the workflow");
            return RunReport::new(RunOutcome::NoStartNode, Vec::new());
        };

        let ordered = collect_nodes_to_process(&nodes, &edges, &start_id);

        if exporting {
            let document = export_markdown(&ordered);
            info!(bytes = document.len(), "exported workflow as markdown");
            return RunReport::new(
                RunOutcome::Exported { document },
                vec![LOG_EXPORTED.to_string()],
            );
        }

        let Some(token) = self.begin() else {
            return RunReport::new(RunOutcome::AlreadyRunning, Vec::new());
        };

        info!(start = %start_id, nodes = ordered.len(), "starting workflow");
        let mut log = vec![LOG_STARTING.to_string()];
        let mut processed = 0;

        for node in &ordered {
            if !token.is_valid() || !self.process_node(store, node, &token, &mut log).await {
                store.lock().reset_statuses();
                log.push(LOG_STOPPED.to_string());
                self.finish();
                info!(processed, "workflow stopped");
                return RunReport::new(RunOutcome::Stopped, log);
            }
            processed += 1;
        }

        log.push(LOG_COMPLETE.to_string());
        self.finish();
        info!(processed, "workflow complete");
        RunReport::new(RunOutcome::Completed { processed }, log)
    }

    /// Mark one node loading, wait, then mark it successful.
    /// Returns false if the run was stopped during the wait.
    async fn process_node(
        &self,
        store: &SharedStore,
        node: &Node,
        token: &RunToken,
        log: &mut Vec<String>,
    ) -> bool {
        store.lock().set_node_status(&node.id, NodeStatus::Loading);
        log.push(format!("{} processing...", node.title()));

        tokio::time::sleep(self.config.step_delay).await;

        if !token.is_valid() {
            return false;
        }

        store.lock().set_node_status(&node.id, NodeStatus::Success);
        true
    }

    fn begin(&self) -> Option<RunToken> {
        let mut state = self.state.lock();
        if *state != RunState::Idle {
            return None;
        }

        *state = RunState::Running;
        Some(RunToken {
            generation: self.generation.load(Ordering::Acquire),
            current: Arc::clone(&self.generation),
        })
    }

    fn finish(&self) {
        *self.state.lock() = RunState::Idle;
    }
}

impl Default for GraphRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

fn resolve_start(nodes: &[Node], edges: &[Edge], start: Option<&str>) -> Option<String> {
    match start {
        Some(id) => nodes.iter().find(|n| n.id == id).map(|n| n.id.clone()),
        None => nodes
            .iter()
            .find(|n| !edges.iter().any(|e| e.target == n.id))
            .map(|n| n.id.clone()),
    }
}

/// Depth-first pre-order walk from `start` along outgoing edges in edge-list
/// order. Each node is visited once; on cycles the first path wins.
pub fn collect_nodes_to_process<'a>(nodes: &'a [Node], edges: &[Edge], start: &str) -> Vec<&'a Node> {
    let mut ordered = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = vec![start];

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Some(node) = nodes.iter().find(|n| n.id == id) else {
            continue;
        };
        ordered.push(node);

        let targets: Vec<&str> = edges
            .iter()
            .filter(|e| e.source == id)
            .map(|e| e.target.as_str())
            .collect();
        stack.extend(targets.into_iter().rev());
    }

    ordered
}

/// Render document nodes in order. Other node types contribute nothing.
pub fn export_markdown(nodes: &[&Node]) -> String {
    let mut document = String::new();

    for node in nodes {
        match node.node_type {
            NodeType::Markdown => {
                let content = node.data.content.as_deref().unwrap_or_default();
                document.push_str(&format!("# {}\n\n{}\n\n", node.title(), content));
            }
            NodeType::Separator => {
                let separator = match node.data.separator_type.unwrap_or_default() {
                    SeparatorKind::Line => "---\n\n",
                    SeparatorKind::Space => "\n\n",
                    SeparatorKind::PageBreak => "\\pagebreak\n\n",
                };
                document.push_str(separator);
            }
            _ => {}
        }
    }

    document
}
