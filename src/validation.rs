use crate::{Edge, GraphStore, Node};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Validation severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationSeverity {
    Info,    // informational
    Warning, // likely mistake, graph still usable
    Error,   // graph is inconsistent
}

/// Validation issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub message: String,
    pub affected_nodes: Vec<String>,
    pub issue_type: ValidationIssueType,
}

/// Types of validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationIssueType {
    DanglingEdge,
    DuplicateNodeId,
    DuplicateEdgeId,
    NoStartNode,
    Cycle,
    IsolatedNode,
}

/// Complete validation result
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Create a new empty validation result
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    /// Add an issue
    pub fn add_issue(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == ValidationSeverity::Error)
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == ValidationSeverity::Warning)
    }

    /// Get all errors
    pub fn errors(&self) -> Vec<&ValidationIssue> {
        self.with_severity(ValidationSeverity::Error)
    }

    /// Get all warnings
    pub fn warnings(&self) -> Vec<&ValidationIssue> {
        self.with_severity(ValidationSeverity::Warning)
    }

    /// Get all info messages
    pub fn info(&self) -> Vec<&ValidationIssue> {
        self.with_severity(ValidationSeverity::Info)
    }

    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    fn with_severity(&self, severity: ValidationSeverity) -> Vec<&ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == severity).collect()
    }
}

/// Structural checks over a node and edge list. Never blocks editing.
pub struct Validator;

impl Validator {
    /// Run all validations
    pub fn validate(nodes: &[Node], edges: &[Edge]) -> ValidationResult {
        let mut result = ValidationResult::new();

        let duplicate_nodes = duplicates(nodes.iter().map(|n| n.id.as_str()));
        if !duplicate_nodes.is_empty() {
            result.add_issue(ValidationIssue {
                severity: ValidationSeverity::Error,
                message: format!("Duplicate node ids: {}", duplicate_nodes.join(", ")),
                affected_nodes: duplicate_nodes,
                issue_type: ValidationIssueType::DuplicateNodeId,
            });
        }

        let duplicate_edges = duplicates(edges.iter().map(|e| e.id.as_str()));
        if !duplicate_edges.is_empty() {
            result.add_issue(ValidationIssue {
                severity: ValidationSeverity::Warning,
                message: format!("Duplicate edge ids: {}", duplicate_edges.join(", ")),
                affected_nodes: vec![],
                issue_type: ValidationIssueType::DuplicateEdgeId,
            });
        }

        let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        for edge in edges {
            let missing: Vec<String> = [&edge.source, &edge.target]
                .into_iter()
                .filter(|id| !ids.contains(id.as_str()))
                .cloned()
                .collect();

            if !missing.is_empty() {
                result.add_issue(ValidationIssue {
                    severity: ValidationSeverity::Error,
                    message: format!(
                        "Edge {} references missing node(s): {}",
                        edge.id,
                        missing.join(", ")
                    ),
                    affected_nodes: missing,
                    issue_type: ValidationIssueType::DanglingEdge,
                });
            }
        }

        // Every node has an incoming edge
        if !nodes.is_empty() && nodes.iter().all(|n| edges.iter().any(|e| e.target == n.id)) {
            result.add_issue(ValidationIssue {
                severity: ValidationSeverity::Warning,
                message: "No starting node: every node has an incoming edge. The workflow cannot run."
                    .to_string(),
                affected_nodes: vec![],
                issue_type: ValidationIssueType::NoStartNode,
            });
        }

        if let Some(cycle_nodes) = Self::detect_cycles(nodes, edges) {
            result.add_issue(ValidationIssue {
                severity: ValidationSeverity::Warning,
                message: format!(
                    "Cycle detected involving {} nodes. Runs visit each node once.",
                    cycle_nodes.len()
                ),
                affected_nodes: cycle_nodes,
                issue_type: ValidationIssueType::Cycle,
            });
        }

        if nodes.len() > 1 {
            let isolated: Vec<String> = nodes
                .iter()
                .filter(|n| !edges.iter().any(|e| e.involves(&n.id)))
                .map(|n| n.id.clone())
                .collect();

            if !isolated.is_empty() {
                result.add_issue(ValidationIssue {
                    severity: ValidationSeverity::Info,
                    message: format!("{} node(s) have no connections.", isolated.len()),
                    affected_nodes: isolated,
                    issue_type: ValidationIssueType::IsolatedNode,
                });
            }
        }

        result
    }

    /// Detect a cycle in the edge graph using DFS
    fn detect_cycles(nodes: &[Node], edges: &[Edge]) -> Option<Vec<String>> {
        let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in edges {
            outgoing
                .entry(edge.source.as_str())
                .or_default()
                .push(edge.target.as_str());
        }

        let mut visited = HashSet::new();
        for node in nodes {
            if visited.contains(node.id.as_str()) {
                continue;
            }
            if let Some(cycle) = Self::walk_for_cycle(&outgoing, &node.id, &mut visited) {
                return Some(cycle);
            }
        }

        None
    }

    /// Iterative DFS from `root`. Each `path` frame holds a node on the
    /// current chain and the index of its next outgoing target.
    fn walk_for_cycle<'a>(
        outgoing: &HashMap<&'a str, Vec<&'a str>>,
        root: &'a str,
        visited: &mut HashSet<&'a str>,
    ) -> Option<Vec<String>> {
        let mut path: Vec<(&'a str, usize)> = vec![(root, 0)];
        let mut on_path: HashSet<&'a str> = HashSet::from([root]);
        visited.insert(root);

        while let Some((id, next)) = path.last_mut() {
            let targets = outgoing.get(*id).map(Vec::as_slice).unwrap_or_default();
            let Some(&target) = targets.get(*next) else {
                on_path.remove(*id);
                path.pop();
                continue;
            };
            *next += 1;

            if on_path.contains(target) {
                let start = path.iter().position(|(id, _)| *id == target)?;
                return Some(path[start..].iter().map(|(id, _)| id.to_string()).collect());
            }
            if visited.insert(target) {
                on_path.insert(target);
                path.push((target, 0));
            }
        }

        None
    }
}

/// Ids seen more than once, in first-seen order
fn duplicates<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut repeated = Vec::new();

    for id in ids {
        if !seen.insert(id) && !repeated.iter().any(|r: &String| r == id) {
            repeated.push(id.to_string());
        }
    }

    repeated
}

/// Extension trait for GraphStore to add validation
pub trait ValidatedStore {
    /// Validate the current graph
    fn validate(&self) -> ValidationResult;

    /// Highest severity per affected node
    fn nodes_with_issues(&self, result: &ValidationResult) -> HashMap<String, ValidationSeverity>;
}

impl ValidatedStore for GraphStore {
    fn validate(&self) -> ValidationResult {
        Validator::validate(self.nodes(), self.edges())
    }

    fn nodes_with_issues(&self, result: &ValidationResult) -> HashMap<String, ValidationSeverity> {
        let mut nodes = HashMap::new();

        for issue in &result.issues {
            for node_id in &issue.affected_nodes {
                nodes
                    .entry(node_id.clone())
                    .and_modify(|severity| {
                        // Keep the highest severity
                        if issue.severity as u8 > *severity as u8 {
                            *severity = issue.severity;
                        }
                    })
                    .or_insert(issue.severity);
            }
        }

        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NodeData, NodeType, Position};

    fn node(id: &str) -> Node {
        Node::with_id(id, NodeType::Transform, Position::default(), NodeData::default())
    }

    #[test]
    fn test_valid_chain() {
        let nodes = vec![node("a"), node("b")];
        let edges = vec![Edge::between("a", "b")];

        let result = Validator::validate(&nodes, &edges);
        assert!(result.is_valid());
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_dangling_edge_error() {
        let nodes = vec![node("a")];
        let edges = vec![Edge::between("a", "ghost")];

        let result = Validator::validate(&nodes, &edges);
        assert!(result.has_errors());

        let error = result.errors()[0];
        assert_eq!(error.issue_type, ValidationIssueType::DanglingEdge);
        assert_eq!(error.affected_nodes, vec!["ghost".to_string()]);
    }

    #[test]
    fn test_duplicate_ids() {
        let nodes = vec![node("a"), node("a"), node("b")];
        let edges = vec![Edge::between("a", "b"), Edge::between("a", "b")];

        let result = Validator::validate(&nodes, &edges);
        assert!(result
            .errors()
            .iter()
            .any(|e| e.issue_type == ValidationIssueType::DuplicateNodeId));
        assert!(result
            .warnings()
            .iter()
            .any(|w| w.issue_type == ValidationIssueType::DuplicateEdgeId));
    }

    #[test]
    fn test_cycle_and_no_start_warnings() {
        let nodes = vec![node("a"), node("b")];
        let edges = vec![Edge::between("a", "b"), Edge::between("b", "a")];

        let result = Validator::validate(&nodes, &edges);
        assert!(result.is_valid());

        let warnings = result.warnings();
        assert!(warnings.iter().any(|w| w.issue_type == ValidationIssueType::NoStartNode));

        let cycle = warnings
            .iter()
            .find(|w| w.issue_type == ValidationIssueType::Cycle)
            .unwrap();
        assert_eq!(cycle.affected_nodes, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_cycle_search_handles_long_chains() {
        let len = 100_000;
        let nodes: Vec<Node> = (0..len).map(|i| node(&format!("n{i}"))).collect();
        let mut edges: Vec<Edge> = (1..len)
            .map(|i| Edge::between(format!("n{}", i - 1), format!("n{i}")))
            .collect();

        assert_eq!(Validator::detect_cycles(&nodes, &edges), None);

        edges.push(Edge::between(format!("n{}", len - 1), format!("n{}", len - 3)));
        let cycle = Validator::detect_cycles(&nodes, &edges).unwrap();
        assert_eq!(
            cycle,
            vec![
                format!("n{}", len - 3),
                format!("n{}", len - 2),
                format!("n{}", len - 1)
            ]
        );
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let nodes = vec![node("a")];
        let edges = vec![Edge::between("a", "a")];

        assert_eq!(Validator::detect_cycles(&nodes, &edges), Some(vec!["a".to_string()]));
    }

    #[test]
    fn test_isolated_node_info() {
        let nodes = vec![node("a"), node("b"), node("lonely")];
        let edges = vec![Edge::between("a", "b")];

        let result = Validator::validate(&nodes, &edges);
        let info = result.info();
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].affected_nodes, vec!["lonely".to_string()]);
    }

    #[test]
    fn test_nodes_with_issues_keeps_highest_severity() {
        let store = GraphStore::with_graph(
            vec![node("a"), node("b"), node("c")],
            vec![Edge::between("a", "b"), Edge::between("c", "ghost")],
        );

        let result = store.validate();
        let flagged = store.nodes_with_issues(&result);

        assert_eq!(flagged["ghost"], ValidationSeverity::Error);
        assert!(!flagged.contains_key("a"));
    }
}
