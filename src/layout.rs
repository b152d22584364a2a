//! Auto-layout adapters.

use crate::{Edge, Node, Position, NODE_SIZE};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};

/// Computes new positions for a whole graph.
///
/// Returns every input node, in input order, with its position replaced.
#[async_trait]
pub trait GraphLayout: Send + Sync {
    async fn layout(&self, nodes: Vec<Node>, edges: &[Edge]) -> Result<Vec<Node>>;
}

/// Top-down layered layout.
///
/// Each node sits one layer below its deepest predecessor. Nodes on a cycle
/// are placed on one extra layer below everything else.
#[derive(Debug, Clone, Copy)]
pub struct LayeredLayout {
    /// Vertical gap between layers
    pub layer_gap: f64,
    /// Horizontal gap between nodes of one layer
    pub node_gap: f64,
}

impl Default for LayeredLayout {
    fn default() -> Self {
        Self {
            layer_gap: 80.0,
            node_gap: 40.0,
        }
    }
}

impl LayeredLayout {
    /// Layer index per node, in node order
    pub fn layers(nodes: &[Node], edges: &[Edge]) -> Vec<usize> {
        let index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        let mut in_degree = vec![0usize; nodes.len()];

        for edge in edges {
            let (Some(&from), Some(&to)) =
                (index.get(edge.source.as_str()), index.get(edge.target.as_str()))
            else {
                continue;
            };
            if from == to {
                continue;
            }
            successors[from].push(to);
            in_degree[to] += 1;
        }

        let mut layer: Vec<Option<usize>> = vec![None; nodes.len()];
        let mut depth = vec![0usize; nodes.len()];
        let mut queue: VecDeque<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();

        while let Some(current) = queue.pop_front() {
            layer[current] = Some(depth[current]);

            for &next in &successors[current] {
                depth[next] = depth[next].max(depth[current] + 1);
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    queue.push_back(next);
                }
            }
        }

        let cycle_layer = layer.iter().flatten().max().map_or(0, |deepest| deepest + 1);
        layer.into_iter().map(|l| l.unwrap_or(cycle_layer)).collect()
    }

    /// Synchronous layout used by the async adapter and the CLI
    pub fn arrange(&self, mut nodes: Vec<Node>, edges: &[Edge]) -> Vec<Node> {
        let layers = Self::layers(&nodes, edges);

        let mut rows: HashMap<usize, Vec<usize>> = HashMap::new();
        for (i, &l) in layers.iter().enumerate() {
            rows.entry(l).or_default().push(i);
        }

        let column = NODE_SIZE.width + self.node_gap;
        let row = NODE_SIZE.height + self.layer_gap;

        for (l, members) in rows {
            let centre = (members.len() as f64 - 1.0) / 2.0;

            for (slot, &i) in members.iter().enumerate() {
                let x = (slot as f64 - centre) * column - NODE_SIZE.width / 2.0;
                nodes[i].set_position(Position::new(x, l as f64 * row));
            }
        }

        nodes
    }
}

#[async_trait]
impl GraphLayout for LayeredLayout {
    async fn layout(&self, nodes: Vec<Node>, edges: &[Edge]) -> Result<Vec<Node>> {
        Ok(self.arrange(nodes, edges))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NodeData, NodeType};
    use pretty_assertions::assert_eq;

    fn node(id: &str) -> Node {
        Node::with_id(id, NodeType::Transform, Position::new(999.0, 999.0), NodeData::default())
    }

    #[test]
    fn test_layers_follow_longest_path() {
        let nodes = vec![node("a"), node("b"), node("c"), node("d")];
        let edges = vec![
            Edge::between("a", "b"),
            Edge::between("b", "c"),
            Edge::between("a", "c"),
            Edge::between("c", "d"),
        ];

        assert_eq!(LayeredLayout::layers(&nodes, &edges), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_cycles_go_below_deepest_layer() {
        let nodes = vec![node("a"), node("b"), node("x"), node("y")];
        let edges = vec![
            Edge::between("a", "b"),
            Edge::between("x", "y"),
            Edge::between("y", "x"),
        ];

        assert_eq!(LayeredLayout::layers(&nodes, &edges), vec![0, 1, 2, 2]);
    }

    #[test]
    fn test_dangling_and_self_edges_are_ignored() {
        let nodes = vec![node("a")];
        let edges = vec![Edge::between("a", "a"), Edge::between("a", "ghost")];

        assert_eq!(LayeredLayout::layers(&nodes, &edges), vec![0]);
    }

    #[test]
    fn test_arrange_centres_each_layer() {
        let nodes = vec![node("root"), node("left"), node("right")];
        let edges = vec![Edge::between("root", "left"), Edge::between("root", "right")];

        let placed = LayeredLayout::default().arrange(nodes, &edges);

        assert_eq!(placed[0].position, Position::new(-130.0, 0.0));
        assert_eq!(placed[1].position, Position::new(-280.0, 130.0));
        assert_eq!(placed[2].position, Position::new(20.0, 130.0));
    }

    #[tokio::test]
    async fn test_layout_is_deterministic() {
        let nodes = vec![node("a"), node("b"), node("c")];
        let edges = vec![Edge::between("a", "c"), Edge::between("b", "c")];
        let layout = LayeredLayout::default();

        let first = layout.layout(nodes.clone(), &edges).await.unwrap();
        let second = layout.layout(nodes, &edges).await.unwrap();

        assert_eq!(first, second);
        let ids: Vec<&str> = first.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
