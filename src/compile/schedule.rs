//! Dependency resolution: execution order and predecessor map.
//!
//! Kahn's algorithm over the edge-induced DAG. Edge-iteration order alone
//! (emit sender, then receiver) is not a valid schedule for non-linear
//! graphs, so the sort here is a correctness requirement, not a fast path.

use super::error::CompileError;
use crate::ir::Graph;
use std::collections::{BTreeSet, HashMap};

/// One incoming contribution to a node: the sending node's id plus the
/// edge's declared weight, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub sender: String,
    pub weight: Option<f64>,
}

/// A resolved execution plan for one graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    /// Node ids in a valid execution order: for every edge s -> r, s
    /// appears before r. Ties are broken by node declaration order, and
    /// nodes touching no edge are appended in declaration order.
    pub order: Vec<String>,
    /// Incoming contributions per node, in edge declaration order.
    pub predecessors: HashMap<String, Vec<Contribution>>,
}

impl Schedule {
    pub fn position(&self, node_id: &str) -> Option<usize> {
        self.order.iter().position(|id| id == node_id)
    }
}

/// Computes the execution order and predecessor map for a graph.
///
/// Assumes edge endpoints were validated; edges naming unknown nodes are
/// skipped here. Any residual unordered node means a cycle and fails with
/// [`CompileError::CyclicGraph`].
pub fn resolve(graph: &Graph) -> Result<Schedule, CompileError> {
    let index_of: HashMap<&str, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let mut in_degree = vec![0usize; graph.nodes.len()];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); graph.nodes.len()];
    let mut touched = vec![false; graph.nodes.len()];
    let mut predecessors: HashMap<String, Vec<Contribution>> = graph
        .nodes
        .iter()
        .map(|n| (n.id.clone(), Vec::new()))
        .collect();

    for edge in &graph.edges {
        let (Some(&s), Some(&r)) = (
            index_of.get(edge.sender.as_str()),
            index_of.get(edge.receiver.as_str()),
        ) else {
            continue;
        };
        successors[s].push(r);
        in_degree[r] += 1;
        touched[s] = true;
        touched[r] = true;
        predecessors
            .get_mut(&edge.receiver)
            .expect("receiver present by construction")
            .push(Contribution {
                sender: edge.sender.clone(),
                weight: edge.weight,
            });
    }

    // Kahn over the connected portion, picking the lowest declaration index
    // among ready nodes so the order is deterministic.
    let mut ready: BTreeSet<usize> = (0..graph.nodes.len())
        .filter(|&i| touched[i] && in_degree[i] == 0)
        .collect();
    let mut order = Vec::with_capacity(graph.nodes.len());
    let connected_total = touched.iter().filter(|&&t| t).count();

    while let Some(&next) = ready.iter().next() {
        ready.remove(&next);
        order.push(graph.nodes[next].id.clone());
        for &succ in &successors[next] {
            in_degree[succ] -= 1;
            if in_degree[succ] == 0 {
                ready.insert(succ);
            }
        }
    }

    if order.len() != connected_total {
        return Err(CompileError::CyclicGraph {
            graph_id: graph.id.clone(),
        });
    }

    // Isolated nodes run last, in declaration order.
    for (i, node) in graph.nodes.iter().enumerate() {
        if !touched[i] {
            order.push(node.id.clone());
        }
    }

    Ok(Schedule {
        order,
        predecessors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Edge, Node};

    fn graph_with(node_ids: &[&str], edges: Vec<Edge>) -> Graph {
        Graph {
            id: "g".to_string(),
            nodes: node_ids
                .iter()
                .map(|id| Node {
                    id: id.to_string(),
                    ..Default::default()
                })
                .collect(),
            edges,
        }
    }

    fn position(schedule: &Schedule, id: &str) -> usize {
        schedule.position(id).unwrap()
    }

    #[test]
    fn every_edge_respects_order() {
        // Diamond: a -> b, a -> c, b -> d, c -> d.
        let graph = graph_with(
            &["d", "c", "b", "a"],
            vec![
                Edge::new("a", "b"),
                Edge::new("a", "c"),
                Edge::new("b", "d"),
                Edge::new("c", "d"),
            ],
        );
        let schedule = resolve(&graph).unwrap();
        for edge in &graph.edges {
            assert!(
                position(&schedule, &edge.sender) < position(&schedule, &edge.receiver),
                "{} must precede {}",
                edge.sender,
                edge.receiver
            );
        }
    }

    #[test]
    fn ties_follow_declaration_order() {
        // b and c are both ready after a; b is declared first.
        let graph = graph_with(
            &["a", "b", "c", "d"],
            vec![
                Edge::new("a", "b"),
                Edge::new("a", "c"),
                Edge::new("b", "d"),
                Edge::new("c", "d"),
            ],
        );
        let schedule = resolve(&graph).unwrap();
        assert_eq!(schedule.order, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn isolated_nodes_appended_in_declaration_order() {
        let graph = graph_with(
            &["lonely", "a", "hermit", "b"],
            vec![Edge::new("a", "b")],
        );
        let schedule = resolve(&graph).unwrap();
        assert_eq!(schedule.order, vec!["a", "b", "lonely", "hermit"]);
    }

    #[test]
    fn two_node_cycle_is_rejected() {
        let graph = graph_with(&["a", "b"], vec![Edge::new("a", "b"), Edge::new("b", "a")]);
        let err = resolve(&graph).unwrap_err();
        assert_eq!(err, CompileError::CyclicGraph { graph_id: "g".into() });
    }

    #[test]
    fn cycle_behind_a_chain_is_rejected() {
        let graph = graph_with(
            &["a", "b", "c"],
            vec![Edge::new("a", "b"), Edge::new("b", "c"), Edge::new("c", "b")],
        );
        assert!(matches!(
            resolve(&graph),
            Err(CompileError::CyclicGraph { .. })
        ));
    }

    #[test]
    fn predecessors_keep_edge_declaration_order_and_weights() {
        let graph = graph_with(
            &["a", "b", "sink"],
            vec![
                Edge::weighted("b", "sink", 0.5),
                Edge::new("a", "sink"),
            ],
        );
        let schedule = resolve(&graph).unwrap();
        let feeds = &schedule.predecessors["sink"];
        assert_eq!(feeds.len(), 2);
        assert_eq!(feeds[0].sender, "b");
        assert_eq!(feeds[0].weight, Some(0.5));
        assert_eq!(feeds[1].sender, "a");
        assert_eq!(feeds[1].weight, None);
    }

    #[test]
    fn duplicate_edges_each_contribute() {
        let graph = graph_with(
            &["a", "b"],
            vec![Edge::weighted("a", "b", 1.0), Edge::weighted("a", "b", 2.0)],
        );
        let schedule = resolve(&graph).unwrap();
        assert_eq!(schedule.predecessors["b"].len(), 2);
        assert_eq!(schedule.order, vec!["a", "b"]);
    }
}
