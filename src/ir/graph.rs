//! Defines the `Graph` and `Model` containers.

use super::{Edge, Node};
use serde::{Deserialize, Serialize};

/// A computational graph: nodes plus weighted directed edges.
///
/// Declaration order of `nodes` and `edges` is semantically meaningful: the
/// scheduler breaks ordering ties by node declaration index, and fan-in
/// contributions are consumed in edge declaration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Graph {
    pub id: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Declaration index of a node, used for deterministic tie-breaking.
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }
}

/// An ordered collection of graphs compiled as one batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    #[serde(default)]
    pub graphs: Vec<Graph>,
}

impl Model {
    /// Deserializes a model from its persisted JSON description.
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_round_trips_through_json() {
        let source = r#"{
            "id": "m1",
            "graphs": [{
                "id": "g1",
                "nodes": [
                    {
                        "id": "source",
                        "output_ports": [{"id": "out", "value": "level"}],
                        "parameters": [{"id": "level", "value": 3.0}]
                    },
                    {
                        "id": "sink",
                        "input_ports": [{"id": "in"}],
                        "output_ports": [{"id": "out", "value": "in"}]
                    }
                ],
                "edges": [{"sender": "source", "receiver": "sink", "weight": 2.0}]
            }]
        }"#;
        let model = Model::from_json(source).unwrap();
        assert_eq!(model.graphs.len(), 1);
        let graph = &model.graphs[0];
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges[0].weight, Some(2.0));
        assert_eq!(graph.node_index("sink"), Some(1));

        let reparsed = Model::from_json(&model.to_json().unwrap()).unwrap();
        assert_eq!(reparsed, model);
    }
}
