//! Defines the `Edge` type, a weighted directed dependency between nodes.

use serde::{Deserialize, Serialize};

/// A directed edge from a sender node's output to a receiver node's input.
///
/// The optional weight scales the sender's value before the receiver
/// consumes it; an absent weight passes the value through unscaled.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Edge {
    pub sender: String,
    pub receiver: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Edge {
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>) -> Self {
        Edge {
            sender: sender.into(),
            receiver: receiver.into(),
            weight: None,
        }
    }

    pub fn weighted(sender: impl Into<String>, receiver: impl Into<String>, weight: f64) -> Self {
        Edge {
            sender: sender.into(),
            receiver: receiver.into(),
            weight: Some(weight),
        }
    }
}
