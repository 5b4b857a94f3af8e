//! Round-trip validation seam.
//!
//! After a graph compiles, an external validator can serialize the artifact
//! to an interchange format, execute it under a third-party runtime, and
//! compare outputs. This is a regression check on the compiler, not part of
//! its contract: its failures are reported alongside, never as, compile
//! errors.

use crate::compile::GraphExecutable;
use crate::ir::Graph;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoundTripError {
    #[error("interchange export failed for graph '{graph_id}': {message}")]
    Interchange { graph_id: String, message: String },
    #[error(
        "graph '{graph_id}' diverged from the reference at step {step}, node '{node_id}': \
         compiled {compiled}, reference {reference}"
    )]
    Mismatch {
        graph_id: String,
        step: usize,
        node_id: String,
        compiled: f64,
        reference: f64,
    },
}

/// A successful round-trip comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundTripReport {
    pub steps: usize,
    pub max_abs_difference: f64,
}

pub type RoundTripOutcome = Result<RoundTripReport, RoundTripError>;

/// An external round-trip validator.
///
/// Implementations receive the source graph and a mutable handle to a
/// freshly compiled artifact. Execution mutates the artifact's internal
/// state, so the exporter always passes a throwaway clone.
pub trait RoundTripValidator: Send + Sync {
    fn validate(&self, graph: &Graph, artifact: &mut GraphExecutable) -> RoundTripOutcome;
}

/// A validator that drives the artifact for a fixed number of steps and
/// compares each pass against pre-recorded reference traces.
///
/// Useful as a harness against traces captured from a reference execution
/// engine; also the in-tree exercise of the validator seam.
pub struct TraceValidator {
    /// Reference outputs per forward pass, in execution order.
    pub expected: Vec<Vec<f64>>,
    /// External input fed on every pass.
    pub input: f64,
    /// Absolute tolerance per value.
    pub tolerance: f64,
}

impl RoundTripValidator for TraceValidator {
    fn validate(&self, graph: &Graph, artifact: &mut GraphExecutable) -> RoundTripOutcome {
        let mut max_abs_difference = 0.0f64;
        for (step, expected) in self.expected.iter().enumerate() {
            let actual = artifact.forward(self.input);
            if actual.len() != expected.len() {
                return Err(RoundTripError::Interchange {
                    graph_id: graph.id.clone(),
                    message: format!(
                        "reference trace has {} values, artifact produced {}",
                        expected.len(),
                        actual.len()
                    ),
                });
            }
            for (position, (&got, &want)) in actual.iter().zip(expected).enumerate() {
                let difference = (got - want).abs();
                max_abs_difference = max_abs_difference.max(difference);
                if difference > self.tolerance {
                    return Err(RoundTripError::Mismatch {
                        graph_id: graph.id.clone(),
                        step,
                        node_id: artifact.order()[position].clone(),
                        compiled: got,
                        reference: want,
                    });
                }
            }
        }
        Ok(RoundTripReport {
            steps: self.expected.len(),
            max_abs_difference,
        })
    }
}
