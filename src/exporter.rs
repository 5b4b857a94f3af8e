//! The exporter: drives Resolver -> Synthesizer -> Assembler once per
//! graph in a model, producing one executable artifact per graph.

use crate::compile::{assemble, schedule, unit, CompileError, FanInStrategy, GraphExecutable};
use crate::ir::{Graph, Model};
use crate::registry::FunctionRegistry;
use crate::roundtrip::{RoundTripOutcome, RoundTripValidator};
use crate::validation::{ValidationError, Validator};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// The result of compiling a model.
///
/// Validation failures abort the whole model before this exists; per-graph
/// synthesis failures land in `failures` without disturbing sibling graphs.
/// Round-trip outcomes are reported separately from compilation.
#[derive(Debug, Default)]
pub struct CompiledModel {
    pub model_id: String,
    pub artifacts: BTreeMap<String, GraphExecutable>,
    pub failures: BTreeMap<String, CompileError>,
    pub roundtrip: BTreeMap<String, RoundTripOutcome>,
}

/// Compiles IR models into executable artifacts.
pub struct Exporter<'a> {
    registry: &'a FunctionRegistry,
    strategy: FanInStrategy,
    roundtrip: Option<&'a dyn RoundTripValidator>,
}

impl<'a> Exporter<'a> {
    pub fn new(registry: &'a FunctionRegistry) -> Self {
        Self {
            registry,
            strategy: FanInStrategy::default(),
            roundtrip: None,
        }
    }

    /// Selects the fan-in strategy for assembled artifacts.
    pub fn with_fan_in(mut self, strategy: FanInStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Attaches an external round-trip validator; each successfully
    /// compiled graph is checked and the outcome recorded.
    pub fn with_roundtrip_validator(mut self, validator: &'a dyn RoundTripValidator) -> Self {
        self.roundtrip = Some(validator);
        self
    }

    /// Compiles every graph in the model.
    ///
    /// IR validation runs first and a non-empty report aborts the whole
    /// model. Graph compilations are independent of each other and run in
    /// parallel; each failure is isolated to its graph.
    #[instrument(skip_all, fields(model = %model.id))]
    pub fn compile_model(&self, model: &Model) -> Result<CompiledModel, Vec<ValidationError>> {
        Validator::new(model, self.registry).validate()?;
        info!(graphs = model.graphs.len(), "model validated");

        let compiled: Vec<(&Graph, Result<GraphExecutable, CompileError>)> = model
            .graphs
            .par_iter()
            .map(|graph| (graph, self.compile_graph(graph)))
            .collect();

        let mut result = CompiledModel {
            model_id: model.id.clone(),
            ..Default::default()
        };
        for (graph, outcome) in compiled {
            match outcome {
                Ok(artifact) => {
                    if let Some(validator) = self.roundtrip {
                        // Validation steps mutate execution counters and
                        // stateful slots, so it runs on a throwaway clone;
                        // the delivered artifact stays at its initial state.
                        let outcome = validator.validate(graph, &mut artifact.clone());
                        if outcome.is_err() {
                            warn!(graph = %graph.id, "round-trip validation failed");
                        }
                        result.roundtrip.insert(graph.id.clone(), outcome);
                    }
                    result.artifacts.insert(graph.id.clone(), artifact);
                }
                Err(error) => {
                    warn!(graph = %graph.id, %error, "graph failed to compile");
                    result.failures.insert(graph.id.clone(), error);
                }
            }
        }
        Ok(result)
    }

    /// Compiles a single graph: schedule, synthesize each node in
    /// execution order, assemble.
    #[instrument(skip_all, fields(graph = %graph.id))]
    pub fn compile_graph(&self, graph: &Graph) -> Result<GraphExecutable, CompileError> {
        let plan = schedule::resolve(graph)?;
        debug!(nodes = plan.order.len(), "schedule resolved");
        let units = plan
            .order
            .iter()
            .map(|node_id| {
                let node = graph
                    .get_node(node_id)
                    .expect("schedule only contains graph nodes");
                unit::synthesize(node, self.registry)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(assemble::GraphExecutable::new(
            graph.id.clone(),
            &plan,
            units,
            self.strategy,
        ))
    }
}
