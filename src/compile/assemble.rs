//! Graph assembly: wiring node units into a single forward pass.

use super::schedule::Schedule;
use super::unit::NodeUnit;
use smallvec::SmallVec;
use tracing::trace;

/// Policy for combining multiple predecessor contributions into a node.
///
/// The default invokes a unit once per incoming edge and sums the results,
/// which advances the unit's execution counter once per edge and repeats
/// any stateful update that many times. `PreSummed` is the conventional
/// alternative: combine first, invoke once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanInStrategy {
    /// Invoke the unit once per predecessor contribution and sum the
    /// invocation results. k incoming edges mean k invocations per pass.
    #[default]
    PerEdgeInvocation,
    /// Sum the weighted contributions first, then invoke the unit once.
    PreSummed,
}

/// Incoming wiring for one unit: positions of its predecessors in the
/// execution order, with the edge weights.
type Feeds = SmallVec<[(usize, Option<f64>); 4]>;

/// The compiled, executable artifact for one graph.
///
/// Carries internal mutable state (per-node execution counters, stateful
/// parameter slots); concurrent invocation of one instance requires
/// caller-supplied synchronization.
#[derive(Debug, Clone)]
pub struct GraphExecutable {
    graph_id: String,
    order: Vec<String>,
    units: Vec<NodeUnit>,
    feeds: Vec<Feeds>,
    strategy: FanInStrategy,
}

impl GraphExecutable {
    /// Wires units (already in execution order) against the schedule.
    pub(crate) fn new(
        graph_id: String,
        schedule: &Schedule,
        units: Vec<NodeUnit>,
        strategy: FanInStrategy,
    ) -> Self {
        debug_assert_eq!(schedule.order.len(), units.len());
        let feeds = schedule
            .order
            .iter()
            .map(|node_id| {
                schedule.predecessors[node_id]
                    .iter()
                    .map(|c| {
                        let position = schedule
                            .position(&c.sender)
                            .expect("predecessor precedes receiver in a valid schedule");
                        (position, c.weight)
                    })
                    .collect()
            })
            .collect();
        GraphExecutable {
            graph_id,
            order: schedule.order.clone(),
            units,
            feeds,
            strategy,
        }
    }

    pub fn graph_id(&self) -> &str {
        &self.graph_id
    }

    /// Node ids in execution order; `forward` returns values in this order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn fan_in_strategy(&self) -> FanInStrategy {
        self.strategy
    }

    pub fn unit(&self, node_id: &str) -> Option<&NodeUnit> {
        self.units.iter().find(|u| u.node_id() == node_id)
    }

    /// Runs one forward pass.
    ///
    /// The single external `input` is broadcast to every source node; fed
    /// nodes consume their predecessors' current running values scaled by
    /// the edge weights.
    /// Returns the running value of every node, in execution order.
    pub fn forward(&mut self, input: f64) -> Vec<f64> {
        let mut values = vec![0.0; self.units.len()];
        for i in 0..self.units.len() {
            let unit = &mut self.units[i];
            let arity = unit.input_arity();
            if self.feeds[i].is_empty() {
                let fed: SmallVec<[f64; 4]> = SmallVec::from_elem(input, arity);
                values[i] = unit.step(&fed);
            } else {
                match self.strategy {
                    FanInStrategy::PerEdgeInvocation => {
                        let mut running = 0.0;
                        for &(source, weight) in &self.feeds[i] {
                            let contribution = values[source] * weight.unwrap_or(1.0);
                            let fed: SmallVec<[f64; 4]> = SmallVec::from_elem(contribution, arity);
                            running += unit.step(&fed);
                        }
                        values[i] = running;
                    }
                    FanInStrategy::PreSummed => {
                        let summed: f64 = self.feeds[i]
                            .iter()
                            .map(|&(source, weight)| values[source] * weight.unwrap_or(1.0))
                            .sum();
                        let fed: SmallVec<[f64; 4]> = SmallVec::from_elem(summed, arity);
                        values[i] = unit.step(&fed);
                    }
                }
            }
            trace!(
                graph = %self.graph_id,
                node = %self.order[i],
                value = values[i],
                "node evaluated"
            );
        }
        values
    }
}
