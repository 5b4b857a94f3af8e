//! modelflow_core: compiles declarative computational-graph models into
//! runnable in-memory artifacts.
//!
//! The input is an IR of nodes with typed ports, symbolic parameters, and
//! weighted directed edges ([`ir`]). Compilation resolves a deterministic
//! execution order ([`compile::schedule`]), rewrites symbolic expressions
//! into scoped slot-based form ([`expr`], [`compile::translate`]),
//! synthesizes one stateful unit per node ([`compile::unit`]), and wires the
//! units into a single forward pass ([`compile::assemble`]). The
//! [`exporter::Exporter`] drives the pipeline once per graph in a model.

pub mod compile;
pub mod expr;
pub mod exporter;
pub mod ir;
pub mod registry;
pub mod roundtrip;
pub mod validation;

pub use compile::{CompileError, FanInStrategy, GraphExecutable, NodeUnit};
pub use exporter::{CompiledModel, Exporter};
pub use ir::{Edge, Graph, Model, Node, Parameter, ParameterValue, Port};
pub use registry::{FunctionDef, FunctionRegistry, RegistryError};
pub use roundtrip::{RoundTripError, RoundTripOutcome, RoundTripReport, RoundTripValidator};
pub use validation::{ValidationError, ValidationErrorKind, Validator};
