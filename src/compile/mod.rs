//! The compiler core: scheduling, translation, synthesis, and assembly.
//!
//! Compilation of one graph is a synchronous, side-effect-free batch
//! transform. All bookkeeping (scope tables, slot maps, schedules) is owned
//! by the single compile call, so independent compilations can run on
//! separate threads without locking.
pub mod assemble;
pub mod error;
pub mod schedule;
pub mod translate;
pub mod unit;

pub use assemble::{FanInStrategy, GraphExecutable};
pub use error::CompileError;
pub use schedule::{Contribution, Schedule};
pub use unit::NodeUnit;
