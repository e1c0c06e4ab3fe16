//! Wires the spec index, ignore matcher, snapshot differ, state store,
//! counter, scheduler, and agent pool into the rotation loop.

pub mod engine;
pub mod history;
pub mod iteration;

pub use engine::{run_loop, IterationEndCallback, IterationStartCallback, LoopOptions, LoopResult};
pub use history::{format_log_entry, LogEntryInput};
pub use iteration::{run_iteration, run_test_command, IterationResult};
