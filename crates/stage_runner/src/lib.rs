//! # Stage Runner
//!
//! Stage invoker implementations.
//!
//! Responsibilities:
//! - Launch a stage as an isolated external job and wait for it to exit
//! - Attach run-grouping metadata to each job explicitly
//! - Report abnormal termination as `StageExecution`
//! - Provide a recording mock for tests

pub mod mock;
pub mod process;

pub use contracts::{StageInvocation, StageInvoker};
pub use mock::{MockInvoker, MockInvokerConfig};
pub use process::{ProcessInvoker, ProcessInvokerConfig};
