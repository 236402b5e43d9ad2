//! x8t - Execution wrapper
//!
//! Runs a synchronous closure or an asynchronous unit of work, captures
//! either its value or the failure it raised, measures elapsed wall-clock
//! time, and optionally emits a one-line execution log to a console-like
//! sink and/or an append-only file. The point is that callers never write
//! the timer-plus-catch boilerplate themselves:
//!
//! ```
//! use x8t::{execute_sync, ExecutionOptions};
//!
//! let outcome = execute_sync(|| 40 + 2, ExecutionOptions::default());
//! assert_eq!(outcome.result(), Some(&42));
//! assert!(outcome.execution_time().as_millis() < 1000);
//! ```
//!
//! Failures of the wrapped work are never re-raised; inspect the returned
//! [`ExecutionOutcome`] tag instead. Logging is opt-in via
//! [`ExecutionOptions`].

// Module declarations
pub mod execution;
pub mod logging;
pub mod options;
pub mod outcome;

pub use execution::{execute_async, execute_async_fn, execute_sync};
pub use logging::{log_execution, ConsoleSink, SinkError};
pub use options::{ExecutionOptions, FileSinkConfig};
pub use outcome::{CapturedError, ExecutionOutcome, ExecutionTime};
