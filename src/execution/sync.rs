//! Synchronous execution mode
//! Run the closure on the calling thread, capture its outcome and timing

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use crate::logging::log_outcome;
use crate::options::ExecutionOptions;
use crate::outcome::{CapturedError, ExecutionOutcome, ExecutionTime};

/// Execute a synchronous closure, capturing its value or panic and the
/// elapsed wall-clock time.
///
/// Never panics itself: a panic inside `f` is caught and returned as the
/// [`Failure`](ExecutionOutcome::Failure) variant with the payload passed
/// through verbatim. Note the process panic hook still runs before the
/// panic is captured, so the usual "thread panicked" notice may appear on
/// stderr; install a quieter hook if that is unwanted.
///
/// With `options.log` set, emits exactly one log entry after the outcome is
/// determined.
///
/// ```
/// use x8t::{execute_sync, ExecutionOptions};
///
/// let outcome = execute_sync(|| 42, ExecutionOptions::default());
/// assert_eq!(outcome.result(), Some(&42));
///
/// let outcome = execute_sync(|| -> i32 { panic!("boom") }, ExecutionOptions::default());
/// assert!(outcome.is_failure());
/// ```
pub fn execute_sync<T, F>(f: F, options: ExecutionOptions) -> ExecutionOutcome<T>
where
    F: FnOnce() -> T,
    T: fmt::Debug,
{
    let start = Instant::now();
    let caught = panic::catch_unwind(AssertUnwindSafe(f));
    let execution_time = ExecutionTime::from_elapsed(start.elapsed());

    let outcome = match caught {
        Ok(result) => ExecutionOutcome::Success {
            result,
            execution_time,
        },
        Err(payload) => ExecutionOutcome::Failure {
            error: CapturedError::from_panic(payload),
            execution_time,
        },
    };

    log_outcome(&outcome, &options, "anonymous");
    outcome
}
