//! Asynchronous execution mode
//! Await a future (or a closure producing one) without blocking the runtime,
//! capture its outcome and timing

use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use futures::FutureExt;

use crate::logging::log_outcome;
use crate::options::ExecutionOptions;
use crate::outcome::{CapturedError, ExecutionOutcome, ExecutionTime};

/// Execute an already-pending future, capturing its value or panic and the
/// elapsed wall-clock time.
///
/// Timing starts before the first poll and ends after the future settles, so
/// the reported duration includes any scheduling latency incurred while
/// suspended. The returned future always resolves to an outcome; a panic in
/// the inner future is captured into the
/// [`Failure`](ExecutionOutcome::Failure) variant, never propagated.
///
/// The log label for a bare future defaults to `"promise"`; set
/// `options.label` for something meaningful.
///
/// ```
/// use x8t::{execute_async, ExecutionOptions};
///
/// # #[tokio::main(flavor = "current_thread")] async fn main() {
/// let outcome = execute_async(async { "done" }, ExecutionOptions::default()).await;
/// assert_eq!(outcome.result(), Some(&"done"));
/// # }
/// ```
pub async fn execute_async<T, F>(fut: F, options: ExecutionOptions) -> ExecutionOutcome<T>
where
    F: Future<Output = T>,
    T: fmt::Debug,
{
    let start = Instant::now();
    settle(fut, start, options, "promise").await
}

/// Execute a closure that produces a future.
///
/// Same contract as [`execute_async`], with one addition: a panic while
/// *producing* the future (before any await) converges to the same
/// `Failure` shape as a panic during the await. The log label defaults to
/// `"anonymous"`.
pub async fn execute_async_fn<T, C, F>(f: C, options: ExecutionOptions) -> ExecutionOutcome<T>
where
    C: FnOnce() -> F,
    F: Future<Output = T>,
    T: fmt::Debug,
{
    let start = Instant::now();
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(fut) => settle(fut, start, options, "anonymous").await,
        Err(payload) => {
            let execution_time = ExecutionTime::from_elapsed(start.elapsed());
            let outcome = ExecutionOutcome::Failure {
                error: CapturedError::from_panic(payload),
                execution_time,
            };
            log_outcome(&outcome, &options, "anonymous");
            outcome
        }
    }
}

async fn settle<T, F>(
    fut: F,
    start: Instant,
    options: ExecutionOptions,
    fallback_label: &str,
) -> ExecutionOutcome<T>
where
    F: Future<Output = T>,
    T: fmt::Debug,
{
    let caught = AssertUnwindSafe(fut).catch_unwind().await;
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

    log_outcome(&outcome, &options, fallback_label);
    outcome
}
