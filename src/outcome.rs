//! Outcome types - Tagged result of a wrapped execution plus its timing

use std::any::Any;
use std::fmt;
use std::time::Duration;

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Elapsed wall-clock time of a wrapped call, rounded to whole milliseconds.
///
/// Displays and serializes as `"<N>ms"`, which is the shape the value takes
/// when it crosses the external boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExecutionTime(u64);

impl ExecutionTime {
    pub(crate) fn from_elapsed(elapsed: Duration) -> Self {
        ExecutionTime((elapsed.as_secs_f64() * 1000.0).round() as u64)
    }

    pub fn from_millis(ms: u64) -> Self {
        ExecutionTime(ms)
    }

    /// Rounded milliseconds.
    pub fn as_millis(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ExecutionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

impl Serialize for ExecutionTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// The value a wrapped call failed with, passed through unchanged.
///
/// The payload is whatever the call panicked with (or, via
/// [`CapturedError::from_value`], the `Err` value of a `Result`-returning
/// call). It is held opaquely: no wrapping, no normalization. A display
/// description is resolved once at capture time, since `dyn Any` itself
/// cannot be formatted.
pub struct CapturedError {
    payload: Box<dyn Any + Send>,
    description: String,
}

impl CapturedError {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let description = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "<opaque error payload>".to_string()
        };
        CapturedError {
            payload,
            description,
        }
    }

    /// Capture an explicit error value, keeping it retrievable by downcast.
    pub fn from_value<E: fmt::Debug + Any + Send>(error: E) -> Self {
        let description = format!("{error:?}");
        CapturedError {
            payload: Box::new(error),
            description,
        }
    }

    /// The raw captured value.
    pub fn payload(&self) -> &(dyn Any + Send) {
        self.payload.as_ref()
    }

    /// Consume the capture, yielding the raw value.
    pub fn into_payload(self) -> Box<dyn Any + Send> {
        self.payload
    }

    /// Borrow the payload as a concrete type, if it is one.
    pub fn downcast_ref<E: 'static>(&self) -> Option<&E> {
        self.payload.downcast_ref::<E>()
    }
}

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl fmt::Debug for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CapturedError")
            .field(&self.description)
            .finish()
    }
}

/// Result of one wrapped execution.
///
/// Exactly one of result/error exists, carried by the variant itself;
/// timing is present on both.
#[derive(Debug)]
pub enum ExecutionOutcome<T> {
    Success {
        result: T,
        execution_time: ExecutionTime,
    },
    Failure {
        error: CapturedError,
        execution_time: ExecutionTime,
    },
}

impl<T> ExecutionOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ExecutionOutcome::Failure { .. })
    }

    /// The success value, if any.
    pub fn result(&self) -> Option<&T> {
        match self {
            ExecutionOutcome::Success { result, .. } => Some(result),
            ExecutionOutcome::Failure { .. } => None,
        }
    }

    /// The captured failure, if any.
    pub fn error(&self) -> Option<&CapturedError> {
        match self {
            ExecutionOutcome::Success { .. } => None,
            ExecutionOutcome::Failure { error, .. } => Some(error),
        }
    }

    pub fn execution_time(&self) -> ExecutionTime {
        match self {
            ExecutionOutcome::Success { execution_time, .. }
            | ExecutionOutcome::Failure { execution_time, .. } => *execution_time,
        }
    }

    /// Collapse into a plain `Result`, dropping the timing.
    pub fn into_result(self) -> Result<T, CapturedError> {
        match self {
            ExecutionOutcome::Success { result, .. } => Ok(result),
            ExecutionOutcome::Failure { error, .. } => Err(error),
        }
    }
}

impl<T, E> ExecutionOutcome<Result<T, E>>
where
    E: fmt::Debug + Any + Send,
{
    /// Fold a wrapped call's own `Err` into the `Failure` variant, so
    /// `Result`-returning work does not need to panic to be captured.
    pub fn transpose(self) -> ExecutionOutcome<T> {
        match self {
            ExecutionOutcome::Success {
                result: Ok(result),
                execution_time,
            } => ExecutionOutcome::Success {
                result,
                execution_time,
            },
            ExecutionOutcome::Success {
                result: Err(error),
                execution_time,
            } => ExecutionOutcome::Failure {
                error: CapturedError::from_value(error),
                execution_time,
            },
            ExecutionOutcome::Failure {
                error,
                execution_time,
            } => ExecutionOutcome::Failure {
                error,
                execution_time,
            },
        }
    }
}

// Boundary shape: { result, error, executionTime }, with the absent side null.
impl<T: Serialize> Serialize for ExecutionOutcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut record = serializer.serialize_struct("ExecutionOutcome", 3)?;
        match self {
            ExecutionOutcome::Success {
                result,
                execution_time,
            } => {
                record.serialize_field("result", result)?;
                record.serialize_field("error", &None::<String>)?;
                record.serialize_field("executionTime", execution_time)?;
            }
            ExecutionOutcome::Failure {
                error,
                execution_time,
            } => {
                record.serialize_field("result", &None::<T>)?;
                record.serialize_field("error", &error.description)?;
                record.serialize_field("executionTime", execution_time)?;
            }
        }
        record.end()
    }
}
