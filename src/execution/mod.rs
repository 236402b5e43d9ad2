//! Execution module - Handle sync and async execution modes

pub mod async_mode;
pub mod sync;

// Re-export for convenience
pub use async_mode::{execute_async, execute_async_fn};
pub use sync::execute_sync;
