//! Structured execution logging.
//!
//! Provides [`JsonlExecutionLogger`], a JSONL file writer that implements
//! the [`ExecutionProgress`](ensemble_application::ExecutionProgress) port.

mod jsonl_logger;

pub use jsonl_logger::{ExecutionEvent, JsonlExecutionLogger};
