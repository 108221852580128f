//! Analysis inputs and outputs.
//!
//! - [`payload`]: the repository payload, its focus-area scoping and the
//!   per-invocation [`AnalysisInput`](payload::AnalysisInput)
//! - [`findings`]: insights, suggestions and educational notes
//! - [`context`]: repository facts and selections used to choose providers

pub mod context;
pub mod findings;
pub mod payload;
