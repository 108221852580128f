//! Agent adapters
//!
//! [`AgentRegistry`] is the concrete [`AgentFactory`](ensemble_application::AgentFactory);
//! [`CommandAgent`] runs an external process per analysis.

mod command;
mod registry;

pub use command::CommandAgent;
pub use registry::{AgentConstructor, AgentRegistry};
