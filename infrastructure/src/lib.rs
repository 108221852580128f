//! Infrastructure layer for agent-ensemble
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod agents;
pub mod config;
pub mod logging;
pub mod selection;

// Re-export commonly used types
pub use agents::{AgentConstructor, AgentRegistry, CommandAgent};
pub use config::{
    ConfigLoadError, ConfigLoader, ConfigValidationError, FileConfig, FileEngineConfig, FilePlan,
    FileProviderConfig, FileSelectionConfig, load_payload,
};
pub use logging::{ExecutionEvent, JsonlExecutionLogger};
pub use selection::PreferenceSelector;
