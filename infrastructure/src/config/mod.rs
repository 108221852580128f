//! Configuration file loading for agent-ensemble
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./ensemble.toml` or `./.ensemble.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/agent-ensemble/config.toml`
//! 4. Fallback: `~/.config/agent-ensemble/config.toml`
//! 5. Default values
//!
//! Plan and payload files are read separately, see [`plan`].

mod file_config;
mod loader;
pub mod plan;

pub use file_config::{
    ConfigValidationError, FileConfig, FileEngineConfig, FileProviderConfig, FileSelectionConfig,
};
pub use loader::{ConfigLoadError, ConfigLoader};
pub use plan::{FilePlan, FilePlanSection, load_payload};
