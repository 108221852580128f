//! Core domain concepts shared across all subdomains.
//!
//! - [`provider::Provider`]: vendors that can back an analysis agent
//! - [`role::AgentRole`]: the kind of analysis an agent performs
//! - [`error::ConfigurationError`]: construction-time plan errors

pub mod error;
pub mod provider;
pub mod role;
