//! Agent plan subdomain.
//!
//! - [`config`]: [`AgentConfig`](config::AgentConfig) and
//!   [`MultiAgentConfig`](config::MultiAgentConfig)
//! - [`slot`]: slot naming for base and fallback agents
//! - [`validation`]: structural plan checks

pub mod config;
pub mod slot;
pub mod validation;
