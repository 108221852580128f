//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod availability;
pub mod execute_analysis;
pub mod factory;
pub mod selection_cache;
