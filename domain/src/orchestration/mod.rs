//! Execution orchestration domain
//!
//! Strategy selection and the lifecycle phases of a run.

pub mod entities;
pub mod strategy;
