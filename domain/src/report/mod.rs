//! Execution reports.
//!
//! Slot outcomes ([`entities::SlotResult`]) are folded by a
//! [`execution_report::ReportBuilder`] into the single
//! [`execution_report::ExecutionReport`] returned to callers.

pub mod entities;
pub mod execution_report;
