//! Infrastructure layer for EcoProof
//!
//! Contains trait definitions and implementations for:
//! - Submission repository (document store: Postgres JSONB, in-memory)
//! - Points ledger (relational store: Postgres, in-memory)
//! - Notification sink

mod error;
mod memory;
pub mod postgres;
mod traits;

pub use error::*;
pub use memory::{
    FailingLedger, MemoryNotificationSink, MemoryPointsLedger, MemorySubmissionStore,
};
pub use postgres::{PgNotificationSink, PgPointsLedger, PgSubmissionStore};
pub use traits::{NotificationSink, PointsLedger, SubmissionRepository};

#[cfg(test)]
pub use traits::{MockNotificationSink, MockPointsLedger, MockSubmissionRepository};
