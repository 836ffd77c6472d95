//! EcoProof Library
//!
//! Submission verification and points service for student eco-actions:
//! evidence is verified by an external AI oracle, a pure decision rule maps
//! the verdict to approve/flag/pend, and two independently-owned stores
//! (submission documents, point totals) are kept consistent with an
//! append-first, idempotent-reconcile protocol.
//!
//! ## Modules
//!
//! - [`domain`] - Core domain types (submissions, verdicts, awards)
//! - [`decision`] - Pure verdict-to-status decision rule
//! - [`oracle`] - Verification oracle client with fallback semantics
//! - [`infra`] - Store traits and implementations (PostgreSQL, in-memory)
//! - [`workflow`] - Submission workflow orchestrator
//! - [`api`] - REST API routes
//! - [`server`] - HTTP server bootstrap

pub mod api;
pub mod decision;
pub mod domain;
pub mod infra;
pub mod migrations;
pub mod oracle;
pub mod server;
pub mod workflow;

// Re-export commonly used types
pub use domain::{
    ActionType, ClassroomId, EvidenceBundle, EvidenceImage, Notification, NotificationKind,
    PointsAward, ReviewAction, StudentId, Submission, SubmissionId, SubmissionStatus,
    VerificationResult, AUTOMATED_REVIEWER, MAX_AWARD_POINTS,
};

pub use decision::{decide, Decision, AUTO_APPROVE_THRESHOLD, FLAG_THRESHOLD};
pub use infra::{EcoError, NotificationSink, PointsLedger, Result, SubmissionRepository};
pub use oracle::VerificationOracle;
pub use workflow::{
    ReviewOutcome, ReviewRequest, SubmissionWorkflow, SubmitOutcome, SubmitRequest,
};
