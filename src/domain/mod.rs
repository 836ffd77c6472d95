//! Domain models for EcoProof
//!
//! Core types for evidence submissions, verification verdicts, and the
//! points award audit trail.

mod award;
mod evidence;
mod submission;
mod types;

pub use award::*;
pub use evidence::*;
pub use submission::*;
pub use types::*;
