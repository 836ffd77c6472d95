//! Decision engine: maps a verification verdict to an initial submission
//! status and point award. Pure and deterministic, no I/O.

use crate::domain::{SubmissionStatus, VerificationResult};

/// Confidence above which a verified submission is auto-approved.
/// Strict: exactly 0.90 is NOT auto-approved.
pub const AUTO_APPROVE_THRESHOLD: f64 = 0.90;

/// Confidence below which a submission is flagged even when verified.
/// Exactly 0.70 is still flagged; escape requires strictly more.
pub const FLAG_THRESHOLD: f64 = 0.70;

/// Outcome of the decision rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub status: SubmissionStatus,
    pub auto_approved: bool,
    /// Points to award immediately. Non-zero only on auto-approval.
    pub award_points: u32,
}

/// Apply the three-way decision rule, in precedence order:
///
/// 1. verified and confidence strictly above 0.90 → auto-approve with the
///    oracle's suggested points.
/// 2. not verified, or confidence at or below 0.70 → flag for review.
/// 3. otherwise (verified, confidence in (0.70, 0.90]) → pending review.
///
/// The middle band deliberately lands in plain `pending_review`; only the
/// status distinguishes it from flagged work.
pub fn decide(result: &VerificationResult) -> Decision {
    if result.verified && result.confidence > AUTO_APPROVE_THRESHOLD {
        return Decision {
            status: SubmissionStatus::Approved,
            auto_approved: true,
            award_points: result.suggested_points,
        };
    }

    // Escape from flagging requires confidence strictly above the
    // threshold; exactly 0.70 still flags.
    if !result.verified || result.confidence <= FLAG_THRESHOLD {
        return Decision {
            status: SubmissionStatus::AiFlagged,
            auto_approved: false,
            award_points: 0,
        };
    }

    Decision {
        status: SubmissionStatus::PendingReview,
        auto_approved: false,
        award_points: 0,
    }
}
