//! Property-based tests using proptest.
//!
//! These verify the decision rule's invariants across the whole confidence
//! range rather than just the boundary points.

use proptest::prelude::*;

use ecoproof::domain::{SubmissionStatus, VerificationResult};
use ecoproof::{decide, AUTO_APPROVE_THRESHOLD, FLAG_THRESHOLD};

fn verdict(verified: bool, confidence: f64, suggested_points: u32) -> VerificationResult {
    VerificationResult {
        verified,
        confidence,
        reasoning: String::new(),
        suggested_points,
        flagged_issues: vec![],
    }
}

proptest! {
    /// Verified evidence above the auto-approval bar always approves with
    /// the oracle's suggested points.
    #[test]
    fn high_confidence_always_auto_approves(
        confidence in 0.9000001f64..=1.0,
        points in 0u32..10_000,
    ) {
        let d = decide(&verdict(true, confidence, points));
        prop_assert_eq!(d.status, SubmissionStatus::Approved);
        prop_assert!(d.auto_approved);
        prop_assert_eq!(d.award_points, points);
    }

    /// Unverified evidence flags regardless of confidence.
    #[test]
    fn unverified_always_flags(confidence in 0.0f64..=1.0, points in 0u32..10_000) {
        let d = decide(&verdict(false, confidence, points));
        prop_assert_eq!(d.status, SubmissionStatus::AiFlagged);
        prop_assert_eq!(d.award_points, 0);
    }

    /// Verified evidence at or below the flag threshold flags.
    #[test]
    fn low_confidence_always_flags(confidence in 0.0f64..=0.70, points in 0u32..10_000) {
        let d = decide(&verdict(true, confidence, points));
        prop_assert_eq!(d.status, SubmissionStatus::AiFlagged);
        prop_assert_eq!(d.award_points, 0);
    }

    /// The middle band is pending review with no award.
    #[test]
    fn middle_band_is_pending(confidence in 0.7000001f64..=0.90, points in 0u32..10_000) {
        let d = decide(&verdict(true, confidence, points));
        prop_assert_eq!(d.status, SubmissionStatus::PendingReview);
        prop_assert!(!d.auto_approved);
        prop_assert_eq!(d.award_points, 0);
    }

    /// Points are awarded exactly when the decision is an auto-approval,
    /// for any verdict.
    #[test]
    fn points_iff_auto_approved(
        verified in any::<bool>(),
        confidence in 0.0f64..=1.0,
        points in 1u32..10_000,
    ) {
        let d = decide(&verdict(verified, confidence, points));
        prop_assert_eq!(d.award_points > 0, d.auto_approved);
        if d.auto_approved {
            prop_assert!(verified);
            prop_assert!(confidence > AUTO_APPROVE_THRESHOLD);
        }
        if d.status == SubmissionStatus::AiFlagged {
            prop_assert!(!verified || confidence <= FLAG_THRESHOLD);
        }
    }
}
