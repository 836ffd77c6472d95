//! Verification oracle: one call per submission to an external AI
//! verification service.
//!
//! The oracle is the only unreliable collaborator in the workflow, so its
//! client never surfaces an error. Transport failures, malformed output,
//! and missing configuration all degrade to a conservative fallback verdict
//! that routes the submission into manual review.

mod client;

pub use client::{HttpVerificationOracle, OracleConfig};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{EvidenceBundle, VerificationResult};

/// Images beyond this count are silently dropped from the oracle request.
pub const MAX_ORACLE_IMAGES: usize = 3;

/// Points suggested by the fallback verdict, so a later human approval has
/// a sane default to start from.
pub const FALLBACK_SUGGESTED_POINTS: u32 = 100;

/// External verification service. Always produces a verdict.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VerificationOracle: Send + Sync {
    async fn verify(&self, evidence: &EvidenceBundle) -> VerificationResult;
}

/// The conservative verdict used whenever no real one can be obtained.
///
/// Unverified at zero confidence, which the decision engine maps to
/// `ai_flagged`: the cost of a degraded oracle is reviewer load, never a
/// stalled or silently approved submission.
pub fn fallback_result(cause: impl Into<String>) -> VerificationResult {
    VerificationResult {
        verified: false,
        confidence: 0.0,
        reasoning: "Automatic verification was unavailable; manual review required.".to_string(),
        suggested_points: FALLBACK_SUGGESTED_POINTS,
        flagged_issues: vec![cause.into()],
    }
}

/// Stand-in used when no oracle endpoint is configured.
pub struct UnconfiguredOracle;

#[async_trait]
impl VerificationOracle for UnconfiguredOracle {
    async fn verify(&self, _evidence: &EvidenceBundle) -> VerificationResult {
        fallback_result("verification oracle is not configured")
    }
}

/// Strip markdown code fences the model tends to wrap JSON in.
///
/// Handles ```json ... ``` and bare ``` ... ``` wrappers; anything else is
/// returned trimmed and left to the JSON parser to accept or reject.
pub(crate) fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
