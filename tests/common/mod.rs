//! Common test utilities and fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;

use ecoproof::infra::{MemoryNotificationSink, MemoryPointsLedger, MemorySubmissionStore};
use ecoproof::server::AppState;
use ecoproof::{EvidenceBundle, SubmissionWorkflow, VerificationOracle, VerificationResult};

/// A 1x1 JPEG-ish payload as a data URI. The oracle never sees it in these
/// tests; only the decode path matters.
pub fn test_image_uri() -> String {
    "data:image/jpeg;base64,/9j/4AAQSkZJRg==".to_string()
}

/// Oracle double returning a fixed verdict.
pub struct ScriptedOracle(pub VerificationResult);

#[async_trait]
impl VerificationOracle for ScriptedOracle {
    async fn verify(&self, _evidence: &EvidenceBundle) -> VerificationResult {
        self.0.clone()
    }
}

pub fn verdict(verified: bool, confidence: f64, suggested_points: u32) -> VerificationResult {
    VerificationResult {
        verified,
        confidence,
        reasoning: "scripted".to_string(),
        suggested_points,
        flagged_issues: vec![],
    }
}

/// Everything an end-to-end test needs: the workflow plus handles on the
/// in-memory stores for assertions.
pub struct TestHarness {
    pub workflow: Arc<SubmissionWorkflow>,
    pub repository: Arc<MemorySubmissionStore>,
    pub ledger: Arc<MemoryPointsLedger>,
    pub notifications: Arc<MemoryNotificationSink>,
}

impl TestHarness {
    pub fn new(oracle_verdict: VerificationResult) -> Self {
        let repository = Arc::new(MemorySubmissionStore::new());
        let ledger = Arc::new(MemoryPointsLedger::new());
        let notifications = Arc::new(MemoryNotificationSink::new());
        let workflow = Arc::new(SubmissionWorkflow::new(
            Arc::new(ScriptedOracle(oracle_verdict)),
            repository.clone(),
            ledger.clone(),
            notifications.clone(),
        ));
        Self {
            workflow,
            repository,
            ledger,
            notifications,
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            workflow: self.workflow.clone(),
            repository: self.repository.clone(),
        }
    }
}
