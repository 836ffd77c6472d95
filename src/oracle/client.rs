//! HTTP client for the verification oracle.
//!
//! Talks to an OpenAI-compatible vision endpoint: the evidence text and up
//! to three images go out as one chat completion request, and the model is
//! instructed to reply with a single JSON object. Every failure mode maps
//! to the fallback verdict.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::domain::{EvidenceBundle, VerificationResult, MAX_AWARD_POINTS};
use crate::infra::{EcoError, Result};

use super::{fallback_result, strip_code_fences, VerificationOracle, MAX_ORACLE_IMAGES};

/// Oracle endpoint configuration.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Chat completions URL, e.g. `https://api.example.com/v1/chat/completions`.
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    /// Client-level timeout; a slow oracle degrades to the fallback verdict
    /// rather than blocking the submission.
    pub timeout: Duration,
}

impl OracleConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Reqwest-based oracle client.
pub struct HttpVerificationOracle {
    client: Client,
    config: OracleConfig,
}

/// The structured verdict the model is asked to emit.
///
/// `suggested_points` is deserialized as unsigned, so a negative value from
/// a confused model fails the decode and falls back.
#[derive(Debug, Deserialize)]
struct RawVerdict {
    verified: bool,
    confidence: f64,
    #[serde(default)]
    reasoning: String,
    #[serde(rename = "suggestedPoints", alias = "suggested_points")]
    suggested_points: u32,
    #[serde(rename = "flaggedIssues", alias = "flagged_issues", default)]
    flagged_issues: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    content: String,
}

const SYSTEM_PROMPT: &str = "You verify student evidence of eco-actions. \
Respond with only a JSON object: {\"verified\": bool, \"confidence\": number 0-1, \
\"reasoning\": string, \"suggestedPoints\": non-negative integer, \
\"flaggedIssues\": [string]}.";

impl HttpVerificationOracle {
    pub fn new(config: OracleConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EcoError::Configuration(format!("oracle http client: {e}")))?;
        Ok(Self { client, config })
    }

    fn build_user_content(&self, evidence: &EvidenceBundle) -> Vec<serde_json::Value> {
        let mut text = format!(
            "Action type: {}\nDescription: {}",
            evidence.action_type, evidence.description
        );
        if let Some(location) = &evidence.location {
            text.push_str(&format!("\nLocation: {location}"));
        }
        if let Some(date) = &evidence.action_date {
            text.push_str(&format!("\nDate: {date}"));
        }
        if let Some(impact) = &evidence.estimated_impact {
            text.push_str(&format!("\nEstimated impact: {impact}"));
        }

        let mut content = vec![json!({ "type": "text", "text": text })];
        for image in evidence.images.iter().take(MAX_ORACLE_IMAGES) {
            content.push(json!({
                "type": "image_url",
                "image_url": {
                    "url": format!("data:{};base64,{}", image.media_type, image.to_base64())
                }
            }));
        }
        content
    }

    async fn call(&self, evidence: &EvidenceBundle) -> Result<VerificationResult> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": self.build_user_content(evidence) }
            ],
            "temperature": 0.1,
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EcoError::Internal(format!("oracle request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(EcoError::Internal(format!(
                "oracle returned status {}",
                response.status()
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| EcoError::Internal(format!("oracle response decode failed: {e}")))?;

        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| EcoError::Internal("oracle response had no choices".to_string()))?;

        parse_verdict(content)
    }
}

/// Strip fencing and decode the model's verdict.
pub(crate) fn parse_verdict(content: &str) -> Result<VerificationResult> {
    let payload = strip_code_fences(content);
    let raw: RawVerdict = serde_json::from_str(payload)
        .map_err(|e| EcoError::Internal(format!("oracle verdict not parseable: {e}")))?;

    if !(0.0..=1.0).contains(&raw.confidence) {
        return Err(EcoError::Internal(format!(
            "oracle confidence out of range: {}",
            raw.confidence
        )));
    }

    if raw.suggested_points > MAX_AWARD_POINTS {
        return Err(EcoError::Internal(format!(
            "oracle suggested points out of range: {}",
            raw.suggested_points
        )));
    }

    Ok(VerificationResult {
        verified: raw.verified,
        confidence: raw.confidence,
        reasoning: raw.reasoning,
        suggested_points: raw.suggested_points,
        flagged_issues: raw.flagged_issues,
    })
}

#[async_trait::async_trait]
impl VerificationOracle for HttpVerificationOracle {
    async fn verify(&self, evidence: &EvidenceBundle) -> VerificationResult {
        match self.call(evidence).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "verification oracle degraded to fallback");
                fallback_result(e.to_string())
            }
        }
    }
}
