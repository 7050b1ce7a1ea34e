use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::domain::errors::NarrativeError;
use crate::domain::models::NarrativeConfig;
use crate::domain::ports::{NarrativeGenerator, NarrativeRequest};

const ANTHROPIC_VERSION: &str = "2023-06-01";

const DECISION_SYSTEM_PROMPT: &str = "You are a friendly HR assistant helping explain shift swap \
decisions. Be clear, empathetic, and constructive. Use simple language that employees will understand.";

const FATIGUE_SYSTEM_PROMPT: &str =
    "You are a workplace safety analyst. Briefly assess the fatigue risk for this shift swap in 1-2 sentences.";

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Narrative generator backed by the Anthropic Messages API
pub struct MessagesNarrator {
    /// Reusable HTTP client with connection pooling
    http_client: ReqwestClient,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl MessagesNarrator {
    pub fn from_config(config: &NarrativeConfig) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    async fn send(&self, system: &str, temperature: f32, prompt: String) -> Result<String, NarrativeError> {
        let request = MessageRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http_client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(NarrativeError::Api { status, body });
        }

        let message: MessageResponse = response.json().await?;
        let text = message
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
            .trim()
            .to_string();

        if text.is_empty() {
            return Err(NarrativeError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl NarrativeGenerator for MessagesNarrator {
    #[instrument(skip_all)]
    async fn explain(&self, request: &NarrativeRequest) -> Result<String, NarrativeError> {
        let (system, temperature) = match request {
            NarrativeRequest::Decision { .. } => (DECISION_SYSTEM_PROMPT, 0.4),
            NarrativeRequest::FatigueRisk { .. } => (FATIGUE_SYSTEM_PROMPT, 0.3),
        };
        let text = self.send(system, temperature, render_prompt(request)).await?;
        debug!(chars = text.len(), "Narrative generated");
        Ok(text)
    }
}

/// Render the facts of a request as the user prompt.
pub fn render_prompt(request: &NarrativeRequest) -> String {
    let mut prompt = String::new();
    match request {
        NarrativeRequest::Decision {
            decision,
            confidence,
            checks,
            swap,
            swap_reason,
        } => {
            if let Some(swap) = swap {
                let _ = writeln!(
                    prompt,
                    "SWAP: {} gives up their {} and takes {}'s {}",
                    swap.requester_name, swap.requester_shift, swap.target_name, swap.target_shift
                );
            }
            if let Some(reason) = swap_reason {
                let _ = writeln!(prompt, "REASON: {reason}");
            }
            if swap.is_some() || swap_reason.is_some() {
                prompt.push('\n');
            }
            prompt.push_str("VALIDATION RESULTS:\n");
            for check in checks {
                if check.passed {
                    let _ = writeln!(prompt, " {}: PASS - {}", check.check_name, check.message);
                } else {
                    let _ = writeln!(
                        prompt,
                        " {}: FAIL ({}) - {}",
                        check.check_name,
                        check.severity.as_str(),
                        check.message
                    );
                }
            }
            let _ = write!(
                prompt,
                "\nDECISION: {}\nCONFIDENCE: {:.0}%\n\n\
                 Explain the decision in 2-3 sentences: state it, give the main reason, \
                 and if it is not approved mention what could help.",
                decision.as_str().to_uppercase(),
                confidence * 100.0
            );
        }
        NarrativeRequest::FatigueRisk {
            requester_name,
            requester_current,
            requester_projected,
            requester_risk_level,
            target_name,
            target_current,
            target_projected,
            target_risk_level,
            threshold,
        } => {
            let _ = write!(
                prompt,
                "Shift swap fatigue analysis.\n\n\
                 Requester ({requester_name}):\n\
                 - Current fatigue score: {requester_current}\n\
                 - Projected after swap: {requester_projected}\n\
                 - Risk level: {}\n\n\
                 Target employee ({target_name}):\n\
                 - Current fatigue score: {target_current}\n\
                 - Projected after swap: {target_projected}\n\
                 - Risk level: {}\n\n\
                 High risk threshold: {threshold}",
                requester_risk_level.as_deref().unwrap_or("unknown"),
                target_risk_level.as_deref().unwrap_or("unknown"),
            );
        }
    }
    prompt
}
