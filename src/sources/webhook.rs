use std::time::Duration;

use serde_json::Value;

use crate::config::AppConfig;
use crate::core::error::TriageError;
use crate::core::types::ThreatAnalysis;
use crate::pipeline::normalizer::normalize;

/// HTTP client for the n8n analysis workflow (or the relay sitting in front
/// of it). One request per call; failures surface to the caller unretried.
pub struct WorkflowClient {
    client: reqwest::Client,
    endpoint: String,
}

impl WorkflowClient {
    pub fn new(cfg: &AppConfig) -> Result<Self, TriageError> {
        let client = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(4))
            .build()
            .map_err(TriageError::from)?;
        Ok(Self {
            client,
            endpoint: cfg.webhook_url.clone(),
        })
    }

    pub async fn analyze(&self, log: &str) -> Result<ThreatAnalysis, TriageError> {
        tracing::info!("submitting log to {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "log": log }))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        tracing::debug!("workflow responded with status {}", status);

        if !status.is_success() {
            return Err(upstream_error(status.as_u16(), &body));
        }
        normalize(&body)
    }
}

/// Failure to reach the endpoint at all is reported differently from the
/// workflow itself failing; the user-facing guidance differs for each.
fn transport_error(err: reqwest::Error) -> TriageError {
    if err.is_connect() {
        TriageError::NetworkUnreachable(
            "connection refused; make sure the relay and the n8n workflow are running".to_string(),
        )
    } else {
        TriageError::from(err)
    }
}

/// Non-2xx bodies carry `message` and sometimes `hint`. A `hint` is surfaced
/// preferentially, and the n8n "not registered" message is rewritten into
/// actionable guidance about arming the test webhook.
fn upstream_error(status: u16, body: &str) -> TriageError {
    let parsed: Value = serde_json::from_str(body)
        .unwrap_or_else(|_| serde_json::json!({ "message": body }));
    let raw_message = parsed
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown workflow error")
        .to_string();
    let hint = parsed
        .get("hint")
        .and_then(Value::as_str)
        .map(str::to_string);

    let message = if raw_message.contains("not registered") {
        "Webhook not activated. Click \"Execute workflow\" in the n8n editor to arm the test webhook, then retry."
            .to_string()
    } else if let Some(hint) = &hint {
        hint.clone()
    } else {
        raw_message
    };

    TriageError::UpstreamHttp {
        status,
        message,
        hint,
    }
}
