use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};

// ============ Backend seam ============

/// An external zero-shot classification capability.
///
/// Returns a probability-like score for each candidate label. Implementations
/// hold immutable state and are safe to call from several threads at once.
pub trait ZeroShotBackend: Send + Sync {
    fn score(&self, text: &str, candidate_labels: &[String]) -> Result<Vec<(String, f32)>>;
}

/// How to build a backend, and the key it is cached under.
pub trait BackendOptions: Send + Sync {
    fn cache_key(&self) -> String;
    fn load(&self) -> Result<Arc<dyn ZeroShotBackend>>;
}

// ============ Hosted inference over HTTP ============

/// Options for a hosted zero-shot model reachable over HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HfOptions {
    pub model: String,
    /// URL template containing `{model}`.
    pub endpoint: String,
    /// Env var read for the bearer token at load time.
    pub token_env: String,
    pub timeout: Duration,
}

impl HfOptions {
    pub fn new(model: &str, config: &DashboardConfig) -> Self {
        Self {
            model: model.to_string(),
            endpoint: config.inference_endpoint.clone(),
            token_env: config.token_env.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    pub fn url(&self) -> String {
        self.endpoint.replace("{model}", &self.model)
    }
}

impl BackendOptions for HfOptions {
    fn cache_key(&self) -> String {
        format!("hf:{}", self.url())
    }

    fn load(&self) -> Result<Arc<dyn ZeroShotBackend>> {
        let token = std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty());
        if token.is_none() {
            log::warn!(
                "{} is not set, calling {} without authentication",
                self.token_env,
                self.url()
            );
        }
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Ok(Arc::new(HfInferenceBackend {
            agent,
            url: self.url(),
            token,
        }))
    }
}

/// Calls a hosted zero-shot classification endpoint.
pub struct HfInferenceBackend {
    agent: ureq::Agent,
    url: String,
    token: Option<String>,
}

impl ZeroShotBackend for HfInferenceBackend {
    fn score(&self, text: &str, candidate_labels: &[String]) -> Result<Vec<(String, f32)>> {
        let body = json!({
            "inputs": text,
            "parameters": {
                "candidate_labels": candidate_labels,
                "multi_label": false,
            }
        });

        let mut request = self.agent.post(self.url.as_str());
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        log::debug!("POST {} ({} labels)", self.url, candidate_labels.len());
        let mut response = request.send_json(&body)?;
        let status = response.status();
        let text = response.body_mut().read_to_string()?;
        if !status.is_success() {
            return Err(status_error(status.as_u16(), &text));
        }
        parse_response(&text)
    }
}

// ============ Response parsing ============

/// Error for a non-2xx reply, carrying the endpoint's `{"error": ...}` message
/// when the body has one.
pub(crate) fn status_error(status: u16, body: &str) -> DashboardError {
    let detail = match serde_json::from_str::<ZeroShotResponse>(body) {
        Ok(ZeroShotResponse::Error { error }) => error,
        _ => body.chars().take(200).collect(),
    };
    DashboardError::ExternalCapability(format!("HTTP {status}: {detail}"))
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

/// The two response shapes seen from zero-shot endpoints, plus their error body.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    Error { error: String },
    Columns { labels: Vec<String>, scores: Vec<f32> },
    Rows(Vec<LabelScore>),
}

pub(crate) fn parse_response(body: &str) -> Result<Vec<(String, f32)>> {
    let parsed: ZeroShotResponse = serde_json::from_str(body).map_err(|e| {
        DashboardError::ExternalCapability(format!("unexpected response: {e}"))
    })?;
    match parsed {
        ZeroShotResponse::Error { error } => Err(DashboardError::ExternalCapability(error)),
        ZeroShotResponse::Columns { labels, scores } => {
            if labels.len() != scores.len() {
                return Err(DashboardError::ExternalCapability(format!(
                    "{} labels but {} scores",
                    labels.len(),
                    scores.len()
                )));
            }
            Ok(labels.into_iter().zip(scores).collect())
        }
        ZeroShotResponse::Rows(rows) => Ok(rows.into_iter().map(|r| (r.label, r.score)).collect()),
    }
}
