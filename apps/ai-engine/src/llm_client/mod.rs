/// LLM Client — the single point of entry for all Gemini API calls in the engine.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All generation MUST go through this module.
///
/// Two model tiers are in play: Flash for cheap verbatim extraction, Pro for
/// evaluation and rewriting. The mapping is static (see `TaskKind::tier`).
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

pub mod schemas;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE_MS: u64 = 1000;

/// A named class of generation backend trading capability for latency/cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// Fast, lightweight tier for latency-sensitive verbatim work.
    Flash,
    /// Reasoning tier for evaluation and rewriting.
    Pro,
}

impl ModelTier {
    pub fn model_name(self) -> &'static str {
        match self {
            ModelTier::Flash => "gemini-2.5-flash",
            ModelTier::Pro => "gemini-2.5-pro",
        }
    }
}

/// The three generation tasks the engine issues. Routing and decoding
/// parameters are fixed per task, not computed per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Extraction,
    Evaluation,
    Rewrite,
}

impl TaskKind {
    /// Strict-copy extraction is cheap and latency-sensitive; evaluation and
    /// rewriting need stronger reasoning and tolerate more latency.
    pub fn tier(self) -> ModelTier {
        match self {
            TaskKind::Extraction => ModelTier::Flash,
            TaskKind::Evaluation | TaskKind::Rewrite => ModelTier::Pro,
        }
    }

    pub fn params(self) -> GenerationParams {
        match self {
            TaskKind::Extraction => GenerationParams {
                temperature: 0.1,
                top_p: None,
                top_k: None,
            },
            TaskKind::Evaluation => GenerationParams {
                temperature: 0.2,
                top_p: None,
                top_k: None,
            },
            TaskKind::Rewrite => GenerationParams {
                temperature: 0.7,
                top_p: Some(0.95),
                top_k: None,
            },
        }
    }
}

/// Decoding parameters for one generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
}

/// One schema-constrained generation call. Ephemeral — exists only for the
/// duration of a single call-with-retry.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub tier: ModelTier,
    pub prompt: String,
    pub params: GenerationParams,
    /// JSON schema the backend is asked to constrain its output to.
    pub response_schema: Value,
}

impl GenerationRequest {
    pub fn for_task(kind: TaskKind, prompt: String, response_schema: Value) -> Self {
        Self {
            tier: kind.tier(),
            prompt,
            params: kind.params(),
            response_schema,
        }
    }
}

/// Raw output of one generation call.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub text: String,
    /// Populated by the transport when the schema-constrained text already
    /// parses as JSON. The resolver prefers this over re-parsing the text.
    pub parsed: Option<Value>,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("model returned empty content")]
    EmptyContent,

    #[error("generation failed after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// Seam between the retry loop and the wire. Tests swap in scripted
/// transports; production uses `HttpTransport`.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn generate_once(&self, request: &GenerationRequest) -> Result<RawResponse, LlmError>;
}

/// Gemini `generateContent` REST transport.
pub struct HttpTransport {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl HttpTransport {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, GEMINI_API_BASE.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl GenerationTransport for HttpTransport {
    async fn generate_once(&self, request: &GenerationRequest) -> Result<RawResponse, LlmError> {
        let mut generation_config = json!({
            "temperature": request.params.temperature,
            "responseMimeType": "application/json",
            "responseJsonSchema": request.response_schema,
        });
        if let Some(top_p) = request.params.top_p {
            generation_config["topP"] = json!(top_p);
        }
        if let Some(top_k) = request.params.top_k {
            generation_config["topK"] = json!(top_k);
        }

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": request.prompt}]
            }],
            "generationConfig": generation_config,
        });

        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            request.tier.model_name(),
            self.api_key
        );

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let value: Value = response.json().await?;
        let text = value["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or(LlmError::EmptyContent)?
            .to_string();

        // The schema-constrained call normally returns clean JSON; keep the
        // pre-parsed value so the resolver can skip text recovery.
        let parsed = serde_json::from_str(&text).ok();

        Ok(RawResponse { text, parsed })
    }
}

/// Retry-wrapped generation client. Constructed once at startup and passed
/// through `AppState` — no ambient global handle.
#[derive(Clone)]
pub struct LlmClient {
    transport: Arc<dyn GenerationTransport>,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self::with_transport(Arc::new(HttpTransport::new(api_key)))
    }

    pub fn with_transport(transport: Arc<dyn GenerationTransport>) -> Self {
        Self { transport }
    }

    /// Issues one schema-constrained generation call with retry.
    ///
    /// Up to 3 attempts; exponential backoff of 1s then 2s before retries.
    /// Retries within one call are strictly sequential. After the final
    /// attempt fails the last error is returned to the caller, who decides
    /// whether to propagate it or substitute a fallback object.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<RawResponse, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(BACKOFF_BASE_MS * (1 << (attempt - 1)));
                warn!(
                    "generation attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            match self.transport.generate_once(request).await {
                Ok(response) => {
                    debug!(
                        "generation succeeded on attempt {} (tier: {})",
                        attempt + 1,
                        request.tier.model_name()
                    );
                    return Ok(response);
                }
                Err(e) => {
                    warn!(
                        "generation attempt {} on {} failed: {e}",
                        attempt + 1,
                        request.tier.model_name()
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(LlmError::Exhausted {
            attempts: MAX_ATTEMPTS,
        }))
    }
}
