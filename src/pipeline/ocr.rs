//! OCR: turn photographed or scanned word lists into plain text.
//!
//! This is the only stage with network I/O. Its output is plain text that
//! goes through the same parser as pasted input; the parser never sees an
//! OCR error, because a failed OCR run returns `Err` before parsing starts.
//!
//! ## Engines
//!
//! * [`OcrEngine::OcrSpace`] — multipart upload to the OCR.space API. Needs
//!   an API key; without one we fail fast with
//!   [`FlashDeckError::OcrCredentialsMissing`] and make no request.
//! * [`OcrEngine::Vision`] — a vision LLM via `edgequake-llm`, prompted to
//!   transcribe one `term - definition` per line.
//!
//! ## Retry Strategy
//!
//! Every failed attempt is retried up to `max_retries` times. The delay
//! before retry *n* is `retry_backoff_ms × 1.5^(n−1)`, so the defaults
//! (1000 ms, 2 retries) wait 1 s then 1.5 s. After the last attempt the
//! error surfaces as [`FlashDeckError::OcrFailed`].

use crate::config::{DeckConfig, OcrEngine};
use crate::error::FlashDeckError;
use crate::pipeline::encode::{prepare_for_ocr, to_image_data};
use crate::prompts::{strip_reply_fences, DEFAULT_OCR_PROMPT};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use futures::stream::{self, StreamExt};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// OCR.space image endpoint.
pub const OCR_SPACE_ENDPOINT: &str = "https://api.ocr.space/parse/image";

/// Growth factor between consecutive retry delays.
const BACKOFF_FACTOR: f64 = 1.5;

/// Text recovered from one or more images.
#[derive(Debug, Clone)]
pub struct OcrOutcome {
    /// Text of every image, in input order, joined by newlines.
    pub text: String,
    /// Total requests made, including retries.
    pub attempts: u32,
}

/// A ready-to-call OCR backend. Credentials are checked when it is built.
enum Backend {
    OcrSpace {
        client: reqwest::Client,
        api_key: String,
        language: String,
    },
    Vision {
        provider: Arc<dyn LLMProvider>,
        prompt: String,
        timeout: Duration,
    },
}

impl Backend {
    async fn from_config(config: &DeckConfig) -> Result<Self, FlashDeckError> {
        match config.ocr_engine {
            OcrEngine::OcrSpace => {
                let api_key = config.resolved_ocr_api_key().ok_or_else(|| {
                    FlashDeckError::OcrCredentialsMissing {
                        provider: "ocr.space".into(),
                        hint: "Set OCR_SPACE_API_KEY or pass --ocr-api-key.".into(),
                    }
                })?;
                let client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(config.ocr_timeout_secs))
                    .build()
                    .map_err(|e| FlashDeckError::Internal(format!("HTTP client: {e}")))?;
                Ok(Backend::OcrSpace {
                    client,
                    api_key,
                    language: config.ocr_language.clone(),
                })
            }
            OcrEngine::Vision => Ok(Backend::Vision {
                provider: resolve_provider(config).await?,
                prompt: config
                    .ocr_prompt
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OCR_PROMPT.to_string()),
                timeout: Duration::from_secs(config.ocr_timeout_secs),
            }),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Backend::OcrSpace { .. } => "ocr.space",
            Backend::Vision { .. } => "vision",
        }
    }

    async fn recognise(&self, png: &[u8]) -> Result<String, String> {
        match self {
            Backend::OcrSpace {
                client,
                api_key,
                language,
            } => ocr_space_request(client, png, api_key, language).await,
            Backend::Vision {
                provider,
                prompt,
                timeout,
            } => match tokio::time::timeout(*timeout, vision_request(provider, png, prompt)).await
            {
                Ok(result) => result,
                Err(_) => Err(format!("timed out after {}s", timeout.as_secs())),
            },
        }
    }
}

/// OCR every image in `paths` and join the texts in input order.
///
/// Images are processed concurrently (bounded by `config.concurrency`), but
/// the output order always matches the input order. The first image that
/// fails after all retries fails the whole call.
pub async fn ocr_images(paths: &[PathBuf], config: &DeckConfig) -> Result<OcrOutcome, FlashDeckError> {
    let start = Instant::now();
    let backend = Backend::from_config(config).await?;
    info!("OCR of {} image(s) via {}", paths.len(), backend.name());

    if let Some(ref cb) = config.progress_callback {
        cb.on_ocr_start(paths.len());
    }

    let backend = &backend;
    let results: Vec<Result<(String, u32), FlashDeckError>> =
        stream::iter(paths.iter().enumerate().map(|(i, path)| async move {
            let image_num = i + 1;
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|_| FlashDeckError::FileNotFound { path: path.clone() })?;
            let max_side = config.max_image_side;
            let png = tokio::task::spawn_blocking(move || prepare_for_ocr(&bytes, max_side))
                .await
                .map_err(|e| FlashDeckError::Internal(format!("Image task panicked: {e}")))?
                .map_err(|e| FlashDeckError::ImageDecodeFailed {
                    detail: format!("{}: {e}", path.display()),
                })?;
            with_retries(image_num, config, || backend.recognise(&png)).await
        }))
        .buffered(config.concurrency)
        .collect()
        .await;

    let mut texts = Vec::with_capacity(results.len());
    let mut attempts = 0;
    for result in results {
        let (text, n) = result?;
        attempts += n;
        texts.push(text);
    }

    info!(
        "OCR complete: {} image(s), {} request(s), {}ms",
        texts.len(),
        attempts,
        start.elapsed().as_millis()
    );
    Ok(OcrOutcome {
        text: texts.join("\n"),
        attempts,
    })
}

/// Delay before retry `attempt` (1-based).
pub fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let factor = BACKOFF_FACTOR.powi(attempt.saturating_sub(1) as i32);
    Duration::from_millis((base_ms as f64 * factor).round() as u64)
}

/// Run `call` until it succeeds or `max_retries` retries are used up.
///
/// Returns the successful text and the number of attempts made.
async fn with_retries<F, Fut>(
    image_num: usize,
    config: &DeckConfig,
    mut call: F,
) -> Result<(String, u32), FlashDeckError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, String>>,
{
    let mut last_err: Option<String> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let delay = backoff_delay(config.retry_backoff_ms, attempt);
            warn!(
                "Image {}: retry {}/{} after {}ms",
                image_num,
                attempt,
                config.max_retries,
                delay.as_millis()
            );
            if let Some(ref cb) = config.progress_callback {
                cb.on_ocr_retry(image_num, attempt, config.max_retries);
            }
            sleep(delay).await;
        }

        match call().await {
            Ok(text) => {
                debug!("Image {}: {} chars of text", image_num, text.len());
                return Ok((text, attempt + 1));
            }
            Err(e) => {
                warn!("Image {}: attempt {} failed — {}", image_num, attempt + 1, e);
                last_err = Some(e);
            }
        }
    }

    Err(FlashDeckError::OcrFailed {
        attempts: config.max_retries + 1,
        detail: last_err.unwrap_or_else(|| "Unknown OCR failure".to_string()),
    })
}

// ── OCR.space ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrSpaceResponse {
    #[serde(default)]
    parsed_results: Option<Vec<ParsedResult>>,
    #[serde(default)]
    is_errored_on_processing: bool,
    #[serde(default)]
    error_message: Option<serde_json::Value>,
    #[serde(default)]
    error_message_details: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    parsed_text: Option<String>,
}

impl OcrSpaceResponse {
    fn into_text(self) -> Result<String, String> {
        if self.is_errored_on_processing {
            let msg = self
                .error_message
                .as_ref()
                .and_then(message_text)
                .or_else(|| self.error_message_details.as_ref().and_then(message_text))
                .unwrap_or_else(|| "Unknown OCR error".to_string());
            return Err(msg);
        }
        let text = self
            .parsed_results
            .unwrap_or_default()
            .iter()
            .map(|r| r.parsed_text.as_deref().unwrap_or("").trim())
            .collect::<Vec<_>>()
            .join("\n");
        Ok(text.trim().to_string())
    }
}

/// OCR.space sends error messages as a string or an array of strings.
fn message_text(value: &serde_json::Value) -> Option<String> {
    let text = match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join("; "),
        _ => return None,
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

async fn ocr_space_request(
    client: &reqwest::Client,
    png: &[u8],
    api_key: &str,
    language: &str,
) -> Result<String, String> {
    let part = Part::bytes(png.to_vec())
        .file_name("upload.png")
        .mime_str("image/png")
        .map_err(|e| e.to_string())?;
    let form = Form::new()
        .text("language", language.to_string())
        .text("OCREngine", "2")
        .text("isTable", "true")
        .text("scale", "true")
        .text("isCreateSearchablePdf", "false")
        .part("file", part);

    let response = client
        .post(OCR_SPACE_ENDPOINT)
        .header("apikey", api_key)
        .multipart(form)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                "request timed out".to_string()
            } else {
                e.to_string()
            }
        })?;

    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }

    let body: OcrSpaceResponse = response
        .json()
        .await
        .map_err(|e| format!("invalid OCR response: {e}"))?;
    body.into_text()
}

// ── Vision model ─────────────────────────────────────────────────────────

async fn vision_request(
    provider: &Arc<dyn LLMProvider>,
    png: &[u8],
    prompt: &str,
) -> Result<String, String> {
    let messages = vec![
        ChatMessage::system(prompt),
        ChatMessage::user_with_images("", vec![to_image_data(png)]),
    ];
    let options = CompletionOptions {
        temperature: Some(0.0),
        max_tokens: Some(4096),
        ..Default::default()
    };
    let response = provider
        .chat(&messages, Some(&options))
        .await
        .map_err(|e| e.to_string())?;
    debug!(
        "Vision OCR: {} input tokens, {} output tokens",
        response.prompt_tokens, response.completion_tokens
    );
    Ok(strip_reply_fences(&response.content))
}

fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, FlashDeckError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        FlashDeckError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the vision provider, from most-specific to least-specific:
/// explicit provider, named provider + model, the
/// `EDGEQUAKE_LLM_PROVIDER`/`EDGEQUAKE_MODEL` pair, then auto-detection.
async fn resolve_provider(config: &DeckConfig) -> Result<Arc<dyn LLMProvider>, FlashDeckError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or("gpt-4.1-nano");
        return create_vision_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_vision_provider(&prov, &model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| FlashDeckError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No vision provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or use --ocr-engine ocr-space.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
