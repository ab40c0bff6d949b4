//! Configuration for turning a source into a printable deck.
//!
//! Everything outside the text parser is tunable through [`DeckConfig`],
//! built via [`DeckConfigBuilder`]: print alignment (duplex mode, back-side
//! offsets), card footers, spreadsheet column mapping, and the OCR
//! collaborator (engine, credentials, retry policy). The parser itself takes
//! no configuration.

use crate::error::FlashDeckError;
use crate::pipeline::spreadsheet::ColumnSelector;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Largest back-side offset accepted, in millimetres.
pub const MAX_BACK_OFFSET_MM: f32 = 25.0;

/// Configuration for deck building and rendering.
///
/// Built via [`DeckConfig::builder()`] or using [`DeckConfig::default()`].
///
/// # Example
/// ```rust
/// use flashdeck::{DeckConfig, DuplexMode};
///
/// let config = DeckConfig::builder()
///     .duplex(DuplexMode::ShortEdge)
///     .back_offset_mm(0.5, -0.25)
///     .subject("Biology")
///     .lesson("Unit 3")
///     .build()
///     .unwrap();
/// assert_eq!(config.footer_text().as_deref(), Some("Biology • Unit 3"));
/// ```
#[derive(Clone)]
pub struct DeckConfig {
    /// How the back side is arranged for double-sided printing. Default: long-edge, mirrored.
    pub duplex: DuplexMode,

    /// Horizontal shift applied to every back page, in millimetres. Default: 0.
    ///
    /// Printers rarely register both sides perfectly; a fraction of a
    /// millimetre here lines definitions up behind their terms.
    pub back_offset_x_mm: f32,

    /// Vertical shift applied to every back page, in millimetres. Default: 0.
    pub back_offset_y_mm: f32,

    /// Draw a tiny corner marker on back pages for alignment checks. Default: false.
    pub show_marker: bool,

    /// Draw the footer line on each card. Default: true.
    pub include_footer: bool,

    /// Value substituted for `{subject}` in the footer template.
    pub subject: String,

    /// Value substituted for `{lesson}` in the footer template.
    pub lesson: String,

    /// Footer template. Default: `"{subject} • {lesson}"`.
    pub footer_template: String,

    /// Spreadsheet column that holds the term. `None` = first column.
    pub term_column: Option<ColumnSelector>,

    /// Spreadsheet column that holds the definition. `None` = second column.
    pub definition_column: Option<ColumnSelector>,

    /// OCR backend used for image inputs. Default: [`OcrEngine::OcrSpace`].
    pub ocr_engine: OcrEngine,

    /// OCR.space API key. Falls back to `OCR_SPACE_API_KEY` when `None`.
    pub ocr_api_key: Option<String>,

    /// OCR language code passed to OCR.space. Default: `"eng"`.
    pub ocr_language: String,

    /// Per-request OCR timeout in seconds. Default: 30.
    pub ocr_timeout_secs: u64,

    /// Retries after the first failed OCR attempt. Default: 2.
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds. Default: 1000.
    ///
    /// Grows by a factor of 1.5 per further retry: 1 s → 1.5 s → 2.25 s.
    pub retry_backoff_ms: u64,

    /// Longest image side sent to OCR, in pixels. Default: 2000.
    ///
    /// Phone photos are often 4000 px or more; OCR services cap upload size
    /// and gain nothing from the extra pixels on printed word lists.
    pub max_image_side: u32,

    /// Number of images OCR'd concurrently. Default: 4.
    pub concurrency: usize,

    /// Vision model identifier for [`OcrEngine::Vision`]. If None, uses provider default.
    pub model: Option<String>,

    /// Vision provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed vision provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Custom transcription prompt for the vision engine.
    pub ocr_prompt: Option<String>,

    /// Optional progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            duplex: DuplexMode::default(),
            back_offset_x_mm: 0.0,
            back_offset_y_mm: 0.0,
            show_marker: false,
            include_footer: true,
            subject: String::new(),
            lesson: String::new(),
            footer_template: DEFAULT_FOOTER_TEMPLATE.to_string(),
            term_column: None,
            definition_column: None,
            ocr_engine: OcrEngine::default(),
            ocr_api_key: None,
            ocr_language: "eng".to_string(),
            ocr_timeout_secs: 30,
            max_retries: 2,
            retry_backoff_ms: 1000,
            max_image_side: 2000,
            concurrency: 4,
            model: None,
            provider_name: None,
            provider: None,
            ocr_prompt: None,
            progress_callback: None,
        }
    }
}

/// Default footer layout.
pub const DEFAULT_FOOTER_TEMPLATE: &str = "{subject} • {lesson}";

impl fmt::Debug for DeckConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeckConfig")
            .field("duplex", &self.duplex)
            .field("back_offset_x_mm", &self.back_offset_x_mm)
            .field("back_offset_y_mm", &self.back_offset_y_mm)
            .field("show_marker", &self.show_marker)
            .field("include_footer", &self.include_footer)
            .field("subject", &self.subject)
            .field("lesson", &self.lesson)
            .field("footer_template", &self.footer_template)
            .field("term_column", &self.term_column)
            .field("definition_column", &self.definition_column)
            .field("ocr_engine", &self.ocr_engine)
            .field("ocr_api_key", &self.ocr_api_key.as_ref().map(|_| "<redacted>"))
            .field("ocr_language", &self.ocr_language)
            .field("max_retries", &self.max_retries)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .finish()
    }
}

impl DeckConfig {
    /// Create a new builder for `DeckConfig`.
    pub fn builder() -> DeckConfigBuilder {
        DeckConfigBuilder {
            config: Self::default(),
        }
    }

    /// The footer string to print on each card, if any.
    ///
    /// `None` when footers are disabled, when both subject and lesson are
    /// empty, or when the filled-in template is blank.
    pub fn footer_text(&self) -> Option<String> {
        if !self.include_footer {
            return None;
        }
        if self.subject.trim().is_empty() && self.lesson.trim().is_empty() {
            return None;
        }
        let text = self
            .footer_template
            .replace("{subject}", self.subject.trim())
            .replace("{lesson}", self.lesson.trim());
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }

    /// OCR.space key from config, else from `OCR_SPACE_API_KEY`.
    pub fn resolved_ocr_api_key(&self) -> Option<String> {
        self.ocr_api_key
            .clone()
            .or_else(|| std::env::var("OCR_SPACE_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Builder for [`DeckConfig`].
pub struct DeckConfigBuilder {
    config: DeckConfig,
}

impl fmt::Debug for DeckConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeckConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl DeckConfigBuilder {
    pub fn duplex(mut self, mode: DuplexMode) -> Self {
        self.config.duplex = mode;
        self
    }

    pub fn back_offset_mm(mut self, x: f32, y: f32) -> Self {
        self.config.back_offset_x_mm = x;
        self.config.back_offset_y_mm = y;
        self
    }

    pub fn show_marker(mut self, v: bool) -> Self {
        self.config.show_marker = v;
        self
    }

    pub fn include_footer(mut self, v: bool) -> Self {
        self.config.include_footer = v;
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.config.subject = subject.into();
        self
    }

    pub fn lesson(mut self, lesson: impl Into<String>) -> Self {
        self.config.lesson = lesson.into();
        self
    }

    pub fn footer_template(mut self, template: impl Into<String>) -> Self {
        self.config.footer_template = template.into();
        self
    }

    pub fn term_column(mut self, column: ColumnSelector) -> Self {
        self.config.term_column = Some(column);
        self
    }

    pub fn definition_column(mut self, column: ColumnSelector) -> Self {
        self.config.definition_column = Some(column);
        self
    }

    pub fn ocr_engine(mut self, engine: OcrEngine) -> Self {
        self.config.ocr_engine = engine;
        self
    }

    pub fn ocr_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.ocr_api_key = Some(key.into());
        self
    }

    pub fn ocr_language(mut self, language: impl Into<String>) -> Self {
        self.config.ocr_language = language.into();
        self
    }

    pub fn ocr_timeout_secs(mut self, secs: u64) -> Self {
        self.config.ocr_timeout_secs = secs.max(1);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn max_image_side(mut self, px: u32) -> Self {
        self.config.max_image_side = px;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn ocr_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.ocr_prompt = Some(prompt.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<DeckConfig, FlashDeckError> {
        let c = &self.config;
        for (axis, value) in [("X", c.back_offset_x_mm), ("Y", c.back_offset_y_mm)] {
            if !value.is_finite() || value.abs() > MAX_BACK_OFFSET_MM {
                return Err(FlashDeckError::InvalidConfig(format!(
                    "Back offset {axis} must be within ±{MAX_BACK_OFFSET_MM} mm, got {value}"
                )));
            }
        }
        if c.max_image_side < 100 {
            return Err(FlashDeckError::InvalidConfig(format!(
                "Max image side must be ≥ 100 px, got {}",
                c.max_image_side
            )));
        }
        if c.concurrency == 0 {
            return Err(FlashDeckError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.footer_template.trim().is_empty() {
            return Err(FlashDeckError::InvalidConfig(
                "Footer template must not be blank; use --no-footer to disable footers".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Back-side arrangement for double-sided printing.
///
/// | Mode | Back column | Back row |
/// |------|-------------|----------|
/// | `LongEdgeMirrored` | swapped | same |
/// | `LongEdge` | same | same |
/// | `ShortEdgeMirrored` | swapped | flipped |
/// | `ShortEdge` | same | flipped |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DuplexMode {
    /// Flip on the long edge; back columns mirrored. (default)
    #[default]
    LongEdgeMirrored,
    /// Flip on the long edge; back laid out like the front.
    LongEdge,
    /// Flip on the short edge; back columns mirrored and rows flipped.
    ShortEdgeMirrored,
    /// Flip on the short edge; back rows flipped.
    ShortEdge,
}

impl DuplexMode {
    pub fn mirrors_columns(self) -> bool {
        matches!(self, DuplexMode::LongEdgeMirrored | DuplexMode::ShortEdgeMirrored)
    }

    pub fn flips_rows(self) -> bool {
        matches!(self, DuplexMode::ShortEdge | DuplexMode::ShortEdgeMirrored)
    }
}

/// OCR backend for image inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OcrEngine {
    /// The OCR.space HTTP API (needs an API key). (default)
    #[default]
    OcrSpace,
    /// A vision-capable LLM reached through `edgequake-llm`.
    Vision,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = DeckConfig::default();
        assert_eq!(c.duplex, DuplexMode::LongEdgeMirrored);
        assert_eq!(c.max_retries, 2);
        assert_eq!(c.ocr_timeout_secs, 30);
        assert_eq!(c.max_image_side, 2000);
        assert_eq!(c.ocr_language, "eng");
        assert!(c.include_footer);
    }

    #[test]
    fn footer_needs_subject_or_lesson() {
        let c = DeckConfig::default();
        assert_eq!(c.footer_text(), None);

        let c = DeckConfig::builder().subject("Latin").build().unwrap();
        assert_eq!(c.footer_text().as_deref(), Some("Latin •"));

        let c = DeckConfig::builder()
            .subject("Latin")
            .include_footer(false)
            .build()
            .unwrap();
        assert_eq!(c.footer_text(), None);
    }

    #[test]
    fn custom_footer_template() {
        let c = DeckConfig::builder()
            .subject("Bio")
            .lesson("3")
            .footer_template("{lesson}/{subject}")
            .build()
            .unwrap();
        assert_eq!(c.footer_text().as_deref(), Some("3/Bio"));
    }

    #[test]
    fn offset_out_of_range_rejected() {
        let err = DeckConfig::builder()
            .back_offset_mm(30.0, 0.0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Back offset X"));
    }

    #[test]
    fn blank_template_rejected() {
        assert!(DeckConfig::builder().footer_template("  ").build().is_err());
    }

    #[test]
    fn tiny_image_side_rejected() {
        assert!(DeckConfig::builder().max_image_side(10).build().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = DeckConfig::builder().ocr_api_key("secret-key").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("secret-key"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn duplex_flags() {
        assert!(DuplexMode::LongEdgeMirrored.mirrors_columns());
        assert!(!DuplexMode::LongEdgeMirrored.flips_rows());
        assert!(DuplexMode::ShortEdge.flips_rows());
        assert!(!DuplexMode::ShortEdge.mirrors_columns());
        assert!(DuplexMode::ShortEdgeMirrored.mirrors_columns());
        assert!(DuplexMode::ShortEdgeMirrored.flips_rows());
        assert!(!DuplexMode::LongEdge.mirrors_columns());
    }
}
