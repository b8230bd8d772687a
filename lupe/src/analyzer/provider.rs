use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::AnalyzerConfig;
use crate::error::{LupeError, Result};

use super::api::AnalyzerClient;

/// Outcome of one analysis pass over an image payload. Both lists keep the
/// provider's reported order; a failed pass contributes an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageAnalysis {
    pub ocr_words: Vec<String>,
    pub image_keywords: Vec<String>,
}

enum AnalyzerBackend {
    Api { client: AnalyzerClient },
    Unavailable { reason: String },
}

pub struct AnalyzerProvider {
    backend: AnalyzerBackend,
    timeout_secs: u64,
}

impl AnalyzerProvider {
    pub fn new(config: &AnalyzerConfig) -> Self {
        let backend = if !config.enabled {
            AnalyzerBackend::Unavailable {
                reason: "disabled by configuration".to_string(),
            }
        } else {
            match AnalyzerClient::new(config) {
                Ok(client) => {
                    info!("analyzer API backend initialized");
                    AnalyzerBackend::Api { client }
                }
                Err(e) => {
                    let reason = format!("analyzer backend unavailable: {e}");
                    warn!("{}", reason);
                    AnalyzerBackend::Unavailable { reason }
                }
            }
        };

        Self {
            backend,
            timeout_secs: config.timeout_secs,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, AnalyzerBackend::Unavailable { .. })
    }

    pub async fn recognize_text(&self, image_bytes: &[u8]) -> Result<Vec<String>> {
        match &self.backend {
            AnalyzerBackend::Api { client } => {
                self.bounded(client.recognize_text(image_bytes), "text recognition")
                    .await
            }
            AnalyzerBackend::Unavailable { reason } => {
                Err(LupeError::AnalyzerUnavailable(reason.clone()))
            }
        }
    }

    pub async fn classify(&self, image_bytes: &[u8]) -> Result<Vec<String>> {
        match &self.backend {
            AnalyzerBackend::Api { client } => {
                self.bounded(client.classify(image_bytes), "classification")
                    .await
            }
            AnalyzerBackend::Unavailable { reason } => {
                Err(LupeError::AnalyzerUnavailable(reason.clone()))
            }
        }
    }

    /// Run both passes over the same payload. Failures never cross-corrupt:
    /// whatever subset succeeded is returned, possibly neither.
    pub async fn analyze(&self, image_bytes: &[u8]) -> ImageAnalysis {
        let ocr_words = match self.recognize_text(image_bytes).await {
            Ok(words) => words,
            Err(e) => {
                warn!(error = %e, "text recognition failed, continuing without OCR text");
                Vec::new()
            }
        };
        let image_keywords = match self.classify(image_bytes).await {
            Ok(keywords) => keywords,
            Err(e) => {
                warn!(error = %e, "classification failed, continuing without keywords");
                Vec::new()
            }
        };
        ImageAnalysis {
            ocr_words,
            image_keywords,
        }
    }

    /// A hung remote call must not hang the whole file forever.
    async fn bounded<F>(&self, fut: F, what: &str) -> Result<Vec<String>>
    where
        F: Future<Output = Result<Vec<String>>>,
    {
        match tokio::time::timeout(Duration::from_secs(self.timeout_secs), fut).await {
            Ok(inner) => inner,
            Err(_) => Err(LupeError::Analyzer(format!(
                "{what} timed out after {} seconds",
                self.timeout_secs
            ))),
        }
    }
}
