use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AnalyzerConfig;
use crate::error::{LupeError, Result};

const OCR_ENDPOINT: &str = "/v1/ocr/general";
const CLASSIFY_ENDPOINT: &str = "/v1/image/classify";

#[derive(Clone, Debug)]
pub struct AnalyzerClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    max_retries: u32,
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    image: &'a str,
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    words_result: Vec<WordItem>,
}

#[derive(Debug, Deserialize)]
struct WordItem {
    words: String,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    result: Vec<KeywordItem>,
}

#[derive(Debug, Deserialize)]
struct KeywordItem {
    keyword: String,
}

impl AnalyzerClient {
    pub fn new(config: &AnalyzerConfig) -> Result<Self> {
        let base_url = config.base_url.clone().ok_or_else(|| {
            LupeError::Analyzer("base URL required for the analyzer API".to_string())
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LupeError::Analyzer(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url,
            max_retries: config.max_retries,
        })
    }

    /// General text recognition: OCR fragments in provider order.
    pub async fn recognize_text(&self, image_bytes: &[u8]) -> Result<Vec<String>> {
        let body = self.make_request(OCR_ENDPOINT, image_bytes).await?;
        let response: OcrResponse = serde_json::from_str(&body)
            .map_err(|e| LupeError::Analyzer(format!("Failed to parse OCR response: {e}")))?;
        Ok(response
            .words_result
            .into_iter()
            .map(|item| item.words)
            .collect())
    }

    /// General classification: keyword labels in provider order.
    pub async fn classify(&self, image_bytes: &[u8]) -> Result<Vec<String>> {
        let body = self.make_request(CLASSIFY_ENDPOINT, image_bytes).await?;
        let response: ClassifyResponse = serde_json::from_str(&body)
            .map_err(|e| LupeError::Analyzer(format!("Failed to parse classify response: {e}")))?;
        Ok(response
            .result
            .into_iter()
            .map(|item| item.keyword)
            .collect())
    }

    async fn make_request(&self, endpoint: &str, image_bytes: &[u8]) -> Result<String> {
        let encoded = STANDARD.encode(image_bytes);
        let request = AnalyzeRequest { image: &encoded };
        let url = format!("{}{}", self.base_url, endpoint);

        let mut retries = 0;
        loop {
            let mut builder = self
                .client
                .post(&url)
                .header("Content-Type", "application/json");
            if let Some(key) = &self.api_key {
                builder = builder.header("Authorization", format!("Bearer {key}"));
            }
            let response = builder.json(&request).send().await;

            match response {
                Ok(resp) => {
                    if resp.status().is_success() {
                        return resp.text().await.map_err(|e| {
                            LupeError::Analyzer(format!("Failed to read response body: {e}"))
                        });
                    } else if resp.status().as_u16() == 429 || resp.status().is_server_error() {
                        retries += 1;
                        if retries >= self.max_retries {
                            return Err(LupeError::Analyzer(format!(
                                "API request failed after {} retries: {}",
                                self.max_retries,
                                resp.status()
                            )));
                        }
                        let delay = Duration::from_millis(100 * (2_u64.pow(retries)));
                        tokio::time::sleep(delay).await;
                    } else {
                        let status = resp.status();
                        let body = resp.text().await.unwrap_or_default();
                        return Err(LupeError::Analyzer(format!(
                            "API request failed: {status} - {body}"
                        )));
                    }
                }
                Err(e) => {
                    retries += 1;
                    if retries >= self.max_retries {
                        return Err(LupeError::Analyzer(format!(
                            "API request failed after {} retries: {e}",
                            self.max_retries
                        )));
                    }
                    let delay = Duration::from_millis(100 * (2_u64.pow(retries)));
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
