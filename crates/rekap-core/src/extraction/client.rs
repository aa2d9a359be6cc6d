//! Client for OpenAI-compatible vision chat-completion services.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ExtractionError;
use crate::models::config::{ExtractionConfig, ServiceConfig};
use crate::models::document::Document;
use crate::models::record::{ExtractionResult, InvoiceRecord};

use super::fence::extract_json_payload;
use super::InvoiceExtractor;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Sends one document per request and turns the answer into a result.
pub struct ExtractionClient {
    http: Client,
    service: ServiceConfig,
    prompt: String,
    api_key: String,
}

impl ExtractionClient {
    /// Create a client; the API key is passed explicitly.
    pub fn new(
        service: ServiceConfig,
        extraction: &ExtractionConfig,
        api_key: impl Into<String>,
    ) -> crate::Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = service.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(ExtractionError::from)?;

        Ok(Self {
            http,
            prompt: extraction.prompt().to_string(),
            service,
            api_key: api_key.into(),
        })
    }

    /// Full URL of the chat-completion endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.service.base_url.trim_end_matches('/'))
    }

    fn build_request<'a>(&'a self, document: &Document) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.service.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: &self.prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: document.data_url(),
                        },
                    },
                ],
            }],
            temperature: self.service.temperature,
            max_tokens: self.service.max_tokens,
        }
    }

    /// Send the document and return the raw completion text.
    async fn request_completion(&self, document: &Document) -> Result<String, ExtractionError> {
        let request = self.build_request(document);

        debug!(
            file = %document.filename(),
            model = %self.service.model,
            bytes = document.bytes().len(),
            "Sending extraction request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ExtractionError::EmptyResponse)
    }
}

impl InvoiceExtractor for ExtractionClient {
    async fn extract(&self, document: &Document) -> ExtractionResult {
        let start = Instant::now();

        let result = match self.request_completion(document).await {
            Ok(content) => parse_completion(document.filename(), &content),
            Err(e) => {
                warn!(file = %document.filename(), error = %e, "Extraction request failed");
                ExtractionResult::failure(document.filename(), e.to_string())
            }
        };

        result.with_processing_time(start.elapsed().as_millis() as u64)
    }
}

/// Strip fences from a completion and parse it into a record.
pub fn parse_record(content: &str) -> Result<InvoiceRecord, ExtractionError> {
    let payload = extract_json_payload(content)?;
    InvoiceRecord::from_json(payload)
}

/// Turn completion text into a result, capturing parse failures as data.
pub fn parse_completion(filename: &str, content: &str) -> ExtractionResult {
    match parse_record(content) {
        Ok(record) => {
            debug!(
                file = %filename,
                items = record.items.len(),
                invoice = %record.invoice_number,
                "Parsed extraction result"
            );
            ExtractionResult::success(filename, record)
        }
        Err(e) => {
            warn!(file = %filename, error = %e, "Could not parse model output");
            ExtractionResult::failure(filename, e.to_string())
        }
    }
}
