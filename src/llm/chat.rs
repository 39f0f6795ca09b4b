use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::{AgentError, Result};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Blocking client for one OpenAI-compatible chat-completions endpoint.
/// Both the planner and the vision model speak this protocol, just against
/// different endpoints and with different payloads.
pub struct ChatClient {
    http: reqwest::blocking::Client,
    config: LlmConfig,
}

impl ChatClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentError::Llm(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    /// The model this client talks to.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send a plain text prompt and return the reply text.
    pub fn complete_text(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let messages = vec![ChatMessage {
            role: "user",
            content: MessageContent::Text(prompt.to_string()),
        }];
        self.complete(messages, max_tokens)
    }

    /// Send a prompt alongside a PNG image and return the reply text.
    pub fn complete_with_image(&self, prompt: &str, png: &[u8], max_tokens: u32) -> Result<String> {
        let data_url = format!("data:image/png;base64,{}", STANDARD.encode(png));
        let messages = vec![ChatMessage {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text {
                    text: prompt.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: data_url },
                },
            ]),
        }];
        self.complete(messages, max_tokens)
    }

    fn complete(&self, messages: Vec<ChatMessage>, max_tokens: u32) -> Result<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .map_err(|e| AgentError::Llm(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AgentError::Llm(format!(
                "{} returned {}: {}",
                url,
                status,
                truncate_body(&body)
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .map_err(|e| AgentError::Llm(format!("Failed to decode chat response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| AgentError::Llm("Chat response carried no content".to_string()))
    }
}

/// Keep error bodies log-sized.
fn truncate_body(body: &str) -> String {
    const LIMIT: usize = 300;
    if body.len() <= LIMIT {
        body.to_string()
    } else {
        let cut = body
            .char_indices()
            .take_while(|(i, _)| *i < LIMIT)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &body[..cut])
    }
}
