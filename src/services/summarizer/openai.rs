//! OpenAI chat-completions summarizer
//!
//! Sends one completion request per article. Any transport failure, non-2xx
//! status or empty completion is reported as `ProviderError`.
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use super::{Summarizer, SummaryError, SummaryOptions};

const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiSummarizer {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiSummarizer {
    pub fn new(api_key: String, api_url: String, model: String, max_tokens: u32) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            model,
            max_tokens,
        }
    }

    fn build_request(&self, content: &str, options: &SummaryOptions) -> ChatRequest {
        let system_prompt = format!(
            "You are a professional content summarizer. Create a {} summary that captures the key points and main ideas.",
            options.style
        );

        let user_prompt = match &options.title {
            Some(title) => format!(
                "Summarize the following article titled \"{}\" in {} words or less:\n\n{}",
                title, options.max_length, content
            ),
            None => format!(
                "Summarize the following content in {} words or less:\n\n{}",
                options.max_length, content
            ),
        };

        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: TEMPERATURE,
        }
    }

    fn first_completion(response: ChatResponse) -> Result<String, SummaryError> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| SummaryError::ProviderError("No summary generated".to_string()))
    }
}

#[async_trait::async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(
        &self,
        content: &str,
        options: &SummaryOptions,
    ) -> Result<String, SummaryError> {
        let url = format!("{}/chat/completions", self.api_url.trim_end_matches('/'));
        let request = self.build_request(content, options);

        tracing::debug!(model = %self.model, "Requesting summary from OpenAI");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body,
                "OpenAI request failed"
            );
            return Err(SummaryError::ProviderError(format!(
                "OpenAI returned status {}",
                status
            )));
        }

        let completion: ChatResponse = response.json().await?;
        Self::first_completion(completion)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
