use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::timeline::Mention;
use crate::error::AppResult;

use super::{clip, ReplyGenerator, TemplateReplyGenerator};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Chat-completions backed generator. Any API failure logs a warning and
/// falls back to the template pool so the reply loop keeps moving.
pub struct LlmReplyGenerator {
    api_key: String,
    api_url: String,
    model: String,
    style: String,
    fallback: TemplateReplyGenerator,
    http_client: reqwest::Client,
}

impl LlmReplyGenerator {
    pub fn new(api_key: String, api_url: String, model: String, style: &str) -> Self {
        Self {
            api_key,
            api_url,
            model,
            style: style.to_string(),
            fallback: TemplateReplyGenerator::new(style),
            http_client: reqwest::Client::new(),
        }
    }

    async fn complete(&self, mention: &Mention) -> AppResult<String> {
        let system = format!(
            "You write short {} replies to tweets that mention your account. \
             Reply in under 280 characters, no hashtags, address the author directly.",
            self.style
        );
        let user = format!(
            "@{} wrote: {}\n\nWrite the reply, starting with @{}.",
            mention.author, mention.tweet.text, mention.author
        );

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: 100,
            temperature: 0.7,
        };

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl ReplyGenerator for LlmReplyGenerator {
    async fn generate(&self, mention: &Mention) -> AppResult<String> {
        match self.complete(mention).await {
            Ok(text) if !text.is_empty() => Ok(clip(&text)),
            Ok(_) => {
                tracing::warn!("LLM returned empty completion, falling back to template");
                self.fallback.generate(mention).await
            }
            Err(e) => {
                tracing::warn!(error = %e, "LLM request failed, falling back to template");
                self.fallback.generate(mention).await
            }
        }
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}
