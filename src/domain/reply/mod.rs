//! Reply text generation. Two interchangeable strategies sit behind one
//! trait: canned style templates, or a chat-completions call with the
//! templates as fallback.

mod llm;
mod template;

pub use llm::LlmReplyGenerator;
pub use template::TemplateReplyGenerator;

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::timeline::Mention;
use crate::error::AppResult;
use crate::infrastructure::config::{Config, ReplyMode};

/// Hard ceiling from the platform; replies longer than this are rejected
/// by the composer.
pub const MAX_REPLY_CHARS: usize = 280;

#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Produce reply text for a mention, at most [`MAX_REPLY_CHARS`] chars,
    /// addressed to the mention's author.
    async fn generate(&self, mention: &Mention) -> AppResult<String>;

    fn name(&self) -> &'static str;
}

/// Pick the generator the config asks for. LLM mode without an API key
/// degrades to templates with a warning rather than failing startup.
pub fn from_config(config: &Config) -> Arc<dyn ReplyGenerator> {
    match config.reply_mode {
        ReplyMode::Template => Arc::new(TemplateReplyGenerator::new(&config.reply_style)),
        ReplyMode::Llm => match &config.llm_api_key {
            Some(key) => Arc::new(LlmReplyGenerator::new(
                key.clone(),
                config.llm_api_url.clone(),
                config.llm_model.clone(),
                &config.reply_style,
            )),
            None => {
                tracing::warn!("REPLY_MODE=llm but LLM_API_KEY unset, using templates");
                Arc::new(TemplateReplyGenerator::new(&config.reply_style))
            }
        },
    }
}

/// Clip to the platform limit on a char boundary, marking the cut.
pub(crate) fn clip(text: &str) -> String {
    if text.chars().count() <= MAX_REPLY_CHARS {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(MAX_REPLY_CHARS - 3).collect();
    clipped.push_str("...");
    clipped
}
