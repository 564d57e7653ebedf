use async_trait::async_trait;
use rand::seq::SliceRandom;

use crate::domain::timeline::Mention;
use crate::error::AppResult;

use super::{clip, ReplyGenerator};

const HELPFUL: &[&str] = &[
    "Thanks for reaching out! Happy to help with that.",
    "Good question! Let me look into it and get back to you.",
    "Appreciate you flagging this. On it!",
    "Thanks for the mention! What can I do for you?",
];

const ENGAGING: &[&str] = &[
    "Great point! What made you think of that?",
    "Love this! Tell me more.",
    "Interesting take! How did you land on it?",
    "This is exactly the kind of conversation I'm here for!",
];

const PROFESSIONAL: &[&str] = &[
    "Thank you for your message. We will follow up shortly.",
    "Noted, thank you. We appreciate the feedback.",
    "Thank you for bringing this to our attention.",
    "We have received your message and will respond soon.",
];

const CASUAL: &[&str] = &[
    "ha, appreciate the mention!",
    "hey! good to see you around here",
    "thanks for the ping, made my day",
    "oh nice, thanks for looping me in",
];

/// Canned responses keyed by style. Unknown styles fall back to helpful.
pub struct TemplateReplyGenerator {
    pool: &'static [&'static str],
}

impl TemplateReplyGenerator {
    pub fn new(style: &str) -> Self {
        let pool = match style {
            "engaging" => ENGAGING,
            "professional" => PROFESSIONAL,
            "casual" => CASUAL,
            "helpful" => HELPFUL,
            other => {
                tracing::warn!(style = other, "unknown reply style, using helpful");
                HELPFUL
            }
        };
        Self { pool }
    }
}

#[async_trait]
impl ReplyGenerator for TemplateReplyGenerator {
    async fn generate(&self, mention: &Mention) -> AppResult<String> {
        let body = self
            .pool
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(HELPFUL[0]);
        Ok(clip(&format!("@{} {body}", mention.author)))
    }

    fn name(&self) -> &'static str {
        "template"
    }
}
