//! Tweets and mentions as scraped from the web timeline. These are looser
//! than the REST v2 payloads: ids and counters are best-effort, absent when
//! the markup did not expose them.

use serde::{Deserialize, Serialize};

pub const NO_TEXT_SENTINEL: &str = "No text found";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetMetrics {
    pub replies: u32,
    pub retweets: u32,
    pub likes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    /// Status id pulled from the permalink; missing for cards without one.
    pub id: Option<String>,
    pub text: String,
    /// Raw `datetime` attribute of the card's timestamp, untouched.
    pub created_at: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub metrics: TweetMetrics,
}

impl Tweet {
    pub fn has_text(&self) -> bool {
        self.text != NO_TEXT_SENTINEL && !self.text.is_empty()
    }
}

/// A tweet by someone else that names the bot's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub author: String,
    pub tweet: Tweet,
}

impl Mention {
    /// Dedupe key for the reply loop. Falls back to author and text when the
    /// card exposed no permalink.
    pub fn key(&self) -> String {
        match &self.tweet.id {
            Some(id) => id.clone(),
            None => format!("{}:{}", self.author, self.tweet.text),
        }
    }
}
