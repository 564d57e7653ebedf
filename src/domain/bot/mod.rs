//! The auto-reply loop: find new mentions, generate a reply for each, and
//! optionally post it through the browser session.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::domain::reply::ReplyGenerator;
use crate::domain::timeline::Mention;
use crate::infrastructure::browser::{BrowserSession, SessionResult};

/// The slice of the browser session the loop needs. Kept narrow so the
/// cycle logic can be exercised against a fake.
#[async_trait]
pub trait MentionGateway: Send + Sync {
    async fn search_for_mentions(&self, username: &str) -> SessionResult<Vec<Mention>>;
    async fn reply_to_tweet(&self, username: &str, tweet_id: &str, text: &str) -> bool;
}

#[async_trait]
impl MentionGateway for BrowserSession {
    async fn search_for_mentions(&self, username: &str) -> SessionResult<Vec<Mention>> {
        BrowserSession::search_for_mentions(self, username).await
    }

    async fn reply_to_tweet(&self, username: &str, tweet_id: &str, text: &str) -> bool {
        BrowserSession::reply_to_tweet(self, username, tweet_id, text).await
    }
}

// Fixed pause between consecutive posts.
const POST_PAUSE: Duration = Duration::from_secs(2);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub seen: usize,
    pub new: usize,
    pub posted: usize,
}

pub struct BotService {
    gateway: Arc<dyn MentionGateway>,
    generator: Arc<dyn ReplyGenerator>,
    username: String,
    auto_post: bool,
    interval: Duration,
    // Keys of mentions already handled; survives cycles, not restarts.
    replied: Mutex<HashSet<String>>,
}

impl BotService {
    pub fn new(
        gateway: Arc<dyn MentionGateway>,
        generator: Arc<dyn ReplyGenerator>,
        username: String,
        auto_post: bool,
        interval: Duration,
    ) -> Self {
        Self {
            gateway,
            generator,
            username,
            auto_post,
            interval,
            replied: Mutex::new(HashSet::new()),
        }
    }

    /// One pass over the live mention search. A mention is handled at most
    /// once even if it keeps appearing in later searches; generation
    /// failures skip the mention without marking it handled.
    pub async fn run_cycle(&self) -> SessionResult<CycleReport> {
        let mentions = self.gateway.search_for_mentions(&self.username).await?;
        let mut report = CycleReport {
            seen: mentions.len(),
            ..Default::default()
        };

        for mention in mentions {
            let key = mention.key();
            if self.replied.lock().expect("replied set poisoned").contains(&key) {
                continue;
            }
            report.new += 1;

            let reply = match self.generator.generate(&mention).await {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::warn!(author = %mention.author, error = %e, "reply generation failed");
                    continue;
                }
            };
            tracing::info!(
                author = %mention.author,
                generator = self.generator.name(),
                reply = %reply,
                "generated reply"
            );

            if self.auto_post {
                match &mention.tweet.id {
                    Some(tweet_id) => {
                        if self
                            .gateway
                            .reply_to_tweet(&self.username, tweet_id, &reply)
                            .await
                        {
                            report.posted += 1;
                            tokio::time::sleep(POST_PAUSE).await;
                        }
                    }
                    None => {
                        tracing::warn!(author = %mention.author, "mention has no status id, cannot post");
                    }
                }
            }

            self.replied.lock().expect("replied set poisoned").insert(key);
        }

        tracing::info!(
            seen = report.seen,
            new = report.new,
            posted = report.posted,
            auto_post = self.auto_post,
            "cycle complete"
        );
        Ok(report)
    }

    /// Run cycles until cancelled. A failed cycle logs and waits for the
    /// next tick instead of killing the loop.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            username = %self.username,
            interval = ?self.interval,
            auto_post = self.auto_post,
            "bot loop started"
        );
        loop {
            if let Err(e) = self.run_cycle().await {
                tracing::error!(error = %e, "cycle failed");
            }
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("bot loop stopped");
                    return;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}
