//! Timeline scraping and in-browser posting on an authenticated session.

use std::time::Duration;

use regex::Regex;
use serde_json::Value;

use crate::domain::timeline::{Mention, Tweet, TweetMetrics, NO_TEXT_SENTINEL};

use super::error::SessionResult;
use super::selectors::TWEET_CARD;
use super::session::BrowserSession;

const MENTIONS_CAP: usize = 5;
const REPLIES_CAP: usize = 10;
const CARD_WAIT: Duration = Duration::from_secs(10);

/// JS run in the page to snapshot visible tweet cards. Each entry carries
/// the tweet text, the permalink href, the author handle from that href,
/// and the raw aria-labels of the engagement buttons.
const EXTRACT_CARDS_JS: &str = r#"
(() => {
    const cards = document.querySelectorAll('article[data-testid="tweet"]');
    return Array.from(cards).map(card => {
        const textEl = card.querySelector('[data-testid="tweetText"]');
        const linkEl = card.querySelector('a[href*="/status/"]');
        const label = testid => {
            const el = card.querySelector(`[data-testid="${testid}"]`);
            return el ? (el.getAttribute('aria-label') || el.innerText || '') : '';
        };
        const timeEl = card.querySelector('time');
        return {
            text: textEl ? textEl.innerText : null,
            href: linkEl ? linkEl.getAttribute('href') : null,
            datetime: timeEl ? timeEl.getAttribute('datetime') : null,
            reply: label('reply'),
            retweet: label('retweet'),
            like: label('like'),
        };
    });
})()
"#;

impl BrowserSession {
    /// Scrape the home timeline, newest first, up to `limit` tweets. Cards
    /// that fail to parse are skipped, never fatal; a timeline that shows no
    /// cards at all within the wait bound is a `Timeout`.
    pub async fn get_my_tweets(&self, limit: usize) -> SessionResult<Vec<Tweet>> {
        self.require_login().await?;
        self.goto("https://x.com/home").await?;
        if !self.wait_for_cards().await? {
            return Err(super::error::SessionError::Timeout {
                what: "home timeline tweets".to_string(),
                waited: CARD_WAIT,
            });
        }

        let cards = self.extract_cards().await?;
        let tweets = tweets_from_cards(&cards, limit);
        tracing::info!(count = tweets.len(), limit, "scraped timeline tweets");
        Ok(tweets)
    }

    /// Live-search for @-mentions of the account, excluding its own posts.
    pub async fn search_for_mentions(&self, username: &str) -> SessionResult<Vec<Mention>> {
        self.require_login().await?;
        let handle = format!("@{username}");
        let query = urlencoding::encode(&handle);
        self.goto(&format!("https://x.com/search?q={query}&f=live"))
            .await?;
        self.wait_for_cards().await?;

        let cards = self.extract_cards().await?;
        let mentions: Vec<Mention> = cards
            .iter()
            .filter_map(|card| {
                let tweet = parse_card(card)?;
                let author = author_from_href(card["href"].as_str()?)?;
                Some(Mention { author, tweet })
            })
            .filter(|m| !m.author.eq_ignore_ascii_case(username))
            .take(MENTIONS_CAP)
            .collect();

        tracing::info!(count = mentions.len(), "scraped mentions");
        Ok(mentions)
    }

    /// Scrape the replies under a tweet. The first card on a status page is
    /// the tweet itself and is skipped; a few PageDown presses load more.
    pub async fn get_replies_for_tweet(
        &self,
        username: &str,
        tweet_id: &str,
    ) -> SessionResult<Vec<Tweet>> {
        self.require_login().await?;
        self.goto(&format!("https://x.com/{username}/status/{tweet_id}"))
            .await?;
        self.wait_for_cards().await?;

        for _ in 0..3 {
            self.press_page_down().await?;
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        let cards = self.extract_cards().await?;
        let replies: Vec<Tweet> = cards
            .iter()
            .skip(1)
            .filter_map(parse_card)
            .take(REPLIES_CAP)
            .collect();
        tracing::info!(%tweet_id, count = replies.len(), "scraped replies");
        Ok(replies)
    }

    /// Post a reply through the web composer. Returns whether the post went
    /// through; any failure is logged and swallowed so one bad reply does
    /// not stop the loop.
    pub async fn reply_to_tweet(&self, username: &str, tweet_id: &str, text: &str) -> bool {
        match self.try_reply(username, tweet_id, text).await {
            Ok(()) => {
                tracing::info!(%tweet_id, "reply posted");
                true
            }
            Err(e) => {
                tracing::warn!(%tweet_id, error = %e, "reply failed");
                false
            }
        }
    }

    async fn try_reply(&self, username: &str, tweet_id: &str, text: &str) -> SessionResult<()> {
        self.require_login().await?;
        self.goto(&format!("https://x.com/{username}/status/{tweet_id}"))
            .await?;
        self.wait_for_cards().await?;

        self.click(r#"[data-testid="reply"]"#).await?;
        tokio::time::sleep(Duration::from_secs(1)).await;

        self.fill_composer(text).await?;
        self.click(r#"[data-testid="tweetButtonInline"]"#).await?;
        tokio::time::sleep(Duration::from_secs(2)).await;
        Ok(())
    }

    /// The composer is a contenteditable div, not an input, so the native
    /// value setter used by `fill` does not apply.
    async fn fill_composer(&self, text: &str) -> SessionResult<()> {
        let expression = format!(
            r#"(() => {{
                const el = document.querySelector('[data-testid="tweetTextarea_0"]');
                if (!el) return false;
                el.focus();
                document.execCommand('insertText', false, {text});
                return true;
            }})()"#,
            text = serde_json::to_string(text)?,
        );
        let filled = self.eval(&expression).await?.as_bool().unwrap_or(false);
        if !filled {
            return Err(super::error::SessionError::Cdp(
                "reply composer not found".to_string(),
            ));
        }
        Ok(())
    }

    async fn require_login(&self) -> SessionResult<()> {
        if self.is_logged_in().await? {
            Ok(())
        } else {
            Err(super::error::SessionError::NotLoggedIn)
        }
    }

    /// Whether any tweet card appeared within the wait bound. Expiry is a
    /// plain `false`: a mention search or thread may legitimately be empty,
    /// and only `get_my_tweets` treats it as a timeout.
    async fn wait_for_cards(&self) -> SessionResult<bool> {
        let deadline = tokio::time::Instant::now() + CARD_WAIT;
        loop {
            if self.element_visible(TWEET_CARD).await? {
                return Ok(true);
            }
            if tokio::time::Instant::now() >= deadline {
                tracing::debug!("no tweet cards appeared, page may be empty");
                return Ok(false);
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
    }

    async fn extract_cards(&self) -> SessionResult<Vec<Value>> {
        let value = self.eval(EXTRACT_CARDS_JS).await?;
        Ok(value.as_array().cloned().unwrap_or_default())
    }
}

/// Parse a card snapshot into tweets, at most `limit` of them.
fn tweets_from_cards(cards: &[Value], limit: usize) -> Vec<Tweet> {
    cards.iter().filter_map(parse_card).take(limit).collect()
}

fn parse_card(card: &Value) -> Option<Tweet> {
    if !card.is_object() {
        return None;
    }
    let text = card["text"]
        .as_str()
        .map(|t| t.to_string())
        .unwrap_or_else(|| NO_TEXT_SENTINEL.to_string());
    let url = card["href"].as_str().map(|h| format!("https://x.com{h}"));
    let id = card["href"].as_str().and_then(status_id_from_href);

    Some(Tweet {
        id,
        text,
        created_at: card["datetime"].as_str().map(|d| d.to_string()),
        url,
        metrics: TweetMetrics {
            replies: parse_metric(card["reply"].as_str().unwrap_or_default()),
            retweets: parse_metric(card["retweet"].as_str().unwrap_or_default()),
            likes: parse_metric(card["like"].as_str().unwrap_or_default()),
        },
    })
}

/// "/alice/status/123456" -> "123456"
fn status_id_from_href(href: &str) -> Option<String> {
    let (_, rest) = href.split_once("/status/")?;
    let id: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    (!id.is_empty()).then_some(id)
}

/// "/alice/status/123456" -> "alice"
fn author_from_href(href: &str) -> Option<String> {
    let handle = href.trim_start_matches('/').split('/').next()?;
    (!handle.is_empty()).then(|| handle.to_string())
}

/// First comma-grouped number in an engagement label, e.g. "1,234 Likes".
fn parse_metric(label: &str) -> u32 {
    // Twitter labels localize, but the count is always the first number.
    let re = Regex::new(r"[\d,]+").expect("static regex");
    re.find(label)
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
        .unwrap_or(0)
}
