//! Selector fallback chains for the Twitter login and timeline markup.
//!
//! Twitter renames test ids and shuffles autocomplete attributes often, so
//! every lookup is an ordered chain of candidates tried with a bounded
//! timeout each. Exhausting a chain produces a `SelectorNotFound` that lists
//! exactly what was tried.

use std::time::Duration;

use super::error::{SessionError, SessionResult};
use super::session::BrowserSession;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy)]
pub enum Locator {
    /// Matches when the selector resolves to a visible element.
    Css(&'static str),
    /// Matches when the page body contains the fragment.
    Text(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub locator: Locator,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct SelectorChain {
    pub what: &'static str,
    pub candidates: &'static [Candidate],
}

impl SelectorChain {
    /// Try each candidate in order, polling until `per_candidate` elapses
    /// before moving on. Returns the first candidate that matched.
    pub async fn resolve(
        &self,
        session: &BrowserSession,
        per_candidate: Duration,
    ) -> SessionResult<&'static Candidate> {
        match self.try_resolve(session, per_candidate).await? {
            Some(candidate) => Ok(candidate),
            None => Err(SessionError::SelectorNotFound {
                what: self.what,
                attempts: self.attempt_labels(),
            }),
        }
    }

    /// Like `resolve` but exhaustion is an ordinary `None`. Used for prompts
    /// that legitimately may not appear, like the phone verification screen.
    pub async fn try_resolve(
        &self,
        session: &BrowserSession,
        per_candidate: Duration,
    ) -> SessionResult<Option<&'static Candidate>> {
        for candidate in self.candidates {
            let deadline = tokio::time::Instant::now() + per_candidate;
            loop {
                let matched = match candidate.locator {
                    Locator::Css(css) => session.element_visible(css).await?,
                    Locator::Text(text) => session.text_visible(text).await?,
                };
                if matched {
                    tracing::debug!(
                        what = self.what,
                        candidate = candidate.description,
                        "selector resolved"
                    );
                    return Ok(Some(candidate));
                }
                if tokio::time::Instant::now() >= deadline {
                    break;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
            tracing::debug!(
                what = self.what,
                candidate = candidate.description,
                "candidate timed out, trying next"
            );
        }
        Ok(None)
    }

    pub fn attempt_labels(&self) -> Vec<String> {
        self.candidates
            .iter()
            .map(|c| match c.locator {
                Locator::Css(css) => format!("{} ({css})", c.description),
                Locator::Text(text) => format!("{} (text: {text:?})", c.description),
            })
            .collect()
    }
}

pub const USERNAME_INPUT: SelectorChain = SelectorChain {
    what: "username input",
    candidates: &[
        Candidate {
            locator: Locator::Css(r#"input[autocomplete="username"]"#),
            description: "autocomplete username field",
        },
        Candidate {
            locator: Locator::Css(r#"input[name="text"]"#),
            description: "generic text field",
        },
        Candidate {
            locator: Locator::Css(r#"input[data-testid="ocfEnterTextTextInput"]"#),
            description: "onboarding flow text input",
        },
    ],
};

pub const PASSWORD_INPUT: SelectorChain = SelectorChain {
    what: "password input",
    candidates: &[
        Candidate {
            locator: Locator::Css(r#"input[type="password"]"#),
            description: "password-typed field",
        },
        Candidate {
            locator: Locator::Css(r#"input[name="password"]"#),
            description: "password-named field",
        },
        Candidate {
            locator: Locator::Css(r#"input[autocomplete="current-password"]"#),
            description: "autocomplete current-password field",
        },
    ],
};

pub const PHONE_PROMPT: SelectorChain = SelectorChain {
    what: "phone verification prompt",
    candidates: &[
        Candidate {
            locator: Locator::Text("Enter your phone number"),
            description: "phone prompt heading",
        },
        Candidate {
            locator: Locator::Css(r#"input[placeholder*="phone"]"#),
            description: "phone placeholder field",
        },
    ],
};

pub const TWO_FACTOR: SelectorChain = SelectorChain {
    what: "two-factor code prompt",
    candidates: &[
        Candidate {
            locator: Locator::Css(r#"input[data-testid="ocfEnterTextTextInput"]"#),
            description: "onboarding flow text input",
        },
        Candidate {
            locator: Locator::Css(r#"input[placeholder*="verification"]"#),
            description: "verification placeholder field",
        },
        Candidate {
            locator: Locator::Css(r#"input[placeholder*="code"]"#),
            description: "code placeholder field",
        },
        Candidate {
            locator: Locator::Text("Enter your verification code"),
            description: "verification code heading",
        },
        Candidate {
            locator: Locator::Text("Check your phone"),
            description: "check-your-phone heading",
        },
        Candidate {
            locator: Locator::Text("confirmation code"),
            description: "confirmation code copy",
        },
    ],
};

pub const LOGIN_INDICATORS: SelectorChain = SelectorChain {
    what: "logged-in home timeline",
    candidates: &[
        Candidate {
            locator: Locator::Css(r#"[data-testid="SideNav_AccountSwitcher_Button"]"#),
            description: "account switcher button",
        },
        Candidate {
            locator: Locator::Css(r#"[data-testid="AppTabBar_Home_Link"]"#),
            description: "home tab link",
        },
        Candidate {
            locator: Locator::Css(r#"[aria-label="Home timeline"]"#),
            description: "home timeline region",
        },
    ],
};

pub const TWEET_CARD: &str = r#"article[data-testid="tweet"]"#;
