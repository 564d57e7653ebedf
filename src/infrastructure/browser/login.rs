//! The interactive Twitter login flow, two-factor prompts included.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::error::{SessionError, SessionResult};
use super::manual::{ManualWait, WaitOutcome};
use super::selectors::{
    Candidate, Locator, LOGIN_INDICATORS, PASSWORD_INPUT, PHONE_PROMPT, TWO_FACTOR, USERNAME_INPUT,
};
use super::session::BrowserSession;

const HOME_URL: &str = "https://x.com/home";
const LOGIN_URL: &str = "https://x.com/i/flow/login";
const FIELD_TIMEOUT: Duration = Duration::from_secs(3);
const PROMPT_TIMEOUT: Duration = Duration::from_secs(3);
const VERIFY_TIMEOUT: Duration = Duration::from_secs(15);

impl BrowserSession {
    /// Whether the home timeline chrome is present, meaning the session is
    /// authenticated.
    pub async fn is_logged_in(&self) -> SessionResult<bool> {
        let url = self.current_url().await?;
        if url.contains("/home") || url.contains("/timeline") {
            return Ok(true);
        }
        Ok(LOGIN_INDICATORS
            .try_resolve(self, Duration::from_secs(1))
            .await?
            .is_some())
    }

    /// Walk the login flow: username, optional phone verification, password,
    /// optional two-factor prompt, then confirm the timeline loaded. The
    /// returned bool is the final verification; a login that ran to the end
    /// but never showed the timeline is `Ok(false)`, not an error.
    ///
    /// Phone verification and 2FA are completed by a human in the visible
    /// window; this method polls for completion with a 5 minute ceiling per
    /// prompt. An unanswered phone prompt is tolerated (the flow sometimes
    /// clears it on its own); an unanswered 2FA prompt is fatal.
    ///
    /// Safe to call on an already authenticated session.
    pub async fn login_with_2fa(
        &self,
        username: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> SessionResult<bool> {
        if self.is_logged_in().await? {
            tracing::info!("already logged in, skipping login flow");
            return Ok(true);
        }
        self.goto(HOME_URL).await?;
        if self.is_logged_in().await? {
            tracing::info!("already logged in, skipping login flow");
            return Ok(true);
        }

        tracing::info!(username, "starting login flow");
        self.goto(LOGIN_URL).await?;

        // Step 1: username
        let candidate = USERNAME_INPUT.resolve(self, FIELD_TIMEOUT).await?;
        let Locator::Css(css) = candidate.locator else {
            unreachable!("username chain is CSS-only");
        };
        self.fill(css, username).await?;
        self.submit_step("Next").await?;

        // Step 2: phone verification, if Twitter asks for it
        self.handle_phone_prompt(cancel).await?;

        // Step 3: password
        let candidate = PASSWORD_INPUT.resolve(self, FIELD_TIMEOUT).await?;
        let Locator::Css(css) = candidate.locator else {
            unreachable!("password chain is CSS-only");
        };
        self.fill(css, password).await?;
        self.submit_step("Log in").await?;

        // Step 4: two-factor, if enabled on the account
        self.handle_two_factor_prompt(cancel).await?;

        // Step 5: final verification, reported as a bool
        let indicators = LOGIN_INDICATORS.resolve(self, VERIFY_TIMEOUT).await;
        let url = self.current_url().await?;
        confirm_login(indicators, &url)
    }

    /// Advance the flow via its labeled button when one is present, else an
    /// Enter keypress on the focused field.
    async fn submit_step(&self, button_text: &str) -> SessionResult<()> {
        if self.click_button_with_text(button_text).await? {
            tracing::debug!(button = button_text, "clicked step button");
            tokio::time::sleep(Duration::from_secs(2)).await;
        } else {
            self.press_enter().await?;
        }
        Ok(())
    }

    async fn handle_phone_prompt(&self, cancel: &CancellationToken) -> SessionResult<()> {
        if PHONE_PROMPT.try_resolve(self, PROMPT_TIMEOUT).await?.is_none() {
            return Ok(());
        }

        tracing::warn!("phone verification prompt shown, waiting for manual entry");
        let outcome = ManualWait::default()
            .run(
                "phone verification",
                cancel,
                || async {
                    Ok(PHONE_PROMPT
                        .try_resolve(self, Duration::from_millis(1))
                        .await?
                        .is_none())
                },
                |elapsed| {
                    tracing::info!(?elapsed, "still waiting on phone verification");
                },
            )
            .await?;

        match outcome {
            WaitOutcome::Completed => Ok(()),
            // The prompt occasionally resolves server-side; try to proceed.
            WaitOutcome::CeilingReached => {
                tracing::warn!("phone prompt still visible after ceiling, proceeding anyway");
                Ok(())
            }
            WaitOutcome::Cancelled => Err(SessionError::Cancelled),
        }
    }

    async fn handle_two_factor_prompt(&self, cancel: &CancellationToken) -> SessionResult<()> {
        if TWO_FACTOR.try_resolve(self, PROMPT_TIMEOUT).await?.is_none() {
            tracing::debug!("no two-factor prompt detected");
            return Ok(());
        }

        tracing::warn!("two-factor prompt shown, waiting for manual code entry");
        let outcome = ManualWait::default()
            .run(
                "two-factor code",
                cancel,
                || async { self.is_logged_in().await },
                |elapsed| {
                    tracing::info!(?elapsed, "still waiting on two-factor code");
                },
            )
            .await?;

        match outcome {
            WaitOutcome::Completed => Ok(()),
            WaitOutcome::CeilingReached => Err(SessionError::TwoFactorTimeout),
            WaitOutcome::Cancelled => Err(SessionError::Cancelled),
        }
    }
}

/// A missed indicator set is an ordinary failed login, never an error; only
/// transport-level problems raise. The caller inspects the bool.
fn confirm_login(
    indicators: SessionResult<&'static Candidate>,
    url: &str,
) -> SessionResult<bool> {
    match indicators {
        Ok(candidate) => {
            tracing::info!(indicator = candidate.description, "login confirmed");
            Ok(true)
        }
        Err(SessionError::SelectorNotFound { what, attempts }) => {
            if url.contains("/home") || url.contains("/timeline") {
                tracing::info!(%url, "login confirmed by URL");
                Ok(true)
            } else {
                tracing::warn!(what, ?attempts, %url, "login verification failed");
                Ok(false)
            }
        }
        Err(e) => Err(e),
    }
}
