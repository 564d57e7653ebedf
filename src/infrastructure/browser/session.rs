//! Lifecycle and page-level primitives of the automated browser session.

use std::time::Duration;

use serde_json::json;

use super::cdp::CdpConnection;
use super::chrome::{self, LaunchedChrome};
use super::error::{SessionError, SessionResult};

#[derive(Debug, Clone, Default)]
pub struct BrowserConfig {
    pub headless: bool,
    /// Cookie snapshot path; `None` disables persistence.
    pub cookie_file: Option<std::path::PathBuf>,
}

/// A live Chrome session driven over CDP. All operations take `&self`; the
/// underlying connection serializes commands internally, so the session can
/// be shared behind an `Arc` with the poll loops.
pub struct BrowserSession {
    pub(super) cdp: CdpConnection,
    pub(super) config: BrowserConfig,
    chrome: LaunchedChrome,
}

impl BrowserSession {
    /// Find Chrome, launch it, and attach to its first page target.
    pub async fn launch(config: BrowserConfig) -> SessionResult<Self> {
        let binary = chrome::find_chrome().ok_or_else(|| {
            SessionError::Launch(
                "no Chrome binary found; set CHROME_PATH or install google-chrome".to_string(),
            )
        })?;
        let chrome = chrome::launch(&binary, config.headless).await?;
        let ws_url = chrome::page_ws_url(&chrome.devtools_base).await?;
        let cdp = CdpConnection::connect(&ws_url).await?;

        cdp.send("Page.enable", json!({})).await?;
        cdp.send("Runtime.enable", json!({})).await?;
        cdp.send("Network.enable", json!({})).await?;

        Ok(Self {
            cdp,
            config,
            chrome,
        })
    }

    /// Navigate and give the page a moment to settle. Login pages render
    /// client-side, so load events alone are not a reliable signal.
    pub async fn goto(&self, url: &str) -> SessionResult<()> {
        tracing::debug!(url, "navigating");
        self.cdp.send("Page.navigate", json!({ "url": url })).await?;
        tokio::time::sleep(Duration::from_secs(3)).await;
        Ok(())
    }

    pub async fn current_url(&self) -> SessionResult<String> {
        let value = self.cdp.eval("window.location.href").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Whether a CSS selector matches a visible element right now.
    pub async fn element_visible(&self, css: &str) -> SessionResult<bool> {
        let expression = format!(
            r#"(() => {{
                const el = document.querySelector({css});
                if (!el) return false;
                const rect = el.getBoundingClientRect();
                return rect.width > 0 && rect.height > 0;
            }})()"#,
            css = serde_json::to_string(css)?,
        );
        Ok(self.cdp.eval(&expression).await?.as_bool().unwrap_or(false))
    }

    /// Whether the page body currently contains a text fragment.
    pub async fn text_visible(&self, needle: &str) -> SessionResult<bool> {
        let expression = format!(
            "document.body ? document.body.innerText.includes({}) : false",
            serde_json::to_string(needle)?,
        );
        Ok(self.cdp.eval(&expression).await?.as_bool().unwrap_or(false))
    }

    /// Set an input's value through the native setter so React-controlled
    /// fields register the change, then fire input and change events.
    pub async fn fill(&self, css: &str, value: &str) -> SessionResult<()> {
        let expression = format!(
            r#"(() => {{
                const el = document.querySelector({css});
                if (!el) return false;
                el.focus();
                const setter = Object.getOwnPropertyDescriptor(
                    window.HTMLInputElement.prototype, 'value').set;
                setter.call(el, {value});
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            css = serde_json::to_string(css)?,
            value = serde_json::to_string(value)?,
        );
        let filled = self.cdp.eval(&expression).await?.as_bool().unwrap_or(false);
        if !filled {
            return Err(SessionError::Cdp(format!("fill target vanished: {css}")));
        }
        Ok(())
    }

    pub async fn click(&self, css: &str) -> SessionResult<()> {
        let expression = format!(
            r#"(() => {{
                const el = document.querySelector({css});
                if (!el) return false;
                el.click();
                return true;
            }})()"#,
            css = serde_json::to_string(css)?,
        );
        let clicked = self.cdp.eval(&expression).await?.as_bool().unwrap_or(false);
        if !clicked {
            return Err(SessionError::Cdp(format!("click target vanished: {css}")));
        }
        Ok(())
    }

    /// Click the first button-like element whose visible text matches.
    /// Returns whether one was found; no match is not an error, the login
    /// flow falls back to Enter.
    pub async fn click_button_with_text(&self, text: &str) -> SessionResult<bool> {
        let expression = button_match_script(text)?;
        Ok(self.cdp.eval(&expression).await?.as_bool().unwrap_or(false))
    }

    /// Press Enter on the focused element.
    pub async fn press_enter(&self) -> SessionResult<()> {
        self.cdp.press_key("Enter", "Enter", 13).await?;
        tokio::time::sleep(Duration::from_secs(2)).await;
        Ok(())
    }

    pub async fn press_page_down(&self) -> SessionResult<()> {
        self.cdp.press_key("PageDown", "PageDown", 34).await
    }

    /// Run an expression in the page and return its JSON value.
    pub async fn eval(&self, expression: &str) -> SessionResult<serde_json::Value> {
        self.cdp.eval(expression).await
    }

    /// Close the browser. The process is also killed on drop.
    pub async fn close(mut self) -> SessionResult<()> {
        let _ = self.cdp.send("Browser.close", json!({})).await;
        let _ = self.chrome.child.kill().await;
        Ok(())
    }
}

fn button_match_script(text: &str) -> Result<String, serde_json::Error> {
    Ok(format!(
        r#"(() => {{
            const candidates = document.querySelectorAll('button, [role="button"]');
            for (const el of candidates) {{
                if ((el.innerText || '').trim() === {text}) {{
                    el.click();
                    return true;
                }}
            }}
            return false;
        }})()"#,
        text = serde_json::to_string(text)?,
    ))
}
