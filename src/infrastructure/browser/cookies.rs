//! Cookie persistence so restarts can skip the interactive login.

use serde_json::json;

use super::error::SessionResult;
use super::session::BrowserSession;

impl BrowserSession {
    /// Dump all browser cookies to the configured file. No-op when cookie
    /// persistence is disabled.
    pub async fn save_cookies(&self) -> SessionResult<()> {
        let Some(path) = &self.config.cookie_file else {
            return Ok(());
        };
        let result = self.cdp.send("Network.getCookies", json!({})).await?;
        let cookies = &result["cookies"];
        tokio::fs::write(path, serde_json::to_vec_pretty(cookies)?).await?;
        tracing::info!(
            path = %path.display(),
            count = cookies.as_array().map(|a| a.len()).unwrap_or(0),
            "cookies saved"
        );
        Ok(())
    }

    /// Restore cookies from the configured file. Returns whether a snapshot
    /// existed and was applied; a missing file is the normal first run.
    pub async fn load_cookies(&self) -> SessionResult<bool> {
        let Some(path) = &self.config.cookie_file else {
            return Ok(false);
        };
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        let cookies: serde_json::Value = serde_json::from_slice(&raw)?;

        self.cdp
            .send("Network.setCookies", json!({ "cookies": cookies }))
            .await?;
        tracing::info!(
            path = %path.display(),
            count = cookies.as_array().map(|a| a.len()).unwrap_or(0),
            "cookies restored"
        );
        Ok(true)
    }
}
