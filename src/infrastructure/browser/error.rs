use std::time::Duration;

/// Errors from the browser automation layer. Selector failures carry every
/// candidate that was tried so the log shows exactly which markup drifted.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("CDP command failed: {0}")]
    Cdp(String),

    #[error("{what} not found; tried {}", attempts.join(", "))]
    SelectorNotFound {
        what: &'static str,
        attempts: Vec<String>,
    },

    #[error("timed out waiting for {what} after {waited:?}")]
    Timeout { what: String, waited: Duration },

    #[error("two-factor prompt was not completed within the 5 minute ceiling")]
    TwoFactorTimeout,

    #[error("operation cancelled")]
    Cancelled,

    #[error("not logged in")]
    NotLoggedIn,

    #[error("websocket error: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;
