//! Chrome binary discovery and process launch.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::process::{Child, Command};

use super::error::{SessionError, SessionResult};

/// Known Chrome binary locations, in search priority order.
const KNOWN_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/opt/homebrew/bin/chromium",
    "/usr/local/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

/// Find a Chrome or Chromium binary on the system.
///
/// Search order:
/// 1. `CHROME_PATH` environment variable
/// 2. Known system paths
///
/// Returns `None` if no executable candidate exists.
pub fn find_chrome() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("CHROME_PATH") {
        let path = PathBuf::from(&env_path);
        if is_executable(&path) {
            return Some(path);
        }
        tracing::debug!(path = %env_path, "CHROME_PATH set but not executable, falling through");
    }

    for candidate in KNOWN_PATHS {
        let path = PathBuf::from(candidate);
        if is_executable(&path) {
            tracing::debug!(path = %candidate, "found Chrome binary");
            return Some(path);
        }
    }

    None
}

/// Return the ordered list of candidate paths (excluding env var).
pub fn search_paths() -> Vec<PathBuf> {
    KNOWN_PATHS.iter().map(PathBuf::from).collect()
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.is_file()
            && path
                .metadata()
                .map(|m| m.permissions().mode() & 0o111 != 0)
                .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

/// A launched Chrome process with its DevTools HTTP endpoint.
pub struct LaunchedChrome {
    pub child: Child,
    pub devtools_base: String,
}

/// Launch Chrome with remote debugging on a free local port. A launch
/// failure is fatal and propagates; there is no retry.
pub async fn launch(binary: &Path, headless: bool) -> SessionResult<LaunchedChrome> {
    let port = free_port().await?;
    let profile_dir = std::env::temp_dir().join(format!("replybot-profile-{}", std::process::id()));

    let mut command = Command::new(binary);
    command
        .arg(format!("--remote-debugging-port={port}"))
        .arg(format!("--user-data-dir={}", profile_dir.display()))
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-gpu")
        .arg("--window-size=1280,720")
        .arg(
            "--user-agent=Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        )
        .arg("about:blank")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    if headless {
        command.arg("--headless=new");
    }

    let child = command
        .spawn()
        .map_err(|e| SessionError::Launch(format!("{}: {e}", binary.display())))?;

    let devtools_base = format!("http://127.0.0.1:{port}");
    wait_for_devtools(&devtools_base).await?;

    tracing::info!(port, headless, "Chrome launched");
    Ok(LaunchedChrome {
        child,
        devtools_base,
    })
}

/// Resolve the WebSocket debugger URL of the first page target.
pub async fn page_ws_url(devtools_base: &str) -> SessionResult<String> {
    let targets: serde_json::Value = reqwest::get(format!("{devtools_base}/json/list"))
        .await
        .map_err(|e| SessionError::Launch(format!("DevTools endpoint unreachable: {e}")))?
        .json()
        .await
        .map_err(|e| SessionError::Launch(format!("DevTools target list unreadable: {e}")))?;

    targets
        .as_array()
        .into_iter()
        .flatten()
        .find(|t| t["type"] == "page")
        .and_then(|t| t["webSocketDebuggerUrl"].as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| SessionError::Launch("no page target exposed by Chrome".to_string()))
}

async fn wait_for_devtools(devtools_base: &str) -> SessionResult<()> {
    let deadline = std::time::Instant::now() + Duration::from_secs(15);
    let url = format!("{devtools_base}/json/version");
    loop {
        if reqwest::get(&url).await.is_ok() {
            return Ok(());
        }
        if std::time::Instant::now() > deadline {
            return Err(SessionError::Launch(
                "DevTools endpoint did not come up within 15s".to_string(),
            ));
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

/// Bind to port 0 to pick a free port, then release it for Chrome.
async fn free_port() -> SessionResult<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    Ok(listener.local_addr()?.port())
}
