//! Browser-session login component: drives a headless Chrome through the
//! Twitter web login UI over the Chrome DevTools Protocol and exposes
//! scraping/posting operations on the authenticated session.

mod cdp;
mod chrome;
mod cookies;
mod error;
mod login;
mod manual;
mod scrape;
mod selectors;
mod session;

pub use error::{SessionError, SessionResult};
pub use manual::{ManualWait, WaitOutcome};
pub use session::{BrowserConfig, BrowserSession};
