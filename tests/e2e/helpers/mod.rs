mod api_client;
mod app;

pub use api_client::{ApiResponse, TestClient};
pub use app::TestApp;
