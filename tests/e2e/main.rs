// End-to-end tests for the replybot backend HTTP surface.
//
// Each test spawns the full axum router on an ephemeral port with a wiremock
// server standing in for the Twitter API, so requests exercise the real
// controllers, error mapping and upstream client code. Tests run in parallel;
// every test owns its app and mock server.

mod helpers;
mod test_api;
mod test_health;
mod test_proxy;
mod test_token_exchange;
