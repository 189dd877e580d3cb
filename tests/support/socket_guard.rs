//! Skips mock-site tests where localhost sockets cannot be bound.

use std::net::TcpListener;

use wiremock::MockServer;

const REQUIRE_ENV: &str = "COURSEGRAB_REQUIRE_SOCKET_TESTS";

/// Starts a mock site, or returns `None` so the calling test passes vacuously.
///
/// Setting `COURSEGRAB_REQUIRE_SOCKET_TESTS=1` turns the skip into a failure.
#[track_caller]
pub fn start_mock_server_or_skip() -> impl std::future::Future<Output = Option<MockServer>> {
    let location = std::panic::Location::caller();
    let bindable = TcpListener::bind("127.0.0.1:0").is_ok();
    async move {
        if bindable {
            return Some(MockServer::start().await);
        }
        let required = std::env::var(REQUIRE_ENV)
            .is_ok_and(|value| matches!(value.as_str(), "1" | "true" | "yes"));
        assert!(
            !required,
            "{REQUIRE_ENV} is set but {location} cannot bind a localhost socket"
        );
        eprintln!("[socket-bound-test] {location}: localhost sockets unavailable, skipping");
        None
    }
}
