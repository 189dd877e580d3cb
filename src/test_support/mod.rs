//! Helpers shared by in-crate tests.

pub mod socket_guard {
    use std::net::TcpListener;

    use wiremock::MockServer;

    const REQUIRE_ENV: &str = "COURSEGRAB_REQUIRE_SOCKET_TESTS";

    /// Starts a mock site, or returns `None` (and the test passes vacuously)
    /// where localhost sockets cannot be bound.
    ///
    /// `COURSEGRAB_REQUIRE_SOCKET_TESTS=1` (or `true`, `yes`) turns the skip
    /// into a failure.
    pub async fn start_mock_server_or_skip() -> Option<MockServer> {
        if TcpListener::bind("127.0.0.1:0").is_err() {
            let required = std::env::var(REQUIRE_ENV).ok();
            assert!(
                !is_required(required.as_deref()),
                "localhost sockets unavailable but {REQUIRE_ENV} is set"
            );
            eprintln!("[socket-bound-test] cannot bind localhost socket; skipping");
            return None;
        }
        Some(MockServer::start().await)
    }

    /// Same truthy values the integration-test guard accepts.
    pub(crate) fn is_required(value: Option<&str>) -> bool {
        matches!(value, Some("1" | "true" | "yes"))
    }

    #[test]
    fn test_only_truthy_values_require_sockets() {
        assert!(is_required(Some("1")));
        assert!(is_required(Some("true")));
        assert!(is_required(Some("yes")));
        assert!(!is_required(Some("0")));
        assert!(!is_required(Some("")));
        assert!(!is_required(None));
    }
}
