//! Integration tests for Shoptill.
//!
//! These tests run against a live server and are `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! # Prepare and start the server
//! cargo run -p shoptill-cli -- migrate
//! cargo run -p shoptill-cli -- seed
//! cargo run -p shoptill-server
//!
//! # Run integration tests against it
//! cargo test -p shoptill-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPTILL_TEST_URL` - Base URL of the running server
//!   (default: `http://localhost:8080`)
//! - `SHOPTILL_TEST_USERNAME` / `SHOPTILL_TEST_PASSWORD` - Login used by
//!   tests that need a session (default: the seeded `admin`/`admin`)

use reqwest::Client;

/// Shared context for talking to a running server.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Create a context with a cookie-holding client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn new() -> Self {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url(),
        }
    }

    /// Build a full URL from a path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in with the configured test credentials, storing the session
    /// cookie on the client.
    ///
    /// # Panics
    ///
    /// Panics if the login request fails or is rejected.
    pub async fn login(&self) {
        let username =
            std::env::var("SHOPTILL_TEST_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let password =
            std::env::var("SHOPTILL_TEST_PASSWORD").unwrap_or_else(|_| "admin".to_string());

        let resp = self
            .client
            .post(self.url("/login"))
            .form(&[("username", username.as_str()), ("password", password.as_str())])
            .send()
            .await
            .expect("Login request failed");

        assert!(
            resp.status().is_success() || resp.status().is_redirection(),
            "Login rejected with status {}",
            resp.status()
        );
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Base URL for the server under test (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("SHOPTILL_TEST_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}
