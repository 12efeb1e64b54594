//! Console configuration: API endpoint, timeouts, token location and the
//! client identity reported to the backend. Values come from CLI flags or
//! environment variables; blank values fall back to defaults. Configuration
//! is public data; tokens never live here.

use std::{path::PathBuf, time::Duration};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_CEREMONY_TIMEOUT_SECONDS: u64 = 120;
/// File name of the persisted token, the fixed storage key.
pub const TOKEN_STORAGE_KEY: &str = "token";

#[derive(Clone, Debug)]
pub struct ConsoleConfig {
    api_base_url: String,
    request_timeout: Duration,
    ceremony_timeout: Duration,
    token_path: PathBuf,
    user_agent: String,
    screen_resolution: String,
    location: String,
}

impl ConsoleConfig {
    #[must_use]
    pub fn new(api_base_url: &str) -> Self {
        let api_base_url = normalize_value(api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            api_base_url,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS),
            ceremony_timeout: Duration::from_secs(DEFAULT_CEREMONY_TIMEOUT_SECONDS),
            token_path: default_token_path(),
            user_agent: crate::APP_USER_AGENT.to_string(),
            screen_resolution: "unknown".to_string(),
            location: "Unknown".to_string(),
        }
    }

    #[must_use]
    pub fn with_request_timeout_seconds(mut self, seconds: u64) -> Self {
        if seconds > 0 {
            self.request_timeout = Duration::from_secs(seconds);
        }
        self
    }

    #[must_use]
    pub fn with_ceremony_timeout_seconds(mut self, seconds: u64) -> Self {
        if seconds > 0 {
            self.ceremony_timeout = Duration::from_secs(seconds);
        }
        self
    }

    #[must_use]
    pub fn with_token_path(mut self, path: PathBuf) -> Self {
        self.token_path = path;
        self
    }

    /// Overrides the user-agent used for device heuristics and session records.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        if let Some(value) = normalize_value(user_agent) {
            self.user_agent = value;
        }
        self
    }

    #[must_use]
    pub fn with_screen_resolution(mut self, resolution: &str) -> Self {
        if let Some(value) = normalize_value(resolution) {
            self.screen_resolution = value;
        }
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: &str) -> Self {
        if let Some(value) = normalize_value(location) {
            self.location = value;
        }
        self
    }

    #[must_use]
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    #[must_use]
    pub fn ceremony_timeout(&self) -> Duration {
        self.ceremony_timeout
    }

    #[must_use]
    pub fn token_path(&self) -> &PathBuf {
        &self.token_path
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn screen_resolution(&self) -> &str {
        &self.screen_resolution
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

/// `~/.identihub/token`, or `./.identihub/token` when there is no home directory.
#[must_use]
pub fn default_token_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".identihub")
        .join(TOKEN_STORAGE_KEY)
}

pub(crate) fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_value_trims_and_rejects_empty() {
        assert_eq!(normalize_value(""), None);
        assert_eq!(normalize_value("   "), None);
        assert_eq!(
            normalize_value("  https://api.identihub.dev "),
            Some("https://api.identihub.dev".to_string())
        );
    }

    #[test]
    fn new_strips_trailing_slash_and_defaults_blank() {
        assert_eq!(
            ConsoleConfig::new("https://api.identihub.dev/").api_base_url(),
            "https://api.identihub.dev"
        );
        assert_eq!(ConsoleConfig::new("  ").api_base_url(), DEFAULT_API_BASE_URL);
    }

    #[test]
    fn overrides_ignore_empty_values() {
        let config = ConsoleConfig::default()
            .with_user_agent(" ")
            .with_location("")
            .with_request_timeout_seconds(0)
            .with_ceremony_timeout_seconds(0);

        assert_eq!(config.user_agent(), crate::APP_USER_AGENT);
        assert_eq!(config.location(), "Unknown");
        assert_eq!(
            config.request_timeout(),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS)
        );
        assert_eq!(
            config.ceremony_timeout(),
            Duration::from_secs(DEFAULT_CEREMONY_TIMEOUT_SECONDS)
        );
    }

    #[test]
    fn overrides_apply_when_present() {
        let config = ConsoleConfig::default()
            .with_user_agent("Mozilla/5.0 (iPhone)")
            .with_screen_resolution("1920x1080")
            .with_location("Colombo")
            .with_request_timeout_seconds(3)
            .with_token_path(PathBuf::from("/tmp/identihub-token"));

        assert_eq!(config.user_agent(), "Mozilla/5.0 (iPhone)");
        assert_eq!(config.screen_resolution(), "1920x1080");
        assert_eq!(config.location(), "Colombo");
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.token_path(), &PathBuf::from("/tmp/identihub-token"));
    }

    #[test]
    fn default_token_path_uses_storage_key() {
        assert!(default_token_path().ends_with(".identihub/token"));
    }
}
