//! Status page configuration loaded from environment variables.

/// Health endpoint of a locally running backend.
pub const DEFAULT_HEALTH_ENDPOINT: &str = "http://localhost:5000/health";

/// Reads from environment variables:
/// - `STATUS_ENDPOINT`: health URL (default: `"http://localhost:5000/health"`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusConfig {
    pub endpoint: String,
    pub log_level: String,
}

impl StatusConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            endpoint: lookup("STATUS_ENDPOINT")
                .filter(|e| !e.trim().is_empty())
                .unwrap_or(defaults.endpoint),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_HEALTH_ENDPOINT.to_string(),
            log_level: "info".to_string(),
        }
    }
}
