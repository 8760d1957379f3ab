use serde::{Deserialize, Serialize};

use crate::controller::ResolutionPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base address of the assistant backend (scheme + host + port)
    pub backend_url: String,
    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds (0 = wait for the transport indefinitely)
    pub request_timeout_secs: u64,
    /// How overlapping submits on one controller are resolved
    pub resolution_policy: ResolutionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 0,
            resolution_policy: ResolutionPolicy::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("INSTORE_BACKEND_URL") {
            config.backend_url = url;
        }
        if let Ok(val) = std::env::var("INSTORE_CONNECT_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.connect_timeout_secs = v;
            }
        }
        if let Ok(val) = std::env::var("INSTORE_REQUEST_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.request_timeout_secs = v;
            }
        }
        if let Ok(val) = std::env::var("INSTORE_RESOLUTION_POLICY") {
            match val.parse() {
                Ok(policy) => config.resolution_policy = policy,
                Err(e) => tracing::warn!("Ignoring INSTORE_RESOLUTION_POLICY: {e}"),
            }
        }

        config
    }

    /// Base URL with any trailing slash removed, ready for `format!("{}{path}")`.
    pub fn base_url(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }

    pub fn connect_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.connect_timeout_secs)
    }

    /// `None` when no request timeout is configured.
    pub fn request_timeout(&self) -> Option<std::time::Duration> {
        (self.request_timeout_secs > 0)
            .then(|| std::time::Duration::from_secs(self.request_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_local_backend() {
        let config = Config::default();
        assert_eq!(config.backend_url, "http://localhost:8000");
        assert_eq!(config.resolution_policy, ResolutionPolicy::LastResolved);
    }

    #[test]
    fn test_base_url_trims_trailing_slashes() {
        let config = Config {
            backend_url: "http://shop.local:8000//".to_string(),
            ..Config::default()
        };
        assert_eq!(config.base_url(), "http://shop.local:8000");
    }

    #[test]
    fn test_request_timeout_disabled_by_default() {
        assert!(Config::default().request_timeout().is_none());
    }

    #[test]
    fn test_request_timeout_when_set() {
        let config = Config {
            request_timeout_secs: 15,
            ..Config::default()
        };
        assert_eq!(
            config.request_timeout(),
            Some(std::time::Duration::from_secs(15))
        );
    }

    #[test]
    fn test_config_serializes_policy_as_snake_case() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["resolution_policy"], "last_resolved");
    }
}
