//! Asset gateway configuration.

use std::time::Duration;

/// Default bucket when `STORAGE_BUCKET_NAME` is unset.
pub const DEFAULT_BUCKET: &str = "my-gcs-bucket";

/// Lifetime of signed URLs handed out with metadata.
pub const DEFAULT_SIGNED_URL_TTL: Duration = Duration::from_secs(3600);

/// Asset gateway configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetsConfig {
    /// Bucket that receives uploads
    pub bucket_name: String,
    /// Serve canned data and skip every store call
    pub use_mocks: bool,
    pub signed_url_ttl: Duration,
    /// Scheme used for `full_storage_path` (`gs://bucket/path`)
    pub uri_scheme: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            bucket_name: DEFAULT_BUCKET.to_string(),
            use_mocks: false,
            signed_url_ttl: DEFAULT_SIGNED_URL_TTL,
            uri_scheme: "gs".to_string(),
        }
    }
}

impl AssetsConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bucket_name: std::env::var("STORAGE_BUCKET_NAME")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.bucket_name),
            use_mocks: std::env::var("USE_MOCKS")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.use_mocks),
            signed_url_ttl: std::env::var("SIGNED_URL_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.signed_url_ttl),
            uri_scheme: defaults.uri_scheme,
        }
    }

    /// Config for a mock-mode gateway.
    pub fn mocked() -> Self {
        Self {
            use_mocks: true,
            ..Self::default()
        }
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket_name = bucket.into();
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var("STORAGE_BUCKET_NAME");
        std::env::remove_var("USE_MOCKS");
        std::env::remove_var("SIGNED_URL_TTL_SECS");
    }

    #[test]
    #[serial]
    fn test_defaults_from_empty_env() {
        clear_env();
        let config = AssetsConfig::from_env();
        assert_eq!(config, AssetsConfig::default());
        assert_eq!(config.bucket_name, "my-gcs-bucket");
        assert_eq!(config.signed_url_ttl, Duration::from_secs(3600));
        assert!(!config.use_mocks);
    }

    #[test]
    #[serial]
    fn test_reads_env() {
        clear_env();
        std::env::set_var("STORAGE_BUCKET_NAME", "brand-assets");
        std::env::set_var("USE_MOCKS", "True");
        std::env::set_var("SIGNED_URL_TTL_SECS", "600");

        let config = AssetsConfig::from_env();
        assert_eq!(config.bucket_name, "brand-assets");
        assert!(config.use_mocks);
        assert_eq!(config.signed_url_ttl, Duration::from_secs(600));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_unparseable_ttl_falls_back() {
        clear_env();
        std::env::set_var("SIGNED_URL_TTL_SECS", "soon");
        std::env::set_var("USE_MOCKS", "0");

        let config = AssetsConfig::from_env();
        assert_eq!(config.signed_url_ttl, DEFAULT_SIGNED_URL_TTL);
        assert!(!config.use_mocks);

        clear_env();
    }
}
