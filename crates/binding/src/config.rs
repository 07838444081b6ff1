//! Binder configuration

use serde::{Deserialize, Serialize};

/// Default body limit: 32 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 << 20;

/// Settings shared by every bind performed through one [`Binder`](crate::Binder).
///
/// Embeds in application config files; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindConfig {
    /// Largest request body read, in bytes. Applies to JSON, URL-encoded and
    /// multipart bodies alike.
    pub max_body_bytes: usize,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl BindConfig {
    /// Create configuration from environment variables
    ///
    /// Reads `NEBULA_BIND_MAX_BODY_BYTES`; unset or unparsable values keep
    /// the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("NEBULA_BIND_MAX_BODY_BYTES") {
            match raw.trim().parse() {
                Ok(limit) => config.max_body_bytes = limit,
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid NEBULA_BIND_MAX_BODY_BYTES"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_limit_is_32_mib() {
        assert_eq!(BindConfig::default().max_body_bytes, 33_554_432);
    }

    #[test]
    fn missing_keys_take_defaults() {
        let config: BindConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BindConfig::default());

        let config: BindConfig = serde_json::from_str(r#"{"max_body_bytes": 1024}"#).unwrap();
        assert_eq!(config.max_body_bytes, 1024);
    }
}
