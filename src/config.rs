//! Configuration for the mirror transport.
//!
//! # Example
//!
//! ```
//! use pathmirror::TransportConfig;
//!
//! // Minimal config (uses defaults)
//! let config = TransportConfig::default();
//! assert_eq!(config.max_frame_bytes, 16 * 1024);
//!
//! // Full config
//! let config = TransportConfig {
//!     max_frame_bytes: 8 * 1024,
//!     keepalive_interval_ms: 30_000,
//!     ..Default::default()
//! };
//! ```

use std::time::Duration;

use serde::Deserialize;

/// Configuration for a [`FramedChannel`](crate::FramedChannel) session.
///
/// All fields have defaults matching the wire protocol's expectations;
/// lowering `max_frame_bytes` below what the server sends is safe (it only
/// affects outbound splitting), raising it past the transport's own frame
/// cap is not.
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// Hard per-frame byte cap for outbound messages (default: 16 KiB)
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    /// Idle interval after which a keepalive frame is sent (default: 45 s)
    #[serde(default = "default_keepalive_interval_ms")]
    pub keepalive_interval_ms: u64,

    /// Health-store key for the previous-failure flag
    #[serde(default = "default_health_key")]
    pub health_key: String,
}

fn default_max_frame_bytes() -> usize {
    16 * 1024
}
fn default_keepalive_interval_ms() -> u64 {
    45_000
}
fn default_health_key() -> String {
    crate::transport::health::PREVIOUS_FAILURE_KEY.to_string()
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_frame_bytes: default_max_frame_bytes(),
            keepalive_interval_ms: default_keepalive_interval_ms(),
            health_key: default_health_key(),
        }
    }
}

impl TransportConfig {
    /// Keepalive interval as a [`Duration`].
    #[must_use]
    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_millis(self.keepalive_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_wire_protocol() {
        let config = TransportConfig::default();
        assert_eq!(config.max_frame_bytes, 16_384);
        assert_eq!(config.keepalive_interval(), Duration::from_secs(45));
    }

    #[test]
    fn test_deserialize_with_partial_fields() {
        let config: TransportConfig =
            serde_json::from_str(r#"{"keepalive_interval_ms": 1000}"#).unwrap();
        assert_eq!(config.keepalive_interval_ms, 1000);
        assert_eq!(config.max_frame_bytes, 16_384);
    }
}
