//! Canonical test configurations.
//!
//! Millisecond delays everywhere so session tests never wait on the real
//! reconnect schedule.

use crate::infrastructure::config::stream::{ReconnectConfig, StreamConfig};

pub const TEST_WS_URL: &str = "ws://scripted.test/streaming/";

/// Stream config with a 1 ms backoff table and fast send polling.
pub fn fast_stream() -> StreamConfig {
    StreamConfig {
        ws_url: TEST_WS_URL.into(),
        auth_timeout_ms: 200,
        send_retry_interval_ms: 10,
        send_max_retries: 5,
        reconnect: ReconnectConfig {
            max_attempts: 5,
            backoff_ms: vec![1, 1, 1, 1, 1],
        },
        ..StreamConfig::default()
    }
}
