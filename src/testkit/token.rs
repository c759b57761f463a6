//! Fixed [`TokenProvider`] implementations.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::port::TokenProvider;

/// Hands out the same token every time, or refuses every time.
#[derive(Debug, Clone)]
pub struct StaticToken {
    token: Option<String>,
    calls: Arc<AtomicU32>,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// A provider whose credentials are always rejected.
    pub fn unauthorized() -> Self {
        Self {
            token: None,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// How many tokens were requested.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn bearer_token(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.token
            .clone()
            .ok_or_else(|| Error::Unauthorized("invalid API key".into()))
    }
}
