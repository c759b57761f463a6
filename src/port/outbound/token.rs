use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// Source of bearer tokens for the streaming handshake.
///
/// Implementations refresh expired tokens themselves and return
/// [`Error::Unauthorized`](crate::error::Error::Unauthorized) when the
/// credentials are rejected.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn bearer_token(&self) -> Result<String>;
}

#[async_trait]
impl<T: TokenProvider + ?Sized> TokenProvider for Arc<T> {
    async fn bearer_token(&self) -> Result<String> {
        (**self).bearer_token().await
    }
}
