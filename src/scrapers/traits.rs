use crate::error::LoadError;
use async_trait::async_trait;

/// Fetches the markup behind a url.
/// Implemented over HTTP by `HttpLoader`; tests substitute in-memory pages.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Load the raw markup of `url`, which is always scheme-qualified
    async fn load(&self, url: &str) -> Result<String, LoadError>;
}
