use crate::domain::model::{ChatMessage, LastSeenState, Release};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where releases come from.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// `Ok(None)` when the repository has no release to offer.
    async fn latest_release(&self, repo: &str, include_prereleases: bool)
        -> Result<Option<Release>>;
}

/// Delivers a rendered chat message.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &ChatMessage) -> Result<()>;
}

/// Produces a short freeform summary of a release.
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn provider_name(&self) -> &str;

    async fn summarize(&self, product: &str, release: &Release) -> Result<Option<String>>;
}

/// Persistence for the last announced tag per feed.
pub trait StateStore: Send + Sync {
    fn load(&self) -> impl std::future::Future<Output = Result<LastSeenState>> + Send;
    fn save(&self, state: &LastSeenState)
        -> impl std::future::Future<Output = Result<()>> + Send;
}
