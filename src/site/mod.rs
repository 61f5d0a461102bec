pub mod client;

use crate::core::error::FetchError;
use async_trait::async_trait;

/// Source of raw listing pages
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_listing(&self) -> Result<String, FetchError>;
}
