pub mod detail;
pub mod gog;
pub mod models;

use async_trait::async_trait;

pub use gog::GogCatalog;
pub use models::{GameDetail, Listing, Product};

use crate::error::IngestError;

/// Filter key the listing request always pins to `game`.
pub const MEDIA_TYPE_KEY: &str = "mediaType";

/// Listing filters as key/value pairs, in caller order (e.g. `page=2`,
/// `sort=popularity`). `mediaType` is managed by the client and ignored here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingParams {
    pairs: Vec<(String, String)>,
}

impl ListingParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if key == MEDIA_TYPE_KEY {
            return;
        }
        self.pairs.push((key, value.into()));
    }

    /// Parse `key=value`; a bare `key` maps to an empty value.
    pub fn push_raw(&mut self, raw: &str) {
        match raw.split_once('=') {
            Some((k, v)) => self.push(k.trim(), v.trim()),
            None => self.push(raw.trim(), ""),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Source of storefront products and their detail pages.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn fetch_listing(&self, params: &ListingParams) -> Result<Listing, IngestError>;

    async fn fetch_detail(&self, slug: &str) -> Result<GameDetail, IngestError>;
}
