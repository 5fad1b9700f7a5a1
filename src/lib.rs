pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod media;
pub mod normalization;
pub mod orchestrator;
pub mod store;
pub mod taxonomy;

pub mod util {
    pub mod env;
    pub mod http;
}

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

pub use catalog::{Catalog, GogCatalog, ListingParams};
pub use config::{PopulateConfig, PopulateSettings};
pub use error::IngestError;
pub use orchestrator::{Outcome, PopulateReport, Populator};
pub use store::{ContentStore, InMemoryStore, StrapiStore};

use media::{DryRunUploader, MediaUploader, StrapiUploader};

/// Wire a [`Populator`] against the live storefront and CMS described by `config`.
///
/// With `dry_run` the storefront is still read, but records go to an
/// in-memory store and images are only logged.
pub fn build_populator(config: &PopulateConfig) -> Result<Populator> {
    let http = util::http::build_client(&config.user_agent, config.http_timeout)
        .context("failed to build HTTP client")?;

    let catalog: Arc<dyn Catalog> =
        Arc::new(GogCatalog::new(config.storefront_url.clone(), http.clone()));

    let (store, uploader): (Arc<dyn ContentStore>, Arc<dyn MediaUploader>) = if config.dry_run {
        info!("populate: dry run; CMS will not be written");
        (Arc::new(InMemoryStore::new()), Arc::new(DryRunUploader))
    } else {
        let store = StrapiStore::new(config.cms_url.clone(), http.clone())
            .with_token(config.cms_token.clone());
        let uploader = StrapiUploader::new(http, config.upload_url()?)
            .with_token(config.cms_token.clone());
        (Arc::new(store), Arc::new(uploader))
    };

    Ok(Populator::new(
        catalog,
        store,
        uploader,
        config.settings.clone(),
    ))
}

/// Run one populate pass with settings from the environment.
pub async fn populate(params: &ListingParams) -> Result<PopulateReport> {
    let config = PopulateConfig::from_env()?;
    let populator = build_populator(&config)?;
    Ok(populator.populate(params).await)
}
