//! Ingestion run: listing → taxonomy → games → images.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::catalog::{Catalog, GameDetail, ListingParams, Product};
use crate::config::PopulateSettings;
use crate::error::IngestError;
use crate::media::{ImageUpload, MediaField, MediaUploader};
use crate::normalization::release_date_iso;
use crate::normalization::slug::game_slug;
use crate::store::{to_fields, ContentStore, EntityKind, NewGame, RecordId, TaxonomyKind};
use crate::taxonomy::TaxonomyResolver;

/// Summary of one populate run. Failures below the top level are counted,
/// not raised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PopulateReport {
    pub listed: usize,
    pub taxonomy_created: usize,
    pub games_created: usize,
    pub games_skipped: usize,
    pub games_failed: usize,
    pub enrichment_missing: usize,
    pub images_uploaded: usize,
    pub images_failed: usize,
    /// Set when the run stopped early (listing or taxonomy failure).
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Partial,
    Failed,
}

impl PopulateReport {
    pub fn outcome(&self) -> Outcome {
        if self.error.is_some() {
            Outcome::Failed
        } else if self.games_failed > 0 || self.images_failed > 0 || self.enrichment_missing > 0 {
            Outcome::Partial
        } else {
            Outcome::Success
        }
    }

    fn absorb(&mut self, outcome: ProductOutcome) {
        match outcome {
            ProductOutcome::Skipped => self.games_skipped += 1,
            ProductOutcome::Failed => self.games_failed += 1,
            ProductOutcome::Created {
                enriched,
                images_uploaded,
                images_failed,
            } => {
                self.games_created += 1;
                if !enriched {
                    self.enrichment_missing += 1;
                }
                self.images_uploaded += images_uploaded;
                self.images_failed += images_failed;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProductOutcome {
    Skipped,
    Failed,
    Created {
        enriched: bool,
        images_uploaded: usize,
        images_failed: usize,
    },
}

/// Relation ids for a new game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameRelations {
    pub categories: Vec<RecordId>,
    pub platforms: Vec<RecordId>,
    pub developers: Vec<RecordId>,
    pub publisher: Option<RecordId>,
}

/// Creation payload for a listed product.
pub fn build_game(product: &Product, relations: GameRelations, detail: Option<GameDetail>) -> NewGame {
    NewGame {
        name: product.title.clone(),
        slug: game_slug(&product.slug),
        price: product.price_amount(),
        release_date: product.global_release_date.and_then(release_date_iso),
        detail,
        categories: relations.categories,
        platforms: relations.platforms,
        developers: relations.developers,
        publisher: relations.publisher,
    }
}

/// Drives a populate run against injected catalog, store and uploader.
pub struct Populator {
    catalog: Arc<dyn Catalog>,
    store: Arc<dyn ContentStore>,
    uploader: Arc<dyn MediaUploader>,
    settings: PopulateSettings,
}

impl Populator {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        store: Arc<dyn ContentStore>,
        uploader: Arc<dyn MediaUploader>,
        settings: PopulateSettings,
    ) -> Self {
        Self {
            catalog,
            store,
            uploader,
            settings,
        }
    }

    /// Ingest one listing. Never fails: errors end up logged and in the report.
    pub async fn populate(&self, params: &ListingParams) -> PopulateReport {
        let started = Instant::now();
        let mut report = PopulateReport::default();

        if let Err(e) = self.run(params, &mut report).await {
            error!(error = %e, "populate: run aborted");
            report.error = Some(e.to_string());
        }

        info!(
            outcome = ?report.outcome(),
            listed = report.listed,
            taxonomy_created = report.taxonomy_created,
            games_created = report.games_created,
            games_skipped = report.games_skipped,
            games_failed = report.games_failed,
            images_uploaded = report.images_uploaded,
            images_failed = report.images_failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "populate: finished"
        );
        report
    }

    async fn run(&self, params: &ListingParams, report: &mut PopulateReport) -> Result<(), IngestError> {
        let listing = self.catalog.fetch_listing(params).await?;
        report.listed = listing.products.len();

        let resolver = TaxonomyResolver::new(self.store.clone());
        report.taxonomy_created = resolver.ensure_all(&listing.products).await?;

        // Same-title products would race each other past the existence check.
        let mut titles = HashSet::new();
        let mut unique = Vec::with_capacity(listing.products.len());
        for product in &listing.products {
            if titles.insert(product.title.as_str()) {
                unique.push(product);
            } else {
                info!(title = %product.title, "populate: duplicate title in listing; skipping");
                report.games_skipped += 1;
            }
        }

        let outcomes = join_all(
            unique
                .into_iter()
                .map(|product| self.ingest_product(&resolver, product)),
        )
        .await;
        for outcome in outcomes {
            report.absorb(outcome);
        }
        Ok(())
    }

    async fn ingest_product(&self, resolver: &TaxonomyResolver, product: &Product) -> ProductOutcome {
        match self.create_game(resolver, product).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(title = %product.title, error = %e, "populate: game creation failed");
                ProductOutcome::Failed
            }
        }
    }

    async fn create_game(
        &self,
        resolver: &TaxonomyResolver,
        product: &Product,
    ) -> Result<ProductOutcome, IngestError> {
        let existing = self.store.find_by_name(EntityKind::Game, &product.title).await?;
        if !existing.is_empty() {
            return Ok(ProductOutcome::Skipped);
        }

        info!(title = %product.title, "populate: creating game");
        let relations = self.relations(resolver, product).await?;
        let detail = match self.catalog.fetch_detail(&product.slug).await {
            Ok(detail) => Some(detail),
            Err(e) => {
                warn!(slug = %product.slug, error = %e, "populate: no detail enrichment");
                None
            }
        };
        let enriched = detail.is_some();

        let game = build_game(product, relations, detail);
        let slug = game.slug.clone();
        let record = self.store.create(EntityKind::Game, to_fields(&game)?).await?;

        let (images_uploaded, images_failed) = self.upload_images(product, record.id, &slug).await;

        if !self.settings.item_delay.is_zero() {
            tokio::time::sleep(self.settings.item_delay).await;
        }

        Ok(ProductOutcome::Created {
            enriched,
            images_uploaded,
            images_failed,
        })
    }

    async fn relations(
        &self,
        resolver: &TaxonomyResolver,
        product: &Product,
    ) -> Result<GameRelations, IngestError> {
        let categories = resolve_many(resolver, &product.genres, TaxonomyKind::Category).await?;
        let platforms = resolve_many(
            resolver,
            &product.supported_operating_systems,
            TaxonomyKind::Platform,
        )
        .await?;
        let developers = resolve_many(
            resolver,
            std::slice::from_ref(&product.developer),
            TaxonomyKind::Developer,
        )
        .await?;
        let publisher = resolve_many(
            resolver,
            std::slice::from_ref(&product.publisher),
            TaxonomyKind::Publisher,
        )
        .await?
        .into_iter()
        .next();

        Ok(GameRelations {
            categories,
            platforms,
            developers,
            publisher,
        })
    }

    /// Cover first, then up to `gallery_limit` gallery images concurrently.
    /// Returns (uploaded, failed).
    async fn upload_images(&self, product: &Product, game_id: RecordId, slug: &str) -> (usize, usize) {
        let mut uploads = Vec::new();
        if let Some(cover) = product.image.as_deref().filter(|s| !s.trim().is_empty()) {
            uploads.push(ImageUpload::for_game(cover, game_id.clone(), slug, MediaField::Cover));
        }
        let cover_count = uploads.len();
        uploads.extend(
            product
                .gallery
                .iter()
                .take(self.settings.gallery_limit)
                .map(|image| ImageUpload::for_game(image, game_id.clone(), slug, MediaField::Gallery)),
        );

        let mut results = Vec::with_capacity(uploads.len());
        for cover in &uploads[..cover_count] {
            results.push(self.upload_one(cover).await);
        }
        results.extend(join_all(uploads[cover_count..].iter().map(|u| self.upload_one(u))).await);

        let uploaded = results.iter().filter(|ok| **ok).count();
        (uploaded, results.len() - uploaded)
    }

    async fn upload_one(&self, upload: &ImageUpload) -> bool {
        match self.uploader.upload(upload).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    field = upload.field.as_str(),
                    file = %upload.filename,
                    error = %e,
                    "populate: image upload failed"
                );
                false
            }
        }
    }
}

async fn resolve_many(
    resolver: &TaxonomyResolver,
    names: &[String],
    kind: TaxonomyKind,
) -> Result<Vec<RecordId>, IngestError> {
    let names: Vec<&String> = names.iter().filter(|n| !n.trim().is_empty()).collect();
    let found = join_all(names.iter().map(|name| resolver.resolve(name, kind))).await;

    let mut ids = Vec::with_capacity(names.len());
    for (name, res) in names.into_iter().zip(found) {
        match res? {
            Some(entity) => ids.push(entity.id),
            None => warn!(%kind, name = %name, "populate: relation missing; leaving it out"),
        }
    }
    Ok(ids)
}
