//! Find-or-create for developer, publisher, platform and category records.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::join_all;
use itertools::Itertools;
use tracing::{debug, info};

use crate::catalog::Product;
use crate::error::IngestError;
use crate::normalization::slug::slugify;
use crate::store::{to_fields, ContentStore, EntityRef, NewTaxonomy, RecordId, TaxonomyKind};

type Key = (TaxonomyKind, String);

/// Resolves taxonomy names to record ids, creating missing records.
///
/// Ensures of the same (kind, name) run one at a time, so concurrent callers
/// never both observe "absent" and create twice. Ids are cached for the
/// resolver's lifetime; records are never deleted underneath it.
pub struct TaxonomyResolver {
    store: Arc<dyn ContentStore>,
    gates: Mutex<HashMap<Key, Arc<tokio::sync::Mutex<()>>>>,
    known: Mutex<HashMap<Key, RecordId>>,
}

impl TaxonomyResolver {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            gates: Mutex::new(HashMap::new()),
            known: Mutex::new(HashMap::new()),
        }
    }

    /// Create `name` under `kind` unless it exists. Returns whether it was created.
    pub async fn ensure(&self, name: &str, kind: TaxonomyKind) -> Result<bool, IngestError> {
        let key = (kind, name.to_string());
        let gate = self.gate(&key);
        let _held = gate.lock().await;

        if self.cached(&key).is_some() {
            return Ok(false);
        }
        if let Some(id) = self.lookup(name, kind).await? {
            self.remember(key, id);
            return Ok(false);
        }

        let fields = to_fields(&NewTaxonomy {
            name,
            slug: slugify(name),
        })?;
        let record = self.store.create(kind.into(), fields).await?;
        info!(%kind, name, id = %record.id, "taxonomy: created");
        self.remember(key, record.id);
        Ok(true)
    }

    /// Look `name` up without creating it.
    pub async fn resolve(
        &self,
        name: &str,
        kind: TaxonomyKind,
    ) -> Result<Option<EntityRef>, IngestError> {
        let key = (kind, name.to_string());
        if let Some(id) = self.cached(&key) {
            return Ok(Some(EntityRef { kind, id }));
        }
        let Some(id) = self.lookup(name, kind).await? else {
            return Ok(None);
        };
        self.remember(key, id.clone());
        Ok(Some(EntityRef { kind, id }))
    }

    /// Ensure every distinct taxonomy value of `products`, all in parallel.
    /// Waits for every ensure; returns the number created or the first error.
    pub async fn ensure_all(&self, products: &[Product]) -> Result<usize, IngestError> {
        let wanted = distinct_names(products);
        debug!(distinct = wanted.len(), "taxonomy: ensuring listing values");
        let results = join_all(
            wanted
                .iter()
                .map(|(kind, name)| self.ensure(name, *kind)),
        )
        .await;

        let mut created = 0;
        for res in results {
            if res? {
                created += 1;
            }
        }
        Ok(created)
    }

    async fn lookup(&self, name: &str, kind: TaxonomyKind) -> Result<Option<RecordId>, IngestError> {
        let found = self.store.find_by_name(kind.into(), name).await?;
        Ok(found.into_iter().next().map(|r| r.id))
    }

    fn gate(&self, key: &Key) -> Arc<tokio::sync::Mutex<()>> {
        let mut gates = self.gates.lock().unwrap_or_else(|p| p.into_inner());
        gates.entry(key.clone()).or_default().clone()
    }

    fn cached(&self, key: &Key) -> Option<RecordId> {
        let known = self.known.lock().unwrap_or_else(|p| p.into_inner());
        known.get(key).cloned()
    }

    fn remember(&self, key: Key, id: RecordId) {
        let mut known = self.known.lock().unwrap_or_else(|p| p.into_inner());
        known.insert(key, id);
    }
}

/// Distinct (kind, name) pairs across a listing: developers, publishers,
/// platforms, then categories, each in first-seen order. Blank names are skipped.
pub fn distinct_names(products: &[Product]) -> Vec<(TaxonomyKind, String)> {
    let developers = products
        .iter()
        .map(|p| (TaxonomyKind::Developer, p.developer.as_str()));
    let publishers = products
        .iter()
        .map(|p| (TaxonomyKind::Publisher, p.publisher.as_str()));
    let platforms = products.iter().flat_map(|p| {
        p.supported_operating_systems
            .iter()
            .map(|os| (TaxonomyKind::Platform, os.as_str()))
    });
    let categories = products.iter().flat_map(|p| {
        p.genres
            .iter()
            .map(|g| (TaxonomyKind::Category, g.as_str()))
    });

    developers
        .chain(publishers)
        .chain(platforms)
        .chain(categories)
        .filter(|(_, name)| !name.trim().is_empty())
        .unique()
        .map(|(kind, name)| (kind, name.to_string()))
        .collect()
}
