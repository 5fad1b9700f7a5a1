//! Content store seam: the CMS collections ingestion reads from and writes to.

pub mod memory;
pub mod strapi;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use memory::InMemoryStore;
pub use strapi::StrapiStore;

use crate::catalog::GameDetail;
use crate::error::IngestError;

/// Named records used as relations on a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaxonomyKind {
    Developer,
    Publisher,
    Platform,
    Category,
}

impl TaxonomyKind {
    pub const ALL: [TaxonomyKind; 4] = [
        TaxonomyKind::Developer,
        TaxonomyKind::Publisher,
        TaxonomyKind::Platform,
        TaxonomyKind::Category,
    ];
}

/// Every collection the ingestion touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Taxonomy(TaxonomyKind),
    Game,
}

impl EntityKind {
    /// Model name, as used for the upload `ref` field.
    pub fn model(self) -> &'static str {
        match self {
            EntityKind::Taxonomy(TaxonomyKind::Developer) => "developer",
            EntityKind::Taxonomy(TaxonomyKind::Publisher) => "publisher",
            EntityKind::Taxonomy(TaxonomyKind::Platform) => "platform",
            EntityKind::Taxonomy(TaxonomyKind::Category) => "category",
            EntityKind::Game => "game",
        }
    }

    /// REST collection path.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Taxonomy(TaxonomyKind::Developer) => "developers",
            EntityKind::Taxonomy(TaxonomyKind::Publisher) => "publishers",
            EntityKind::Taxonomy(TaxonomyKind::Platform) => "platforms",
            EntityKind::Taxonomy(TaxonomyKind::Category) => "categories",
            EntityKind::Game => "games",
        }
    }
}

impl From<TaxonomyKind> for EntityKind {
    fn from(kind: TaxonomyKind) -> Self {
        EntityKind::Taxonomy(kind)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model())
    }
}

impl fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(EntityKind::from(*self).model())
    }
}

/// CMS record id; numeric on SQL backends, string on document stores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{n}"),
            RecordId::Str(s) => f.write_str(s),
        }
    }
}

/// The part of a stored record ingestion cares about.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Reference to an existing taxonomy record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub kind: TaxonomyKind,
    pub id: RecordId,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTaxonomy<'a> {
    pub name: &'a str,
    pub slug: String,
}

/// Fields of a game at creation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewGame {
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(flatten)]
    pub detail: Option<GameDetail>,
    pub categories: Vec<RecordId>,
    pub platforms: Vec<RecordId>,
    pub developers: Vec<RecordId>,
    pub publisher: Option<RecordId>,
}

/// Minimal CRUD surface of the CMS: exact-name lookup and create.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn find_by_name(&self, kind: EntityKind, name: &str) -> Result<Vec<Record>, IngestError>;

    async fn create(&self, kind: EntityKind, fields: Value) -> Result<Record, IngestError>;
}

/// Serialize a typed payload for [`ContentStore::create`].
pub fn to_fields<T: Serialize>(payload: &T) -> Result<Value, IngestError> {
    serde_json::to_value(payload).map_err(|e| IngestError::parse(format!("unserializable record: {e}")))
}
