use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{ContentStore, EntityKind, Record};
use crate::error::IngestError;
use crate::util::http::{read_json, send_checked};

/// Strapi REST content API.
///
/// - GET `/<collection>?name=<name>` - exact-name filter, returns an array
/// - POST `/<collection>` - JSON body, returns the created record
#[derive(Debug, Clone)]
pub struct StrapiStore {
    base_url: Url,
    http: Client,
    token: Option<String>,
}

impl StrapiStore {
    pub fn new(base_url: Url, http: Client) -> Self {
        Self {
            base_url,
            http,
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn collection_url(&self, kind: EntityKind) -> Result<Url, IngestError> {
        self.base_url.join(kind.collection()).map_err(|e| {
            IngestError::parse(format!("cannot build CMS url for {}: {e}", kind.collection()))
        })
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.token.as_deref() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl ContentStore for StrapiStore {
    async fn find_by_name(&self, kind: EntityKind, name: &str) -> Result<Vec<Record>, IngestError> {
        let mut url = self.collection_url(kind)?;
        url.query_pairs_mut().append_pair("name", name);
        let req = self.authorize(self.http.get(url.clone()));
        let resp = send_checked(req, url.as_str()).await?;
        let found: Vec<Record> = read_json(resp, url.as_str()).await?;
        debug!(%kind, name, hits = found.len(), "cms: lookup");
        Ok(found)
    }

    async fn create(&self, kind: EntityKind, fields: Value) -> Result<Record, IngestError> {
        let url = self.collection_url(kind)?;
        let req = self.authorize(self.http.post(url.clone()).json(&fields));
        let resp = send_checked(req, url.as_str()).await?;
        let record: Record = read_json(resp, url.as_str()).await?;
        debug!(%kind, id = %record.id, "cms: created");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TaxonomyKind;

    #[test]
    fn collection_urls_hang_off_the_cms_root() {
        let store = StrapiStore::new(Url::parse("http://localhost:1337/").unwrap(), Client::new());
        assert_eq!(
            store
                .collection_url(TaxonomyKind::Publisher.into())
                .unwrap()
                .as_str(),
            "http://localhost:1337/publishers"
        );
        assert_eq!(
            store.collection_url(EntityKind::Game).unwrap().as_str(),
            "http://localhost:1337/games"
        );
    }

    #[test]
    fn blank_tokens_are_dropped() {
        let store = StrapiStore::new(Url::parse("http://localhost:1337/").unwrap(), Client::new())
            .with_token(Some("  ".into()));
        assert!(store.token.is_none());
    }
}
