use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use super::detail::parse_detail_html;
use super::models::{GameDetail, Listing};
use super::{Catalog, ListingParams, MEDIA_TYPE_KEY};
use crate::error::IngestError;
use crate::util::http::{read_json, read_text, send_checked};

/// GOG storefront client.
///
/// - GET `/games/ajax/filtered?mediaType=game&...` - product listing (JSON)
/// - GET `/game/<slug>` - product page (HTML), scraped for rating and description
#[derive(Debug, Clone)]
pub struct GogCatalog {
    base_url: Url,
    http: Client,
}

impl GogCatalog {
    pub fn new(base_url: Url, http: Client) -> Self {
        Self { base_url, http }
    }

    pub fn listing_url(&self, params: &ListingParams) -> Result<Url, IngestError> {
        let mut url = self.join("games/ajax/filtered")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair(MEDIA_TYPE_KEY, "game");
            for (k, v) in params.iter() {
                query.append_pair(k, v);
            }
        }
        Ok(url)
    }

    pub fn detail_url(&self, slug: &str) -> Result<Url, IngestError> {
        self.join(&format!("game/{slug}"))
    }

    fn join(&self, path: &str) -> Result<Url, IngestError> {
        self.base_url
            .join(path)
            .map_err(|e| IngestError::parse(format!("cannot build storefront url for {path}: {e}")))
    }
}

#[async_trait]
impl Catalog for GogCatalog {
    async fn fetch_listing(&self, params: &ListingParams) -> Result<Listing, IngestError> {
        let url = self.listing_url(params)?;
        let resp = send_checked(
            self.http
                .get(url.clone())
                .header("Accept", "application/json"),
            url.as_str(),
        )
        .await?;
        let listing: Listing = read_json(resp, url.as_str()).await?;
        info!(
            products = listing.products.len(),
            page = ?listing.page,
            total_pages = ?listing.total_pages,
            "catalog: listing fetched"
        );
        Ok(listing)
    }

    async fn fetch_detail(&self, slug: &str) -> Result<GameDetail, IngestError> {
        let url = self.detail_url(slug)?;
        let resp = send_checked(self.http.get(url.clone()), url.as_str()).await?;
        let html = read_text(resp, url.as_str()).await?;
        let detail = parse_detail_html(&html)?;
        debug!(slug, rating = %detail.rating, "catalog: detail scraped");
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> GogCatalog {
        GogCatalog::new(Url::parse("https://www.gog.com").unwrap(), Client::new())
    }

    #[test]
    fn listing_url_pins_media_type_first() {
        let params = ListingParams::new()
            .with("page", "1")
            .with("sort", "popularity")
            .with("mediaType", "dlc");
        let url = catalog().listing_url(&params).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.gog.com/games/ajax/filtered?mediaType=game&page=1&sort=popularity"
        );
    }

    #[test]
    fn listing_url_encodes_values() {
        let params = ListingParams::new().with("search", "witcher 3&co");
        let url = catalog().listing_url(&params).unwrap();
        assert_eq!(url.query(), Some("mediaType=game&search=witcher+3%26co"));
    }

    #[test]
    fn detail_url_uses_raw_slug() {
        let url = catalog().detail_url("the_witcher_3_wild_hunt").unwrap();
        assert_eq!(url.as_str(), "https://www.gog.com/game/the_witcher_3_wild_hunt");
    }
}
