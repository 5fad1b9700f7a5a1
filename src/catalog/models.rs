use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of `GET /games/ajax/filtered`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// One storefront product as listed. Only the fields ingestion needs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub global_release_date: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub genres: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub supported_operating_systems: Vec<String>,
    #[serde(default, deserialize_with = "null_as_blank")]
    pub developer: String,
    #[serde(default, deserialize_with = "null_as_blank")]
    pub publisher: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub gallery: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Price {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: Option<f64>,
}

impl Product {
    pub fn price_amount(&self) -> Option<f64> {
        self.price.as_ref().and_then(|p| p.amount)
    }
}

/// Fields scraped from a product's detail page. Serialized names are the
/// game attributes they fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameDetail {
    pub rating: String,
    pub short_description: String,
    pub description: String,
}

fn value_as_f64(v: &Value) -> Option<f64> {
    if let Some(n) = v.as_f64() {
        return Some(n);
    }
    v.as_str().and_then(|s| s.trim().parse::<f64>().ok())
}

fn value_as_i64(v: &Value) -> Option<i64> {
    if let Some(n) = v.as_i64() {
        return Some(n);
    }
    if let Some(n) = v.as_f64() {
        return Some(n as i64);
    }
    v.as_str().and_then(|s| s.trim().parse::<i64>().ok())
}

fn lenient_f64<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_as_f64(&Value::deserialize(de)?))
}

fn lenient_i64<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_as_i64(&Value::deserialize(de)?))
}

fn null_as_empty<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(de)?.unwrap_or_default())
}

fn null_as_blank<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(de)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_storefront_listing() {
        let body = json!({
            "products": [{
                "title": "The Witcher 3: Wild Hunt",
                "slug": "the_witcher_3_wild_hunt",
                "price": { "amount": "29.99", "currency": "USD" },
                "globalReleaseDate": 1431993600,
                "genres": ["Role-playing", "Adventure"],
                "supportedOperatingSystems": ["windows"],
                "developer": "CD PROJEKT RED",
                "publisher": "CD PROJEKT RED",
                "image": "//images-1.gog-statics.com/abc",
                "gallery": ["//images-2.gog-statics.com/g1"],
                "rating": 47
            }],
            "page": 1,
            "totalPages": 42
        });
        let listing: Listing = serde_json::from_value(body).unwrap();
        assert_eq!(listing.total_pages, Some(42));
        let p = &listing.products[0];
        assert_eq!(p.price_amount(), Some(29.99));
        assert_eq!(p.global_release_date, Some(1_431_993_600));
        assert_eq!(p.genres, vec!["Role-playing", "Adventure"]);
        assert_eq!(p.gallery.len(), 1);
    }

    #[test]
    fn tolerates_nulls_and_missing_fields() {
        let body = json!({
            "title": "Bare",
            "slug": "bare",
            "price": { "amount": null },
            "globalReleaseDate": null,
            "genres": null,
            "publisher": null
        });
        let p: Product = serde_json::from_value(body).unwrap();
        assert_eq!(p.price_amount(), None);
        assert_eq!(p.global_release_date, None);
        assert!(p.genres.is_empty());
        assert!(p.supported_operating_systems.is_empty());
        assert!(p.image.is_none());
        assert_eq!(p.developer, "");
        assert_eq!(p.publisher, "");
    }

    #[test]
    fn release_date_may_be_a_string() {
        let p: Product = serde_json::from_value(json!({
            "title": "T",
            "slug": "t",
            "globalReleaseDate": "1431993600"
        }))
        .unwrap();
        assert_eq!(p.global_release_date, Some(1_431_993_600));
    }
}
