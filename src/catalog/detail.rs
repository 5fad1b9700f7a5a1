use scraper::{ElementRef, Html, Selector};

use super::models::GameDetail;
use crate::error::IngestError;
use crate::normalization::rating::content_rating;
use crate::normalization::short_description;

const RATING_ICON_SELECTOR: &str = ".age-restrictions__icon use";
const DESCRIPTION_SELECTOR: &str = ".description";

/// Scrape rating and description from a product detail page.
///
/// A page without a rating icon is rated [`crate::normalization::rating::UNRATED`];
/// a page without a description block is a parse error.
pub fn parse_detail_html(html: &str) -> Result<GameDetail, IngestError> {
    let doc = Html::parse_document(html);
    let icon_selector = selector(RATING_ICON_SELECTOR)?;
    let description_selector = selector(DESCRIPTION_SELECTOR)?;

    let icon_ref = match doc.select(&icon_selector).next() {
        Some(icon) => Some(
            link_ref(icon)
                .ok_or_else(|| IngestError::parse("rating icon has no link reference"))?,
        ),
        None => None,
    };

    let description = doc
        .select(&description_selector)
        .next()
        .ok_or_else(|| IngestError::parse("detail page has no description block"))?;
    let text: String = description.text().collect();

    Ok(GameDetail {
        rating: content_rating(icon_ref),
        short_description: short_description(&text),
        description: description.inner_html(),
    })
}

fn selector(css: &str) -> Result<Selector, IngestError> {
    Selector::parse(css).map_err(|e| IngestError::parse(format!("bad selector {css:?}: {e}")))
}

// Inside <svg> the parser files `xlink:href` under the xlink namespace with
// local name `href`; in plain HTML the attribute keeps its literal name.
fn link_ref<'a>(el: ElementRef<'a>) -> Option<&'a str> {
    el.value()
        .attrs()
        .find(|(name, _)| *name == "xlink:href" || *name == "href")
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(icon: &str, description: &str) -> String {
        format!(
            r#"<html><body>
            <div class="details">{icon}</div>
            {description}
            </body></html>"#
        )
    }

    #[test]
    fn reads_svg_icon_reference() {
        let html = page(
            r##"<div class="age-restrictions__icon"><svg><use xlink:href="#age_restrictions_icon_18"></use></svg></div>"##,
            r#"<div class="description"><p>Hunt monsters.</p></div>"#,
        );
        let detail = parse_detail_html(&html).unwrap();
        assert_eq!(detail.rating, "agerestrictionsicon18");
        assert_eq!(detail.short_description, "Hunt monsters.");
        assert_eq!(detail.description, "<p>Hunt monsters.</p>");
    }

    #[test]
    fn missing_icon_is_free() {
        let html = page("", r#"<div class="description">Plain</div>"#);
        let detail = parse_detail_html(&html).unwrap();
        assert_eq!(detail.rating, "FREE");
    }

    #[test]
    fn short_description_is_first_160_chars_of_trimmed_text() {
        let body = "a".repeat(200);
        let html = page("", &format!(r#"<div class="description">  <b>{body}</b>  </div>"#));
        let detail = parse_detail_html(&html).unwrap();
        assert_eq!(detail.short_description.len(), 160);
        assert!(detail.description.starts_with("  <b>"));
    }

    #[test]
    fn missing_description_is_a_parse_error() {
        let html = page("", "<div class=\"other\">nothing</div>");
        let err = parse_detail_html(&html).unwrap_err();
        assert!(matches!(err, IngestError::Parse(_)));
    }

    #[test]
    fn icon_without_reference_is_a_parse_error() {
        let html = page(
            r#"<div class="age-restrictions__icon"><svg><use></use></svg></div>"#,
            r#"<div class="description">x</div>"#,
        );
        assert!(matches!(
            parse_detail_html(&html),
            Err(IngestError::Parse(_))
        ));
    }
}
