use std::sync::OnceLock;

use regex::Regex;

/// Rating stored when a detail page carries no age-restriction icon.
pub const UNRATED: &str = "FREE";

/// Turn the icon's link reference into a rating code.
///
/// Underscores go first, then every character outside `[A-Za-z0-9_-]`.
/// `#age_restrictions_icon_18` therefore becomes `agerestrictionsicon18`.
pub fn rating_from_icon_ref(icon_ref: &str) -> String {
    match icon_patterns() {
        Some((underscores, non_word)) => {
            let joined = underscores.replace_all(icon_ref, "");
            non_word.replace_all(&joined, "").into_owned()
        }
        None => String::new(),
    }
}

// `\w` is spelled out as ASCII so accented letters are dropped too.
fn icon_patterns() -> Option<&'static (Regex, Regex)> {
    static PATTERNS: OnceLock<Option<(Regex, Regex)>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            let underscores = Regex::new("_").ok()?;
            let non_word = Regex::new(r"[^A-Za-z0-9_-]+").ok()?;
            Some((underscores, non_word))
        })
        .as_ref()
}

/// Content rating for a page: the icon code when present, [`UNRATED`] otherwise.
pub fn content_rating(icon_ref: Option<&str>) -> String {
    icon_ref
        .map(rating_from_icon_ref)
        .unwrap_or_else(|| UNRATED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_icon_is_free() {
        assert_eq!(content_rating(None), "FREE");
    }

    #[test]
    fn strips_underscores_then_non_word_chars() {
        assert_eq!(
            rating_from_icon_ref("age_restrictions_icon_18"),
            "agerestrictionsicon18"
        );
        assert_eq!(rating_from_icon_ref("#ageRating_18_icon"), "ageRating18icon");
        assert_eq!(rating_from_icon_ref("#pegi-16"), "pegi-16");
    }

    #[test]
    fn drops_non_ascii_word_chars() {
        assert_eq!(rating_from_icon_ref("#üsk 12"), "sk12");
        assert_eq!(content_rating(Some("")), "");
    }

    #[test]
    fn removes_whole_runs_and_keeps_hyphens() {
        assert_eq!(rating_from_icon_ref("#usk!!--12 / 16"), "usk--1216");
        assert_eq!(rating_from_icon_ref("__"), "");
        assert_eq!(content_rating(Some("#esrb_M")), "esrbM");
    }
}
