pub mod rating;
pub mod slug;

use chrono::{DateTime, SecondsFormat};

/// Number of characters kept for a game's short description.
pub const SHORT_DESCRIPTION_CHARS: usize = 160;

/// Unix seconds → `YYYY-MM-DDTHH:MM:SS.sssZ`. `None` when out of range.
pub fn release_date_iso(unix_secs: i64) -> Option<String> {
    DateTime::from_timestamp(unix_secs, 0).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// First [`SHORT_DESCRIPTION_CHARS`] characters of the trimmed text.
pub fn short_description(text: &str) -> String {
    text.trim().chars().take(SHORT_DESCRIPTION_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_date_has_millis_and_zulu() {
        assert_eq!(
            release_date_iso(1_431_993_600).as_deref(),
            Some("2015-05-19T00:00:00.000Z")
        );
        assert_eq!(release_date_iso(0).as_deref(), Some("1970-01-01T00:00:00.000Z"));
        assert_eq!(release_date_iso(i64::MAX), None);
    }

    #[test]
    fn short_description_is_capped() {
        let text = "x".repeat(200);
        assert_eq!(short_description(&text).chars().count(), 160);
        assert_eq!(short_description("  short  "), "short");
    }

    #[test]
    fn short_description_counts_chars_not_bytes() {
        let text = "é".repeat(170);
        assert_eq!(short_description(&text), "é".repeat(160));
    }
}
