//! Error kinds surfaced by the catalog client, content store and uploader.

use thiserror::Error;

/// Longest response body kept on a [`IngestError::Remote`] for logging.
pub const MAX_LOGGED_BODY: usize = 2000;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Transport-level failure (DNS, connect, timeout, body read).
    #[error("network error requesting {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx status, or a 2xx whose body could not be decoded (`status` is
    /// `None` in that case).
    #[error("remote error from {url} (status {status:?}): {body}")]
    Remote {
        url: String,
        status: Option<u16>,
        body: String,
    },

    /// Detail page scrape failure.
    #[error("parse error: {0}")]
    Parse(String),
}

impl IngestError {
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    pub fn remote(url: impl Into<String>, status: Option<u16>, body: String) -> Self {
        Self::Remote {
            url: url.into(),
            status,
            body: truncate_for_log(body, MAX_LOGGED_BODY),
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

pub(crate) fn truncate_for_log(mut s: String, max_len: usize) -> String {
    if s.len() > max_len {
        let mut cut = max_len;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
        s.push('…');
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_body_is_truncated() {
        let err = IngestError::remote("http://x", Some(500), "a".repeat(MAX_LOGGED_BODY + 10));
        match err {
            IngestError::Remote { body, status, .. } => {
                assert_eq!(status, Some(500));
                assert!(body.ends_with('…'));
                assert_eq!(body.chars().count(), MAX_LOGGED_BODY + 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let s = "ééé".to_string();
        assert_eq!(truncate_for_log(s, 3), "é…");
    }
}
