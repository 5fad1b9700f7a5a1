use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

use crate::util::env::{env_flag, env_opt, env_or, env_parse};

pub const DEFAULT_STOREFRONT_URL: &str = "https://www.gog.com";
pub const DEFAULT_USER_AGENT: &str = "catalog-populate/0.1";

/// Runtime settings for a populate run, read from the environment (and `.env`).
///
/// Env:
/// - `STOREFRONT_BASE_URL` (default `https://www.gog.com`)
/// - `CMS_HOST` / `CMS_PORT` (default `localhost:1337`), `CMS_API_TOKEN`
/// - `HTTP_TIMEOUT_SECS` (30), `HTTP_USER_AGENT`
/// - `POPULATE_ITEM_DELAY_MS` (2000), `POPULATE_GALLERY_LIMIT` (5)
/// - `POPULATE_DRY_RUN` (false)
#[derive(Debug, Clone)]
pub struct PopulateConfig {
    pub storefront_url: Url,
    pub cms_url: Url,
    pub cms_token: Option<String>,
    pub http_timeout: Duration,
    pub user_agent: String,
    pub settings: PopulateSettings,
    pub dry_run: bool,
}

/// Knobs consumed by the orchestrator itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulateSettings {
    /// Pause after each created game, before its flow completes.
    pub item_delay: Duration,
    /// Maximum gallery images uploaded per game.
    pub gallery_limit: usize,
}

impl Default for PopulateSettings {
    fn default() -> Self {
        Self {
            item_delay: Duration::from_millis(2000),
            gallery_limit: 5,
        }
    }
}

impl PopulateConfig {
    pub fn from_env() -> Result<Self> {
        let storefront_raw = env_or("STOREFRONT_BASE_URL", DEFAULT_STOREFRONT_URL);
        // Trailing slash so relative joins keep any path prefix.
        let storefront_url = Url::parse(&format!("{}/", storefront_raw.trim_end_matches('/')))
            .with_context(|| format!("invalid STOREFRONT_BASE_URL: {storefront_raw}"))?;

        let cms_host = env_or("CMS_HOST", "localhost");
        let cms_port: u16 = env_parse("CMS_PORT", 1337);
        let cms_url = cms_base_url(&cms_host, cms_port)?;

        let defaults = PopulateSettings::default();
        let settings = PopulateSettings {
            item_delay: Duration::from_millis(env_parse(
                "POPULATE_ITEM_DELAY_MS",
                defaults.item_delay.as_millis() as u64,
            )),
            gallery_limit: env_parse("POPULATE_GALLERY_LIMIT", defaults.gallery_limit),
        };

        Ok(Self {
            storefront_url,
            cms_url,
            cms_token: env_opt("CMS_API_TOKEN"),
            http_timeout: Duration::from_secs(env_parse("HTTP_TIMEOUT_SECS", 30u64)),
            user_agent: env_or("HTTP_USER_AGENT", DEFAULT_USER_AGENT),
            settings,
            dry_run: env_flag("POPULATE_DRY_RUN", false),
        })
    }

    /// Multipart upload endpoint of the CMS.
    pub fn upload_url(&self) -> Result<Url> {
        self.cms_url
            .join("upload")
            .context("failed to build CMS upload url")
    }
}

/// `http://<host>:<port>/`, the way the CMS addresses itself.
pub fn cms_base_url(host: &str, port: u16) -> Result<Url> {
    let raw = format!("http://{host}:{port}/");
    Url::parse(&raw).with_context(|| format!("invalid CMS address {raw}"))
}
