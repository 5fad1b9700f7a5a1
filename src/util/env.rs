//! Environment helpers: `.env` loading and typed getters.
//! Every getter calls `init_env()` so binaries and tests need no setup step.
use std::str::FromStr;
use std::sync::Once;
use tracing::warn;

static INIT: Once = Once::new();

/// Load `.env` once. Falls back to the crate root when the working
/// directory has none. Safe to call many times.
pub fn init_env() {
    INIT.call_once(|| {
        if dotenv::dotenv().is_ok() {
            return;
        }
        let candidate = format!("{}/.env", env!("CARGO_MANIFEST_DIR"));
        let _ = dotenv::from_filename(candidate);
    });
}

/// Optional env var (None if unset or blank).
pub fn env_opt(key: &str) -> Option<String> {
    init_env();
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

/// String env var with a default.
pub fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

/// Parsed value with default fallback; unparsable values are logged and ignored.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    let Some(raw) = env_opt(key) else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(v) => v,
        Err(_) => {
            warn!(target = "env", key, value = %raw, "ignoring unparsable env value");
            default
        }
    }
}

/// Boolean flag; accepts 1/true/on/yes (case-insensitive) as true.
pub fn env_flag(key: &str, default: bool) -> bool {
    match env_opt(key) {
        Some(raw) => matches!(
            raw.to_ascii_lowercase().as_str(),
            "1" | "true" | "on" | "yes"
        ),
        None => default,
    }
}
