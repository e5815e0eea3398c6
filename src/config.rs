/// Environment-based configuration.

use std::str::FromStr;

const DEFAULT_VISION_API_URL: &str = "https://vision.googleapis.com";

#[derive(Clone, Debug)]
pub struct Config {
    pub vision_api_url: String,
    pub vision_api_key: Option<String>,
    pub vision_access_token: Option<String>,
    pub port: u16,
    pub vision_timeout_secs: u64,
    pub vision_max_results: u32,
    pub thumbnail_size: u32,
    pub thumbnail_quality: u8,
    pub max_upload_bytes: usize,
    /// Sessions remembered before the least recently started is evicted.
    pub session_capacity: usize,
    pub session_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vision_api_url: DEFAULT_VISION_API_URL.to_string(),
            vision_api_key: None,
            vision_access_token: None,
            port: 8000,
            vision_timeout_secs: 30,
            vision_max_results: 50,
            thumbnail_size: 128,
            thumbnail_quality: 85,
            max_upload_bytes: 20 * 1024 * 1024,
            session_capacity: 1024,
            session_ttl_secs: 3600,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; unset or unparsable values keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            vision_api_url: non_empty("VISION_API_URL").unwrap_or(defaults.vision_api_url),
            vision_api_key: non_empty("VISION_API_KEY"),
            vision_access_token: non_empty("VISION_ACCESS_TOKEN"),
            port: parse_or(&lookup, "PORT", defaults.port),
            vision_timeout_secs: parse_or(&lookup, "VISION_TIMEOUT_SECS", defaults.vision_timeout_secs),
            vision_max_results: parse_or(&lookup, "VISION_MAX_RESULTS", defaults.vision_max_results),
            thumbnail_size: parse_or(&lookup, "THUMBNAIL_SIZE", defaults.thumbnail_size).max(1),
            thumbnail_quality: parse_or(&lookup, "THUMBNAIL_QUALITY", defaults.thumbnail_quality)
                .clamp(1, 100),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            session_capacity: parse_or(&lookup, "SESSION_CAPACITY", defaults.session_capacity).max(1),
            session_ttl_secs: parse_or(&lookup, "SESSION_TTL_SECS", defaults.session_ttl_secs),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}
