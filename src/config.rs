//! Client configuration
//!
//! Everything has a sensible default; only the API key is required in
//! practice. Expiration policy lives here rather than in the cache, which only
//! knows how to honor whatever TTL it is handed.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::ResourceType;

/// Base URL of the football-api.com v2 API
pub const DEFAULT_BASE_URL: &str = "http://api.football-api.com/2.0/";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "FOOTBALL_API_KEY";

/// Environment variable overriding the cache directory
pub const CACHE_DIR_ENV: &str = "FOOTBALL_API_CACHE_DIR";

const HOUR: Duration = Duration::from_secs(3600);

/// How long each resource type stays fresh once fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub competition: Duration,
    pub standing: Duration,
    pub team: Duration,
    pub player: Duration,
    /// Live match data changes quickly, so this one is short
    pub matches: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            competition: 24 * HOUR,
            standing: 2 * HOUR,
            team: 2 * HOUR,
            player: 2 * HOUR,
            matches: Duration::from_millis(8000),
        }
    }
}

impl TtlPolicy {
    pub fn ttl(&self, resource: ResourceType) -> Duration {
        match resource {
            ResourceType::Competition => self.competition,
            ResourceType::Standing => self.standing,
            ResourceType::Team => self.team,
            ResourceType::Player => self.player,
            ResourceType::Match => self.matches,
        }
    }
}

/// Configuration for [`crate::FootballClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, including the trailing slash
    pub base_url: String,
    /// Key sent as the `Authorization` query parameter
    pub api_key: String,
    /// Where the cache is persisted; `None` uses the XDG cache directory
    pub cache_dir: Option<PathBuf>,
    pub ttl: TtlPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            cache_dir: None,
            ttl: TtlPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Reads the API key and optional cache directory from the environment
    ///
    /// Returns `None` if `FOOTBALL_API_KEY` is not set.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var(API_KEY_ENV).ok()?;
        let mut config = Self::new(api_key);
        config.cache_dir = env::var_os(CACHE_DIR_ENV).map(PathBuf::from);
        Some(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    pub fn with_ttl(mut self, ttl: TtlPolicy) -> Self {
        self.ttl = ttl;
        self
    }
}
