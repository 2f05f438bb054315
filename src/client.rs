//! football-api.com client
//!
//! Each accessor only builds a URL, picks a TTL and a cache key, and maps the
//! cached JSON onto a domain type; request deduplication, expiry and
//! persistence all live in [`ResponseCache`].

use chrono::{Duration, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::cache::{CacheBackend, CacheKey, DiskBackend, ResourceType, ResponseCache};
use crate::config::ClientConfig;
use crate::data::{format_date, Competition, Match, OneOrMany, Player, Standing, Team};
use crate::error::{Error, Result};
use crate::fetch::{HttpFetcher, JsonFetcher};

/// Days before today included in [`FootballClient::matches`]
const MATCHES_DAYS_BACK: i64 = 2;

/// Days after today included in [`FootballClient::matches`]
const MATCHES_DAYS_AHEAD: i64 = 7;

/// Client for the football-api.com v2 API
///
/// Cloning is cheap and clones share one cache. Constructors must be called
/// from within a tokio runtime, which runs the cache's store worker.
#[derive(Debug, Clone)]
pub struct FootballClient {
    config: Arc<ClientConfig>,
    cache: ResponseCache,
}

impl FootballClient {
    /// Creates a client with default settings, caching under the XDG cache directory
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(api_key))
    }

    /// Creates a client over HTTP, persisting to `config.cache_dir` (or the XDG default)
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let backend = match &config.cache_dir {
            Some(dir) => DiskBackend::with_dir(dir),
            None => DiskBackend::new().ok_or(Error::NoCacheDir)?,
        };
        Self::with_parts(config, HttpFetcher::new(), backend)
    }

    /// Creates a client with a custom transport and cache backend
    pub fn with_parts<F, B>(config: ClientConfig, fetcher: F, backend: B) -> Result<Self>
    where
        F: JsonFetcher,
        B: CacheBackend,
    {
        Ok(Self {
            config: Arc::new(config),
            cache: ResponseCache::new(fetcher, backend)?,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Fetches one competition
    pub async fn competition(&self, id: u32) -> Result<Competition> {
        let key = CacheKey::new(ResourceType::Competition, id);
        self.get_one(key, &self.url(&format!("competitions/{}", id), &[]))
            .await
    }

    /// Fetches every competition the API key has access to
    pub async fn competitions(&self) -> Result<Vec<Competition>> {
        let key = CacheKey::all(ResourceType::Competition);
        self.get_many(key, &self.url("competitions/", &[])).await
    }

    /// Fetches the league table of a competition
    pub async fn standings(&self, comp_id: u32) -> Result<Vec<Standing>> {
        let key = CacheKey::new(ResourceType::Standing, comp_id);
        self.get_many(key, &self.url(&format!("standings/{}", comp_id), &[]))
            .await
    }

    /// Fetches one team, with squad, transfers and statistics
    pub async fn team(&self, id: u32) -> Result<Team> {
        let key = CacheKey::new(ResourceType::Team, id);
        self.get_one(key, &self.url(&format!("team/{}", id), &[])).await
    }

    /// Fetches one player profile
    pub async fn player(&self, id: u32) -> Result<Player> {
        let key = CacheKey::new(ResourceType::Player, id);
        self.get_one(key, &self.url(&format!("player/{}", id), &[]))
            .await
    }

    /// Fetches matches from two days ago through the coming week (UTC)
    pub async fn matches(&self) -> Result<Vec<Match>> {
        let key = CacheKey::all(ResourceType::Match);
        let url = matches_url(self, Utc::now().date_naive());
        self.get_many(key, &url).await
    }

    /// Builds `{base}{path}?Authorization={key}` plus any extra query pairs
    fn url(&self, path: &str, query: &[(&str, String)]) -> String {
        let mut url = format!(
            "{}{}?Authorization={}",
            self.config.base_url, path, self.config.api_key
        );
        for (name, value) in query {
            url.push('&');
            url.push_str(name);
            url.push('=');
            url.push_str(value);
        }
        url
    }

    async fn get_many<T: DeserializeOwned>(&self, key: CacheKey, url: &str) -> Result<Vec<T>> {
        let ttl = self.config.ttl.ttl(key.resource);
        let payload = self.cache.fetch(key, url, ttl).await?;
        let items: OneOrMany<T> =
            serde_json::from_value(payload).map_err(|source| Error::Decode { key, source })?;
        Ok(items.into_vec())
    }

    async fn get_one<T: DeserializeOwned>(&self, key: CacheKey, url: &str) -> Result<T> {
        self.get_many(key, url)
            .await?
            .into_iter()
            .next()
            .ok_or(Error::NotFound(key))
    }
}

fn matches_url(client: &FootballClient, today: NaiveDate) -> String {
    let from = today - Duration::days(MATCHES_DAYS_BACK);
    let to = today + Duration::days(MATCHES_DAYS_AHEAD);
    client.url(
        "matches",
        &[("from_date", format_date(from)), ("to_date", format_date(to))],
    )
}
