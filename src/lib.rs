//! Scoreline: a football-api.com client library
//!
//! [`FootballClient`] exposes competitions, standings, teams, players and
//! matches as typed values. Every request goes through a [`ResponseCache`]
//! that collapses concurrent requests for the same resource into one network
//! call, keeps responses fresh for a per-resource TTL, and persists them to
//! disk so a restarted process picks up where it left off.

pub mod cache;
pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod fetch;

pub use cache::{CacheKey, ResourceId, ResourceType, ResponseCache};
pub use client::FootballClient;
pub use config::{ClientConfig, TtlPolicy};
pub use error::{Error, Result};
pub use fetch::{FetchError, HttpFetcher, JsonFetcher};
