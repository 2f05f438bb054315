//! Errors surfaced by [`crate::FootballClient`]

use thiserror::Error;

use crate::cache::{CacheKey, StoreError};
use crate::fetch::FetchError;

/// Errors that can occur when requesting football data
#[derive(Debug, Error)]
pub enum Error {
    /// The remote request failed (non-200 status, bad body, or no response)
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The payload does not have the shape of the requested resource
    #[error("Unexpected payload for {key}: {source}")]
    Decode {
        key: CacheKey,
        #[source]
        source: serde_json::Error,
    },

    /// The API answered with an empty list for a single resource
    #[error("No data returned for {0}")]
    NotFound(CacheKey),

    /// The cache store could not be started
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No cache directory was configured and none could be derived from the environment
    #[error("Could not determine a cache directory")]
    NoCacheDir,
}

impl Error {
    /// HTTP status of the failed request, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Fetch(e) => e.status(),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
