//! Cache keys: a closed set of resource types plus a per-type resource id

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The categories of remote resources the cache knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Competition,
    Standing,
    Team,
    Player,
    Match,
}

impl ResourceType {
    /// All resource types, in manifest order
    pub const ALL: [ResourceType; 5] = [
        ResourceType::Competition,
        ResourceType::Standing,
        ResourceType::Team,
        ResourceType::Player,
        ResourceType::Match,
    ];

    /// Directory name used for this type's payload files
    pub fn dir_name(self) -> &'static str {
        match self {
            ResourceType::Competition => "competitions",
            ResourceType::Standing => "standings",
            ResourceType::Team => "teams",
            ResourceType::Player => "players",
            ResourceType::Match => "matches",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceType::Competition => "competition",
            ResourceType::Standing => "standing",
            ResourceType::Team => "team",
            ResourceType::Player => "player",
            ResourceType::Match => "match",
        };
        f.write_str(name)
    }
}

/// Identifies one resource within a type: a numeric id, or the `all`
/// sentinel used by collection requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceId {
    Id(u32),
    All,
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Id(id) => write!(f, "{}", id),
            ResourceId::All => f.write_str("all"),
        }
    }
}

/// Returned when a string is neither a decimal id nor `all`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid resource id: '{0}'")]
pub struct InvalidResourceId(pub String);

impl FromStr for ResourceId {
    type Err = InvalidResourceId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(ResourceId::All);
        }
        s.parse::<u32>()
            .map(ResourceId::Id)
            .map_err(|_| InvalidResourceId(s.to_string()))
    }
}

impl From<u32> for ResourceId {
    fn from(id: u32) -> Self {
        ResourceId::Id(id)
    }
}

// Ids are stored as their string form so they can be used as JSON object keys.
impl Serialize for ResourceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// One cacheable unit: (resource type, resource id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub resource: ResourceType,
    pub id: ResourceId,
}

impl CacheKey {
    pub fn new(resource: ResourceType, id: u32) -> Self {
        Self {
            resource,
            id: ResourceId::Id(id),
        }
    }

    /// Key for a collection-style request of the given type
    pub fn all(resource: ResourceType) -> Self {
        Self {
            resource,
            id: ResourceId::All,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource, self.id)
    }
}
