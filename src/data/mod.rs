//! Core data models for football-api.com resources
//!
//! The API encodes almost every number as a string and answers with either a
//! single object or an array. The helpers here smooth both over so the
//! domain types can be plain Rust values.

pub mod competition;
pub mod matches;
pub mod player;
pub mod standing;
pub mod team;

pub use competition::Competition;
pub use matches::{Match, MatchEvent, MatchSide};
pub use player::Player;
pub use standing::{Standing, StandingRecord};
pub use team::{
    Coach, GoalTotals, Member, SideStatistics, Sidelined, Statistics, Team, Transfer, Transfers,
    Venue,
};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// A payload that is either one object or a list of them
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Parses a number that may arrive as a JSON number or a string
///
/// Leading digits are enough, so `"180 cm"` reads as 180.
fn parse_number<T: FromStr>(value: &Value) -> Option<T> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => {
            let s = s.trim();
            let end = s
                .char_indices()
                .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
                .map_or(s.len(), |(i, _)| i);
            s[..end].parse().ok()
        }
        _ => None,
    }
}

/// Deserializes a lenient number; absent, empty or unparseable values are `None`
pub(crate) fn opt_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_number))
}

/// Deserializes a lenient number, reading `""`, `"-"` and garbage as zero
pub(crate) fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    Ok(opt_number(deserializer)?.unwrap_or_default())
}

/// Deserializes the API's `"True"` / `"False"` flags
pub(crate) fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// Deserializes a string that may be `null`
pub(crate) fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserializes a date in any format [`parse_date`] knows; anything else is `None`
pub(crate) fn opt_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => parse_date(&s),
        _ => None,
    })
}

/// Parses the API's day-first dates, or the ISO dates this crate serializes
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    ["%d.%m.%Y", "%d/%m/%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
}

/// Prefers the API's spelling of a text field, falling back to this crate's
pub(crate) fn either(api: String, own: String) -> String {
    if api.is_empty() {
        own
    } else {
        api
    }
}

/// Formats a date the way the API expects it in query parameters
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}
