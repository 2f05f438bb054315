//! Teams, with their squad, transfers and season statistics

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{flag, number, opt_date, opt_number, parse_number, text, Player};
use crate::client::FootballClient;
use crate::error::Result;

/// A club or national team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTeam")]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub country: String,
    pub is_national: bool,
    pub founded: Option<u32>,
    /// Ids of the competitions the team plays in
    pub leagues: Vec<u32>,
    pub venue: Venue,
    pub coach: Coach,
    pub squad: Vec<Member>,
    pub transfers: Transfers,
    pub statistics: Statistics,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub id: Option<u32>,
    pub name: String,
    pub city: String,
    pub address: String,
    pub surface: String,
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coach {
    pub id: Option<u32>,
    pub name: String,
}

/// A squad member and their season numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: u32,
    pub name: String,
    pub age: Option<u32>,
    pub number: Option<u32>,
    pub position: String,
    pub injured: bool,
    pub minutes: u32,
    pub appearances: u32,
    pub lineups: u32,
    pub goals: u32,
    pub assists: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub substitute_in: u32,
    pub substitute_out: u32,
    pub substitute_on_bench: u32,
    /// Injury or suspension spells of this member
    pub sidelined: Vec<Sidelined>,
}

impl Member {
    /// Fetches the full player profile
    pub async fn player(&self, client: &FootballClient) -> Result<Player> {
        client.player(self.id).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sidelined {
    pub description: String,
    pub start_date: Option<NaiveDate>,
    /// `None` while the spell is ongoing
    pub end_date: Option<NaiveDate>,
}

/// A player moving in or out; `team_id`/`team_name` is the other club
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: u32,
    pub name: String,
    pub date: Option<NaiveDate>,
    pub team_id: Option<u32>,
    pub team_name: String,
}

impl Transfer {
    /// Fetches the full player profile
    pub async fn player(&self, client: &FootballClient) -> Result<Player> {
        client.player(self.id).await
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfers {
    /// Arrivals; `team_*` is the club they came from
    pub incoming: Vec<Transfer>,
    /// Departures; `team_*` is the club they went to
    pub outgoing: Vec<Transfer>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalTotals {
    pub scored: u32,
    pub conceded: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideStatistics {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals: GoalTotals,
}

/// Season statistics split by home and away games
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub home: SideStatistics,
    pub away: SideStatistics,
}

impl Statistics {
    pub fn wins(&self) -> u32 {
        self.home.wins.saturating_add(self.away.wins)
    }

    pub fn draws(&self) -> u32 {
        self.home.draws.saturating_add(self.away.draws)
    }

    pub fn losses(&self) -> u32 {
        self.home.losses.saturating_add(self.away.losses)
    }

    pub fn goals(&self) -> GoalTotals {
        GoalTotals {
            scored: self.home.goals.scored.saturating_add(self.away.goals.scored),
            conceded: self
                .home
                .goals
                .conceded
                .saturating_add(self.away.goals.conceded),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    #[serde(default, deserialize_with = "opt_number")]
    team_id: Option<u32>,
    #[serde(default, deserialize_with = "text")]
    name: String,
    #[serde(default, deserialize_with = "text")]
    country: String,
    #[serde(default, deserialize_with = "flag")]
    is_national: bool,
    #[serde(default, deserialize_with = "opt_number")]
    founded: Option<u32>,
    #[serde(default, deserialize_with = "league_ids")]
    leagues: Vec<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    venue_id: Option<u32>,
    #[serde(default, deserialize_with = "text")]
    venue_name: String,
    #[serde(default, deserialize_with = "text")]
    venue_city: String,
    #[serde(default, deserialize_with = "text")]
    venue_address: String,
    #[serde(default, deserialize_with = "text")]
    venue_surface: String,
    #[serde(default, deserialize_with = "opt_number")]
    venue_capacity: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    coach_id: Option<u32>,
    #[serde(default, deserialize_with = "text")]
    coach_name: String,
    #[serde(default)]
    squad: Vec<RawMember>,
    #[serde(default)]
    sidelined: Vec<RawSidelined>,
    #[serde(default)]
    transfers_in: Vec<RawTransfer>,
    #[serde(default)]
    transfers_out: Vec<RawTransfer>,
    #[serde(default)]
    statistics: Option<RawStatisticsField>,
    // Field names of a `Team` serialized by this crate
    #[serde(default, deserialize_with = "opt_number")]
    id: Option<u32>,
    #[serde(default)]
    venue: Option<Venue>,
    #[serde(default)]
    coach: Option<Coach>,
    #[serde(default)]
    transfers: Option<Transfers>,
}

/// Per-season rows from the API, or the home/away split this crate serializes
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawStatisticsField {
    Seasons(Vec<RawStatistics>),
    Split(Statistics),
}

impl From<RawStatisticsField> for Statistics {
    fn from(field: RawStatisticsField) -> Self {
        match field {
            RawStatisticsField::Seasons(seasons) => {
                seasons.into_iter().next().unwrap_or_default().into()
            }
            RawStatisticsField::Split(statistics) => statistics,
        }
    }
}

/// Reads league ids from the API's `"1204,1205"` or from a JSON array
fn league_ids<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u32>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s
            .split(',')
            .filter_map(|league| league.trim().parse().ok())
            .collect(),
        Some(Value::Array(items)) => items.iter().filter_map(parse_number).collect(),
        _ => Vec::new(),
    })
}

#[derive(Debug, Deserialize)]
struct RawMember {
    #[serde(default, deserialize_with = "number")]
    id: u32,
    #[serde(default, deserialize_with = "text")]
    name: String,
    #[serde(default, deserialize_with = "opt_number")]
    age: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    number: Option<u32>,
    #[serde(default, deserialize_with = "text")]
    position: String,
    #[serde(default, deserialize_with = "flag")]
    injured: bool,
    #[serde(default, deserialize_with = "number")]
    minutes: u32,
    // Spelled this way by the API
    #[serde(default, deserialize_with = "number")]
    appearences: u32,
    #[serde(default, deserialize_with = "number")]
    lineups: u32,
    #[serde(default, deserialize_with = "number")]
    goals: u32,
    #[serde(default, deserialize_with = "number")]
    assists: u32,
    #[serde(default, deserialize_with = "number")]
    yellowcards: u32,
    #[serde(default, deserialize_with = "number")]
    redcards: u32,
    #[serde(default, deserialize_with = "number")]
    substitute_in: u32,
    #[serde(default, deserialize_with = "number")]
    substitute_out: u32,
    #[serde(default, deserialize_with = "number")]
    substitutes_on_bench: u32,
    // Field names of a `Member` serialized by this crate
    #[serde(default, deserialize_with = "opt_number")]
    appearances: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    yellow_cards: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    red_cards: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    substitute_on_bench: Option<u32>,
    #[serde(default)]
    sidelined: Vec<Sidelined>,
}

#[derive(Debug, Deserialize)]
struct RawSidelined {
    #[serde(default, deserialize_with = "number")]
    id: u32,
    #[serde(default, deserialize_with = "text")]
    description: String,
    #[serde(default, deserialize_with = "opt_date")]
    startdate: Option<NaiveDate>,
    #[serde(default, deserialize_with = "opt_date")]
    enddate: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct RawTransfer {
    #[serde(default, deserialize_with = "number")]
    id: u32,
    #[serde(default, deserialize_with = "text")]
    name: String,
    #[serde(default, deserialize_with = "opt_date")]
    date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "opt_number")]
    team_id: Option<u32>,
    #[serde(default, alias = "to_team", deserialize_with = "text")]
    from_team: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawStatistics {
    #[serde(default, deserialize_with = "number")]
    wins_home: u32,
    #[serde(default, deserialize_with = "number")]
    draws_home: u32,
    #[serde(default, deserialize_with = "number")]
    losses_home: u32,
    #[serde(default, deserialize_with = "number")]
    goals_home: u32,
    #[serde(default, deserialize_with = "number")]
    goals_conceded_home: u32,
    #[serde(default, deserialize_with = "number")]
    wins_away: u32,
    #[serde(default, deserialize_with = "number")]
    draws_away: u32,
    #[serde(default, deserialize_with = "number")]
    losses_away: u32,
    #[serde(default, deserialize_with = "number")]
    goals_away: u32,
    #[serde(default, deserialize_with = "number")]
    goals_conceded_away: u32,
}

impl From<RawStatistics> for Statistics {
    fn from(st: RawStatistics) -> Self {
        Self {
            home: SideStatistics {
                wins: st.wins_home,
                draws: st.draws_home,
                losses: st.losses_home,
                goals: GoalTotals {
                    scored: st.goals_home,
                    conceded: st.goals_conceded_home,
                },
            },
            away: SideStatistics {
                wins: st.wins_away,
                draws: st.draws_away,
                losses: st.losses_away,
                goals: GoalTotals {
                    scored: st.goals_away,
                    conceded: st.goals_conceded_away,
                },
            },
        }
    }
}

impl From<RawTransfer> for Transfer {
    fn from(raw: RawTransfer) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            date: raw.date,
            team_id: raw.team_id,
            team_name: raw.from_team,
        }
    }
}

impl From<RawTeam> for Team {
    fn from(raw: RawTeam) -> Self {
        let sidelined = raw.sidelined;
        let squad = raw
            .squad
            .into_iter()
            .map(|m| Member {
                sidelined: m
                    .sidelined
                    .into_iter()
                    .chain(sidelined.iter().filter(|s| s.id == m.id).map(|s| Sidelined {
                        description: s.description.clone(),
                        start_date: s.startdate,
                        end_date: s.enddate,
                    }))
                    .collect(),
                id: m.id,
                name: m.name,
                age: m.age,
                number: m.number,
                position: m.position,
                injured: m.injured,
                minutes: m.minutes,
                appearances: m.appearances.unwrap_or(m.appearences),
                lineups: m.lineups,
                goals: m.goals,
                assists: m.assists,
                yellow_cards: m.yellow_cards.unwrap_or(m.yellowcards),
                red_cards: m.red_cards.unwrap_or(m.redcards),
                substitute_in: m.substitute_in,
                substitute_out: m.substitute_out,
                substitute_on_bench: m.substitute_on_bench.unwrap_or(m.substitutes_on_bench),
            })
            .collect();

        Self {
            id: raw.team_id.or(raw.id).unwrap_or_default(),
            name: raw.name,
            country: raw.country,
            is_national: raw.is_national,
            founded: raw.founded,
            leagues: raw.leagues,
            venue: raw.venue.unwrap_or(Venue {
                id: raw.venue_id,
                name: raw.venue_name,
                city: raw.venue_city,
                address: raw.venue_address,
                surface: raw.venue_surface,
                capacity: raw.venue_capacity,
            }),
            coach: raw.coach.unwrap_or(Coach {
                id: raw.coach_id,
                name: raw.coach_name,
            }),
            squad,
            transfers: raw.transfers.unwrap_or(Transfers {
                incoming: raw.transfers_in.into_iter().map(Transfer::from).collect(),
                outgoing: raw.transfers_out.into_iter().map(Transfer::from).collect(),
            }),
            statistics: raw.statistics.map(Statistics::from).unwrap_or_default(),
        }
    }
}
