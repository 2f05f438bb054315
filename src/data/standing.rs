//! League table rows

use serde::{Deserialize, Serialize};

use super::{number, opt_number, text, Competition, Team};
use crate::client::FootballClient;
use crate::error::Result;

/// Results on one side (home or away) of a standing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingRecord {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub games_played: u32,
    pub goals_scored: u32,
    pub goals_accepted: u32,
}

/// One team's row in a competition's table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawStanding")]
pub struct Standing {
    pub comp_id: u32,
    pub season: String,
    pub round: String,
    pub stage_id: u32,
    pub comp_group: Option<String>,
    pub country: String,
    pub team_id: u32,
    pub team_name: String,
    pub status: String,
    pub recent_form: String,
    pub position: u32,
    pub points: u32,
    pub description: Option<String>,
    pub home: StandingRecord,
    pub away: StandingRecord,
}

impl Standing {
    pub fn wins(&self) -> u32 {
        self.home.wins.saturating_add(self.away.wins)
    }

    pub fn draws(&self) -> u32 {
        self.home.draws.saturating_add(self.away.draws)
    }

    pub fn losses(&self) -> u32 {
        self.home.losses.saturating_add(self.away.losses)
    }

    pub fn games_played(&self) -> u32 {
        self.home.games_played.saturating_add(self.away.games_played)
    }

    pub fn goals_scored(&self) -> u32 {
        self.home.goals_scored.saturating_add(self.away.goals_scored)
    }

    pub fn goals_accepted(&self) -> u32 {
        self.home.goals_accepted.saturating_add(self.away.goals_accepted)
    }

    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_scored()) - i64::from(self.goals_accepted())
    }

    /// Fetches the competition this row belongs to
    pub async fn competition(&self, client: &FootballClient) -> Result<Competition> {
        client.competition(self.comp_id).await
    }

    /// Fetches the team of this row
    pub async fn team(&self, client: &FootballClient) -> Result<Team> {
        client.team(self.team_id).await
    }
}

/// Standing as sent by the API, with home/away columns flattened
#[derive(Debug, Deserialize)]
struct RawStanding {
    #[serde(default, deserialize_with = "number")]
    comp_id: u32,
    #[serde(default, deserialize_with = "text")]
    season: String,
    #[serde(default, deserialize_with = "text")]
    round: String,
    #[serde(default, deserialize_with = "number")]
    stage_id: u32,
    #[serde(default)]
    comp_group: Option<String>,
    #[serde(default, deserialize_with = "text")]
    country: String,
    #[serde(default, deserialize_with = "number")]
    team_id: u32,
    #[serde(default, deserialize_with = "text")]
    team_name: String,
    #[serde(default, deserialize_with = "text")]
    status: String,
    #[serde(default, deserialize_with = "text")]
    recent_form: String,
    #[serde(default, deserialize_with = "number")]
    position: u32,
    #[serde(default, deserialize_with = "number")]
    points: u32,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    home_w: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    home_d: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    home_l: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    home_gp: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    home_gs: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    home_ga: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    away_w: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    away_d: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    away_l: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    away_gp: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    away_gs: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    away_ga: Option<u32>,
    /// Present when re-reading a `Standing` serialized by this crate
    #[serde(default)]
    home: Option<StandingRecord>,
    #[serde(default)]
    away: Option<StandingRecord>,
}

impl From<RawStanding> for Standing {
    fn from(raw: RawStanding) -> Self {
        let home = raw.home.unwrap_or(StandingRecord {
            wins: raw.home_w.unwrap_or_default(),
            draws: raw.home_d.unwrap_or_default(),
            losses: raw.home_l.unwrap_or_default(),
            games_played: raw.home_gp.unwrap_or_default(),
            goals_scored: raw.home_gs.unwrap_or_default(),
            goals_accepted: raw.home_ga.unwrap_or_default(),
        });
        let away = raw.away.unwrap_or(StandingRecord {
            wins: raw.away_w.unwrap_or_default(),
            draws: raw.away_d.unwrap_or_default(),
            losses: raw.away_l.unwrap_or_default(),
            games_played: raw.away_gp.unwrap_or_default(),
            goals_scored: raw.away_gs.unwrap_or_default(),
            goals_accepted: raw.away_ga.unwrap_or_default(),
        });

        Self {
            comp_id: raw.comp_id,
            season: raw.season,
            round: raw.round,
            stage_id: raw.stage_id,
            comp_group: raw.comp_group.filter(|g| !g.is_empty()),
            country: raw.country,
            team_id: raw.team_id,
            team_name: raw.team_name,
            status: raw.status,
            recent_form: raw.recent_form,
            position: raw.position,
            points: raw.points,
            description: raw.description.filter(|d| !d.is_empty()),
            home,
            away,
        }
    }
}
