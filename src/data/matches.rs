//! Matches and their events

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{either, number, opt_date, opt_number, text, Competition};
use crate::client::FootballClient;
use crate::error::Result;

/// One side of a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSide {
    pub id: u32,
    pub name: String,
    /// `None` before kick-off
    pub score: Option<u32>,
    pub penalty: Option<String>,
}

/// Something that happened during a match (goal, card, substitution, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub id: u32,
    pub kind: String,
    pub minute: Option<u32>,
    pub extra_minute: Option<u32>,
    /// `localteam` or `visitorteam`
    pub team: String,
    pub player_id: Option<u32>,
    pub player_name: String,
    pub assist_id: Option<u32>,
    pub assist_name: String,
    pub result: String,
}

/// A scheduled, live or finished match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawMatch")]
pub struct Match {
    pub id: u32,
    pub comp_id: u32,
    pub date: Option<NaiveDate>,
    pub season: String,
    pub week: Option<u32>,
    pub venue: String,
    pub venue_id: Option<u32>,
    pub venue_city: String,
    pub status: String,
    pub timer: String,
    pub time: String,
    pub ht_score: String,
    pub ft_score: String,
    pub et_score: String,
    pub local: MatchSide,
    pub visitor: MatchSide,
    pub events: Vec<MatchEvent>,
}

impl Match {
    /// Fetches the competition this match is played in
    pub async fn competition(&self, client: &FootballClient) -> Result<Competition> {
        client.competition(self.comp_id).await
    }
}

#[derive(Debug, Deserialize)]
struct RawMatch {
    #[serde(default, deserialize_with = "number")]
    id: u32,
    #[serde(default, deserialize_with = "number")]
    comp_id: u32,
    #[serde(default, deserialize_with = "opt_date")]
    formatted_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "text")]
    season: String,
    #[serde(default, deserialize_with = "opt_number")]
    week: Option<u32>,
    #[serde(default, deserialize_with = "text")]
    venue: String,
    #[serde(default, deserialize_with = "opt_number")]
    venue_id: Option<u32>,
    #[serde(default, deserialize_with = "text")]
    venue_city: String,
    #[serde(default, deserialize_with = "text")]
    status: String,
    #[serde(default, deserialize_with = "text")]
    timer: String,
    #[serde(default, deserialize_with = "text")]
    time: String,
    #[serde(default, deserialize_with = "number")]
    localteam_id: u32,
    #[serde(default, deserialize_with = "text")]
    localteam_name: String,
    #[serde(default, deserialize_with = "opt_number")]
    localteam_score: Option<u32>,
    #[serde(default, deserialize_with = "number")]
    visitorteam_id: u32,
    #[serde(default, deserialize_with = "text")]
    visitorteam_name: String,
    #[serde(default, deserialize_with = "opt_number")]
    visitorteam_score: Option<u32>,
    #[serde(default, deserialize_with = "text")]
    ht_score: String,
    #[serde(default, deserialize_with = "text")]
    ft_score: String,
    #[serde(default, deserialize_with = "text")]
    et_score: String,
    #[serde(default)]
    penalty_local: Option<String>,
    #[serde(default)]
    penalty_visitor: Option<String>,
    #[serde(default)]
    events: Vec<RawEvent>,
    // Field names of a `Match` serialized by this crate
    #[serde(default, deserialize_with = "opt_date")]
    date: Option<NaiveDate>,
    #[serde(default)]
    local: Option<MatchSide>,
    #[serde(default)]
    visitor: Option<MatchSide>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default, deserialize_with = "number")]
    id: u32,
    #[serde(default, rename = "type", deserialize_with = "text")]
    event_type: String,
    #[serde(default, deserialize_with = "opt_number")]
    minute: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    extra_min: Option<u32>,
    #[serde(default, deserialize_with = "text")]
    team: String,
    #[serde(default, deserialize_with = "text")]
    player: String,
    #[serde(default, deserialize_with = "opt_number")]
    player_id: Option<u32>,
    #[serde(default, deserialize_with = "text")]
    assist: String,
    #[serde(default, deserialize_with = "opt_number")]
    assist_id: Option<u32>,
    #[serde(default, deserialize_with = "text")]
    result: String,
    // Field names of a `MatchEvent` serialized by this crate
    #[serde(default, deserialize_with = "text")]
    kind: String,
    #[serde(default, deserialize_with = "opt_number")]
    extra_minute: Option<u32>,
    #[serde(default, deserialize_with = "text")]
    player_name: String,
    #[serde(default, deserialize_with = "text")]
    assist_name: String,
}

impl From<RawEvent> for MatchEvent {
    fn from(raw: RawEvent) -> Self {
        Self {
            id: raw.id,
            kind: either(raw.event_type, raw.kind),
            minute: raw.minute,
            extra_minute: raw.extra_min.or(raw.extra_minute),
            team: raw.team,
            player_id: raw.player_id,
            player_name: either(raw.player, raw.player_name),
            assist_id: raw.assist_id,
            assist_name: either(raw.assist, raw.assist_name),
            result: raw.result,
        }
    }
}

impl From<RawMatch> for Match {
    fn from(raw: RawMatch) -> Self {
        Self {
            id: raw.id,
            comp_id: raw.comp_id,
            date: raw.formatted_date.or(raw.date),
            season: raw.season,
            week: raw.week,
            venue: raw.venue,
            venue_id: raw.venue_id,
            venue_city: raw.venue_city,
            status: raw.status,
            timer: raw.timer,
            time: raw.time,
            ht_score: raw.ht_score,
            ft_score: raw.ft_score,
            et_score: raw.et_score,
            local: raw.local.unwrap_or(MatchSide {
                id: raw.localteam_id,
                name: raw.localteam_name,
                score: raw.localteam_score,
                penalty: raw.penalty_local.filter(|p| !p.is_empty()),
            }),
            visitor: raw.visitor.unwrap_or(MatchSide {
                id: raw.visitorteam_id,
                name: raw.visitorteam_name,
                score: raw.visitorteam_score,
                penalty: raw.penalty_visitor.filter(|p| !p.is_empty()),
            }),
            events: raw.events.into_iter().map(MatchEvent::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_match_from_api_json() {
        let m: Match = serde_json::from_value(json!({
            "id": "2212953",
            "comp_id": "1204",
            "formatted_date": "11.08.2017",
            "season": "2017/2018",
            "week": "1",
            "venue": "Emirates Stadium",
            "venue_id": "1265",
            "venue_city": "London",
            "status": "FT",
            "timer": "",
            "time": "18:45",
            "localteam_id": "9002",
            "localteam_name": "Arsenal",
            "localteam_score": "4",
            "visitorteam_id": "9240",
            "visitorteam_name": "Leicester",
            "visitorteam_score": "3",
            "ht_score": "[2-2]",
            "ft_score": "[4-3]",
            "et_score": null,
            "penalty_local": null,
            "penalty_visitor": null,
            "events": [
                {
                    "id": "23359921", "type": "goal", "minute": "2", "extra_min": "",
                    "team": "localteam", "player": "A. Lacazette", "player_id": "101563",
                    "assist": "M. Elneny", "assist_id": "158297", "result": "[1-0]"
                }
            ]
        }))
        .unwrap();

        assert_eq!(m.id, 2212953);
        assert_eq!(m.comp_id, 1204);
        assert_eq!(m.date, NaiveDate::from_ymd_opt(2017, 8, 11));
        assert_eq!(m.week, Some(1));
        assert_eq!(m.local.name, "Arsenal");
        assert_eq!(m.local.score, Some(4));
        assert_eq!(m.visitor.score, Some(3));
        assert_eq!(m.et_score, "");
        assert_eq!(m.local.penalty, None);

        assert_eq!(m.events.len(), 1);
        let goal = &m.events[0];
        assert_eq!(goal.kind, "goal");
        assert_eq!(goal.minute, Some(2));
        assert_eq!(goal.extra_minute, None);
        assert_eq!(goal.player_id, Some(101563));
        assert_eq!(goal.assist_name, "M. Elneny");
    }

    #[test]
    fn test_unplayed_match_has_no_scores() {
        let m: Match = serde_json::from_value(json!({
            "id": "1",
            "comp_id": "1204",
            "localteam_score": "?",
            "visitorteam_score": ""
        }))
        .unwrap();

        assert_eq!(m.local.score, None);
        assert_eq!(m.visitor.score, None);
        assert!(m.events.is_empty());
    }

    #[test]
    fn test_match_reads_back_its_own_json() {
        let m: Match = serde_json::from_value(json!({
            "id": "2212953",
            "comp_id": "1204",
            "formatted_date": "11.08.2017",
            "week": "1",
            "localteam_id": "9002",
            "localteam_name": "Arsenal",
            "localteam_score": "4",
            "visitorteam_id": "9240",
            "visitorteam_name": "Leicester",
            "visitorteam_score": "3",
            "penalty_local": "5",
            "events": [
                {
                    "id": "23359921", "type": "goal", "minute": "90", "extra_min": "3",
                    "team": "localteam", "player": "O. Giroud", "player_id": "2",
                    "assist": "G. Xhaka", "assist_id": "3", "result": "[4-3]"
                }
            ]
        }))
        .unwrap();

        let stored = serde_json::to_value(&m).unwrap();
        let reread: Match = serde_json::from_value(stored).unwrap();

        assert_eq!(reread, m);
        assert_eq!(reread.local.penalty.as_deref(), Some("5"));
        assert_eq!(reread.events[0].kind, "goal");
        assert_eq!(reread.events[0].extra_minute, Some(3));
    }
}
