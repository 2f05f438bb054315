//! Player profiles

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{either, number, opt_date, opt_number, text, Team};
use crate::client::FootballClient;
use crate::error::Result;

/// A player's profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPlayer")]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<u32>,
    /// Height in centimetres
    pub height: Option<u32>,
    /// Weight in kilograms
    pub weight: Option<u32>,
    pub birth_date: Option<NaiveDate>,
    pub birth_place: String,
    pub birth_country: String,
    pub position: String,
    pub team_id: Option<u32>,
    pub team_name: String,
    pub nationality: String,
}

impl Player {
    /// Fetches the team the player currently plays for
    ///
    /// Returns `None` when the profile has no team id.
    pub async fn team(&self, client: &FootballClient) -> Result<Option<Team>> {
        match self.team_id {
            Some(id) => client.team(id).await.map(Some),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPlayer {
    #[serde(default, deserialize_with = "number")]
    id: u32,
    #[serde(default, deserialize_with = "text")]
    name: String,
    #[serde(default, deserialize_with = "text")]
    firstname: String,
    #[serde(default, deserialize_with = "text")]
    lastname: String,
    #[serde(default, deserialize_with = "opt_number")]
    age: Option<u32>,
    // "180 cm" / "75 kg"; the unit suffix is dropped
    #[serde(default, deserialize_with = "opt_number")]
    height: Option<u32>,
    #[serde(default, deserialize_with = "opt_number")]
    weight: Option<u32>,
    #[serde(default, deserialize_with = "opt_date")]
    birthdate: Option<NaiveDate>,
    #[serde(default, deserialize_with = "text")]
    birthplace: String,
    #[serde(default, deserialize_with = "text")]
    birthcountry: String,
    #[serde(default, deserialize_with = "text")]
    position: String,
    #[serde(default, deserialize_with = "opt_number")]
    teamid: Option<u32>,
    #[serde(default, deserialize_with = "text")]
    team: String,
    #[serde(default, deserialize_with = "text")]
    nationality: String,
    // Field names of a `Player` serialized by this crate
    #[serde(default, deserialize_with = "text")]
    first_name: String,
    #[serde(default, deserialize_with = "text")]
    last_name: String,
    #[serde(default, deserialize_with = "opt_date")]
    birth_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "text")]
    birth_place: String,
    #[serde(default, deserialize_with = "text")]
    birth_country: String,
    #[serde(default, deserialize_with = "opt_number")]
    team_id: Option<u32>,
    #[serde(default, deserialize_with = "text")]
    team_name: String,
}

impl From<RawPlayer> for Player {
    fn from(raw: RawPlayer) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            first_name: either(raw.firstname, raw.first_name),
            last_name: either(raw.lastname, raw.last_name),
            age: raw.age,
            height: raw.height,
            weight: raw.weight,
            birth_date: raw.birthdate.or(raw.birth_date),
            birth_place: either(raw.birthplace, raw.birth_place),
            birth_country: either(raw.birthcountry, raw.birth_country),
            position: raw.position,
            team_id: raw.teamid.or(raw.team_id),
            team_name: either(raw.team, raw.team_name),
            nationality: raw.nationality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_player_from_api_json() {
        let player: Player = serde_json::from_value(json!({
            "id": "13051",
            "common_name": "P. Cech",
            "name": "Petr Cech",
            "firstname": "Petr",
            "lastname": "Cech",
            "team": "Arsenal",
            "teamid": "9002",
            "nationality": "Czech Republic",
            "birthdate": "20/05/1982",
            "age": "35",
            "birthcountry": "Czech Republic",
            "birthplace": "Plzen",
            "position": "Goalkeeper",
            "height": "196 cm",
            "weight": "90 kg"
        }))
        .unwrap();

        assert_eq!(player.id, 13051);
        assert_eq!(player.first_name, "Petr");
        assert_eq!(player.height, Some(196));
        assert_eq!(player.weight, Some(90));
        assert_eq!(player.birth_date, NaiveDate::from_ymd_opt(1982, 5, 20));
        assert_eq!(player.team_id, Some(9002));
        assert_eq!(player.team_name, "Arsenal");
    }

    #[test]
    fn test_player_without_measurements() {
        let player: Player = serde_json::from_value(json!({
            "id": "1",
            "height": null,
            "weight": "",
            "birthdate": ""
        }))
        .unwrap();

        assert_eq!(player.height, None);
        assert_eq!(player.weight, None);
        assert_eq!(player.birth_date, None);
        assert_eq!(player.team_id, None);
    }

    #[test]
    fn test_player_reads_back_its_own_json() {
        let player: Player = serde_json::from_value(json!({
            "id": "13051",
            "name": "Petr Cech",
            "firstname": "Petr",
            "lastname": "Cech",
            "team": "Arsenal",
            "teamid": "9002",
            "birthdate": "20/05/1982",
            "birthplace": "Plzen",
            "birthcountry": "Czech Republic",
            "height": "196 cm"
        }))
        .unwrap();

        let stored = serde_json::to_value(&player).unwrap();
        let reread: Player = serde_json::from_value(stored).unwrap();

        assert_eq!(reread, player);
        assert_eq!(reread.team_id, Some(9002));
        assert_eq!(reread.birth_date, NaiveDate::from_ymd_opt(1982, 5, 20));
    }
}
