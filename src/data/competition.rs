//! Competitions (leagues and cups)

use serde::{Deserialize, Serialize};

use super::{number, text, Standing};
use crate::client::FootballClient;
use crate::error::Result;

/// A competition covered by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
    #[serde(deserialize_with = "number")]
    pub id: u32,
    #[serde(default, deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "text")]
    pub region: String,
}

impl Competition {
    /// Fetches the league table of this competition
    pub async fn standings(&self, client: &FootballClient) -> Result<Vec<Standing>> {
        client.standings(self.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_competition_from_api_json() {
        let competition: Competition = serde_json::from_value(json!({
            "id": "1204",
            "name": "Premier League",
            "region": "England"
        }))
        .unwrap();

        assert_eq!(competition.id, 1204);
        assert_eq!(competition.name, "Premier League");
        assert_eq!(competition.region, "England");
    }

    #[test]
    fn test_competition_serializes_with_numeric_id() {
        let competition = Competition {
            id: 1322,
            name: "UEFA Champions League".to_string(),
            region: "Eurocups".to_string(),
        };
        let json = serde_json::to_value(&competition).unwrap();
        assert_eq!(json["id"], 1322);
    }
}
