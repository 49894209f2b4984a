//! Betting event and game models.
//!
//! Odds are decimal odds (`2.50` pays 2.5x the stake) and use
//! `rust_decimal::Decimal` so that parlay products stay exact.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Backend identifier of a betting event.
pub type EventId = i64;

/// A sport as exposed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sport {
    pub id: i64,
    pub name: String,
}

/// A league within a sport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub id: i64,
    #[serde(default)]
    pub sport_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub country_code: Option<String>,
}

/// A scheduled game a betting event refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,

    /// Home team name.
    pub home_team: String,

    /// Away team name.
    pub away_team: String,

    /// Kick-off time. Missing or unparsable upstream values become `None`.
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub datetime: Option<DateTime<Utc>>,

    #[serde(default)]
    pub league: Option<League>,

    #[serde(default)]
    pub sport: Option<Sport>,
}

impl Game {
    /// Returns a "Home vs Away" label.
    #[must_use]
    pub fn matchup(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }
}

/// A single selectable bet: one market on one game at fixed odds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BettingEvent {
    pub id: EventId,

    /// Decimal odds, `>= 1.0` by convention.
    pub odds: Decimal,

    /// Market description (e.g. "Over 2.5 goals").
    pub event: String,

    #[serde(default)]
    pub game: Option<Game>,

    /// Optional category tag.
    #[serde(default)]
    pub category: Option<String>,
}

impl BettingEvent {
    /// Creates an event without game data.
    pub fn new(id: EventId, odds: Decimal, event: impl Into<String>) -> Self {
        Self {
            id,
            odds,
            event: event.into(),
            game: None,
            category: None,
        }
    }

    /// Attaches game data.
    #[must_use]
    pub fn with_game(mut self, game: Game) -> Self {
        self.game = Some(game);
        self
    }

    /// Sets the category tag.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Scheduled start of the underlying game, if known.
    #[must_use]
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        self.game.as_ref().and_then(|g| g.datetime)
    }
}

/// Parses a backend timestamp.
///
/// Accepts RFC 3339 and naive ISO 8601 (interpreted as UTC), which is what the
/// backend emits for timezone-less columns.
#[must_use]
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

pub fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_datetime))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn game(datetime: Option<DateTime<Utc>>) -> Game {
        Game {
            id: 7,
            home_team: "Arsenal".to_string(),
            away_team: "Chelsea".to_string(),
            datetime,
            league: None,
            sport: None,
        }
    }

    #[test]
    fn test_starts_at_without_game() {
        let event = BettingEvent::new(1, dec!(1.85), "Home win");
        assert_eq!(event.starts_at(), None);
    }

    #[test]
    fn test_starts_at_with_game() {
        let kickoff = Utc.with_ymd_and_hms(2025, 10, 13, 17, 30, 0).unwrap();
        let event = BettingEvent::new(1, dec!(1.85), "Home win").with_game(game(Some(kickoff)));
        assert_eq!(event.starts_at(), Some(kickoff));
        assert_eq!(event.game.unwrap().matchup(), "Arsenal vs Chelsea");
    }

    #[test]
    fn test_deserialize_backend_payload() {
        let json = serde_json::json!({
            "id": 42,
            "odds": 2.5,
            "event": "BTTS",
            "game": {
                "id": 3,
                "home_team": "Ajax",
                "away_team": "PSV",
                "datetime": "2025-10-13T19:45:00Z",
                "league": { "id": 9, "sport_id": 1, "name": "Eredivisie" }
            }
        });

        let event: BettingEvent = serde_json::from_value(json).unwrap();
        assert_eq!(event.id, 42);
        assert_eq!(event.odds, dec!(2.5));
        assert!(event.category.is_none());
        let game = event.game.unwrap();
        assert_eq!(game.league.unwrap().name, "Eredivisie");
        assert!(game.datetime.is_some());
    }

    #[test]
    fn test_parse_naive_datetime_as_utc() {
        let parsed = parse_datetime("2025-10-13T19:45:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 10, 13, 19, 45, 0).unwrap());
    }

    #[test]
    fn test_unparsable_game_datetime_becomes_none() {
        let json = serde_json::json!({
            "id": 1,
            "odds": 1.5,
            "event": "Draw",
            "game": { "id": 2, "home_team": "A", "away_team": "B", "datetime": "soon" }
        });
        let event: BettingEvent = serde_json::from_value(json).unwrap();
        assert!(event.game.is_some());
        assert_eq!(event.starts_at(), None);
    }

    #[test]
    fn test_deserialize_event_without_game() {
        let json = serde_json::json!({ "id": 1, "odds": 1.5, "event": "Draw" });
        let event: BettingEvent = serde_json::from_value(json).unwrap();
        assert!(event.game.is_none());
    }
}
