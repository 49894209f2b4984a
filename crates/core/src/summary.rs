//! Parlay aggregation: combined odds, odds range and schedule span of a
//! set of betting events.

use crate::event::BettingEvent;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Derived view over a set of selected events. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParlaySummary {
    /// Number of events in the parlay, including those without a known start.
    pub event_count: usize,

    /// Product of all odds. `1` for an empty parlay.
    pub total_odds: Decimal,

    pub min_odds: Option<Decimal>,
    pub max_odds: Option<Decimal>,

    /// Earliest known game start.
    pub first_event_at: Option<DateTime<Utc>>,

    /// Latest known game start.
    pub last_event_at: Option<DateTime<Utc>>,
}

impl ParlaySummary {
    /// Returns true if the parlay has no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.event_count == 0
    }

    /// Potential return for a stake at the combined odds.
    #[must_use]
    pub fn potential_return(&self, stake: Decimal) -> Decimal {
        stake.saturating_mul(self.total_odds)
    }
}

impl Default for ParlaySummary {
    fn default() -> Self {
        summarize(&[])
    }
}

/// Aggregates a set of events into a [`ParlaySummary`].
///
/// Single pass, order independent. Events whose game start is unknown still
/// contribute to the odds and the count but not to the schedule span.
/// The product saturates at `Decimal::MAX` instead of overflowing.
#[must_use]
pub fn summarize(events: &[BettingEvent]) -> ParlaySummary {
    let mut total_odds = Decimal::ONE;
    let mut min_odds: Option<Decimal> = None;
    let mut max_odds: Option<Decimal> = None;
    let mut first_event_at: Option<DateTime<Utc>> = None;
    let mut last_event_at: Option<DateTime<Utc>> = None;

    for event in events {
        total_odds = total_odds.saturating_mul(event.odds);
        min_odds = Some(min_odds.map_or(event.odds, |m| m.min(event.odds)));
        max_odds = Some(max_odds.map_or(event.odds, |m| m.max(event.odds)));

        if let Some(start) = event.starts_at() {
            first_event_at = Some(first_event_at.map_or(start, |t| t.min(start)));
            last_event_at = Some(last_event_at.map_or(start, |t| t.max(start)));
        }
    }

    ParlaySummary {
        event_count: events.len(),
        total_odds,
        min_odds,
        max_odds,
        first_event_at,
        last_event_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Game;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn event_at(id: i64, odds: Decimal, start: Option<DateTime<Utc>>) -> BettingEvent {
        BettingEvent::new(id, odds, format!("market {id}")).with_game(Game {
            id: id * 10,
            home_team: "Home".to_string(),
            away_team: "Away".to_string(),
            datetime: start,
            league: None,
            sport: None,
        })
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 13, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_empty_parlay() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_odds, Decimal::ONE);
        assert_eq!(summary.min_odds, None);
        assert_eq!(summary.max_odds, None);
        assert_eq!(summary.first_event_at, None);
        assert_eq!(summary.last_event_at, None);
        assert!(summary.is_empty());
    }

    #[test]
    fn test_total_odds_is_product() {
        let events = vec![
            BettingEvent::new(1, dec!(1.5), "a"),
            BettingEvent::new(2, dec!(1.87), "b"),
            BettingEvent::new(3, dec!(2.0), "c"),
        ];

        let summary = summarize(&events);
        assert_eq!(summary.total_odds, dec!(5.61));
        assert_eq!(summary.min_odds, Some(dec!(1.5)));
        assert_eq!(summary.max_odds, Some(dec!(2.0)));
        assert_eq!(summary.event_count, 3);
    }

    #[test]
    fn test_single_event() {
        let summary = summarize(&[BettingEvent::new(1, dec!(3.25), "x")]);
        assert_eq!(summary.total_odds, dec!(3.25));
        assert_eq!(summary.min_odds, summary.max_odds);
    }

    #[test]
    fn test_date_range_skips_unknown_starts() {
        let events = vec![
            event_at(1, dec!(2.0), Some(at(21, 45))),
            event_at(2, dec!(1.5), None),
            BettingEvent::new(3, dec!(1.2), "no game"),
            event_at(4, dec!(1.1), Some(at(17, 30))),
        ];

        let summary = summarize(&events);
        assert_eq!(summary.event_count, 4);
        assert_eq!(summary.first_event_at, Some(at(17, 30)));
        assert_eq!(summary.last_event_at, Some(at(21, 45)));
        assert_eq!(summary.total_odds, dec!(3.96));
    }

    #[test]
    fn test_no_known_starts() {
        let events = vec![event_at(1, dec!(2.0), None), BettingEvent::new(2, dec!(2.0), "y")];
        let summary = summarize(&events);
        assert_eq!(summary.first_event_at, None);
        assert_eq!(summary.last_event_at, None);
        assert_eq!(summary.total_odds, dec!(4.0));
    }

    #[test]
    fn test_order_independent() {
        let mut events = vec![
            event_at(1, dec!(2.0), Some(at(18, 0))),
            event_at(2, dec!(1.4), Some(at(12, 15))),
            event_at(3, dec!(3.1), None),
            event_at(4, dec!(1.05), Some(at(23, 5))),
        ];

        let forward = summarize(&events);
        events.reverse();
        let reversed = summarize(&events);
        events.swap(0, 2);
        let shuffled = summarize(&events);

        assert_eq!(forward, reversed);
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn test_product_saturates() {
        let events: Vec<BettingEvent> = (0..200)
            .map(|i| BettingEvent::new(i, dec!(1000), "long shot"))
            .collect();

        let summary = summarize(&events);
        assert_eq!(summary.total_odds, Decimal::MAX);
    }

    #[test]
    fn test_potential_return() {
        let summary = summarize(&[
            BettingEvent::new(1, dec!(2.0), "a"),
            BettingEvent::new(2, dec!(4.0), "b"),
        ]);
        assert_eq!(summary.potential_return(dec!(10)), dec!(80.0));
    }

    #[test]
    fn test_default_is_empty_summary() {
        assert_eq!(ParlaySummary::default(), summarize(&[]));
    }
}
