#![allow(clippy::format_push_string)]
#![allow(clippy::uninlined_format_args)]

use crate::selection::WorkingSet;
use crate::summary::ParlaySummary;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

pub struct SummaryFormatter;

impl SummaryFormatter {
    /// Renders a parlay summary block.
    #[must_use]
    pub fn format(summary: &ParlaySummary) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                       PARLAY SUMMARY                          \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output.push_str("Odds\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("Events:                {}\n", summary.event_count));
        output.push_str(&format!(
            "Total Odds:            {}\n",
            Self::odds(summary.total_odds)
        ));
        match (summary.min_odds, summary.max_odds) {
            (Some(min), Some(max)) => output.push_str(&format!(
                "Min/Max:               {} - {}\n",
                Self::odds(min),
                Self::odds(max)
            )),
            _ => output.push_str("Min/Max:               N/A\n"),
        }
        output.push('\n');

        output.push_str("Schedule\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!(
            "First Event:           {}\n",
            Self::when(summary.first_event_at)
        ));
        output.push_str(&format!(
            "Last Event:            {}\n",
            Self::when(summary.last_event_at)
        ));

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");

        if summary.is_empty() {
            output.push_str("\n⚠️  The parlay is empty. Run `parlay generate` to pick events.\n\n");
        }

        output
    }

    /// Renders the event table followed by the summary block.
    #[must_use]
    pub fn format_working_set(working_set: &WorkingSet) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\n{:<4} {:>8} {:>7}  {:<17} {:<32} {}\n",
            "", "ID", "Odds", "Start", "Game", "Market"
        ));
        output.push_str(&format!("{}\n", "-".repeat(100)));

        for event in working_set.events() {
            let lock = if working_set.is_locked(event.id) { "🔒" } else { "" };
            let game = event
                .game
                .as_ref()
                .map(crate::event::Game::matchup)
                .unwrap_or_default();
            output.push_str(&format!(
                "{:<4} {:>8} {:>7}  {:<17} {:<32} {}\n",
                lock,
                event.id,
                Self::odds(event.odds),
                Self::when(event.starts_at()),
                game,
                event.event
            ));
        }

        output.push_str(&Self::format(&working_set.summary()));
        output
    }

    /// Odds rounded to two decimals.
    fn odds(value: Decimal) -> String {
        format!(
            "{:.2}",
            value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        )
    }

    fn when(at: Option<DateTime<Utc>>) -> String {
        at.map_or_else(|| "N/A".to_string(), |t| t.format("%b %d, %H:%M").to_string())
    }
}
