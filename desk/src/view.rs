//! Text rendering of the conversion table.

use std::fmt::Write;

use ratedesk_common::CurrencyCode;
use ratedesk_fx::{ConversionEngine, RowView};

pub const TITLE: &str = "NBU Exchange Rates";

/// Highlight state of the exchange date footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStatus {
    /// Just refreshed; shown with a marker until the highlight delay passes.
    JustUpdated,
    Settled,
}

/// Presentation-only state that the engine does not track.
#[derive(Debug)]
pub struct DeskView {
    date_status: DateStatus,
    /// Bumped on every refresh so older settle timers are ignored.
    generation: u64,
}

impl DeskView {
    pub fn new() -> Self {
        Self {
            date_status: DateStatus::Settled,
            generation: 0,
        }
    }

    pub fn date_status(&self) -> DateStatus {
        self.date_status
    }

    /// Highlight the date and return the generation to settle later.
    pub fn mark_updated(&mut self) -> u64 {
        self.generation += 1;
        self.date_status = DateStatus::JustUpdated;
        self.generation
    }

    /// Settle the highlight if `generation` is still current.
    pub fn settle(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.date_status == DateStatus::Settled {
            return false;
        }
        self.date_status = DateStatus::Settled;
        true
    }

    /// Render the full table.
    pub fn render(&self, engine: &ConversionEngine, input: &str) -> String {
        let mut out = String::new();
        let marker = if engine.validity_view() { "ok" } else { "invalid" };

        let _ = writeln!(out, "{}", TITLE);
        let _ = writeln!(out, "Amount, {}: {} [{}]", CurrencyCode::reference(), input.trim(), marker);
        let _ = writeln!(out, "{:>14}  {:<8}  {:>10}", "Converted", "Currency", "Rates");
        for row in engine.rows_view() {
            let _ = writeln!(
                out,
                "{:>14}  {:<8}  {:>10}",
                row.converted,
                row.code.code(),
                row.rate.as_deref().unwrap_or("")
            );
        }

        let suffix = match self.date_status() {
            DateStatus::JustUpdated => " (updated)",
            DateStatus::Settled => "",
        };
        let _ = write!(out, "Exchange date: {}{}", engine.exchange_date_view(), suffix);
        out
    }

    /// Render the rows as pretty JSON.
    pub fn render_json(engine: &ConversionEngine) -> serde_json::Result<String> {
        let rows: Vec<RowView> = engine.rows_view();
        serde_json::to_string_pretty(&rows)
    }
}

impl Default for DeskView {
    fn default() -> Self {
        Self::new()
    }
}
