//! Main conversion engine implementation.

use ratedesk_common::CurrencyCode;
use tracing::{debug, info, instrument, warn};

use crate::error::FetchError;
use crate::input::InputState;
use crate::rounding::DisplayValue;
use crate::row::{ConversionRow, RowView};
use crate::source::RateSource;
use crate::table::RateTable;

/// Handle for one refresh, ordered by issue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket {
    seq: u64,
}

impl RefreshTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// What happened to a refresh result.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Rates were replaced.
    Applied {
        exchange_date: String,
        /// Configured codes absent from the table.
        missing: Vec<CurrencyCode>,
    },
    /// The fetch failed; nothing changed.
    Failed(FetchError),
    /// A newer refresh was already applied; this result was dropped.
    Stale,
}

/// Owns the reference amount and the conversion rows.
pub struct ConversionEngine {
    rows: Vec<ConversionRow>,
    input: InputState,
    table: Option<RateTable>,
    exchange_date: String,
    /// Last ticket handed out.
    issued_seq: u64,
    /// Ticket of the last result that changed state.
    applied_seq: u64,
}

impl ConversionEngine {
    /// Create an engine with one row per code, in order.
    pub fn new(codes: impl IntoIterator<Item = CurrencyCode>) -> Self {
        Self {
            rows: codes.into_iter().map(ConversionRow::new).collect(),
            input: InputState::Empty,
            table: None,
            exchange_date: String::new(),
            issued_seq: 0,
            applied_seq: 0,
        }
    }

    /// Re-evaluate the reference text and recompute every row.
    pub fn on_reference_text_changed(&mut self, text: &str) -> Vec<DisplayValue> {
        self.input = InputState::from_text(text);
        debug!(state = ?self.input, "Reference input changed");
        self.broadcast(self.input.effective_amount())
    }

    /// Push an amount to every row and collect the results.
    pub fn broadcast(&mut self, amount: Option<f64>) -> Vec<DisplayValue> {
        self.rows
            .iter_mut()
            .map(|row| row.set_reference_amount(amount))
            .collect()
    }

    /// Start a refresh. The ticket must be handed back to
    /// [`apply_refresh`](Self::apply_refresh) with the fetch result.
    pub fn on_refresh_requested(&mut self) -> RefreshTicket {
        self.issued_seq += 1;
        RefreshTicket {
            seq: self.issued_seq,
        }
    }

    /// Apply a fetch result.
    ///
    /// Results older than the last applied refresh are dropped, failures
    /// included. A failure leaves the table and rows untouched.
    #[instrument(skip(self, result), fields(seq = ticket.seq))]
    pub fn apply_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<RateTable, FetchError>,
    ) -> RefreshOutcome {
        if ticket.seq <= self.applied_seq {
            warn!(applied = self.applied_seq, "Discarding stale refresh result");
            return RefreshOutcome::Stale;
        }

        let table = match result {
            Ok(table) => table,
            Err(e) => {
                warn!(error = %e, "Rate refresh failed, keeping previous rates");
                return RefreshOutcome::Failed(e);
            }
        };

        let mut missing = Vec::new();
        for row in &mut self.rows {
            match table.rate_for(row.code()) {
                Ok(rate) => row.set_rate(Some(rate)),
                Err(e) => {
                    warn!(code = %row.code(), error = %e, "Currency missing from rate table");
                    row.set_rate(None);
                    missing.push(row.code().clone());
                }
            }
        }

        self.exchange_date = table.exchange_date().to_string();
        self.applied_seq = ticket.seq;

        info!(
            exchange_date = %self.exchange_date,
            entries = table.len(),
            fetched_at = %table.fetched_at(),
            missing = missing.len(),
            "Rates refreshed"
        );

        self.table = Some(table);
        self.broadcast(self.input.effective_amount());

        RefreshOutcome::Applied {
            exchange_date: self.exchange_date.clone(),
            missing,
        }
    }

    /// Fetch from `source` and apply the result in one step.
    pub async fn refresh(&mut self, source: &dyn RateSource) -> RefreshOutcome {
        let ticket = self.on_refresh_requested();
        debug!(source = source.name(), seq = ticket.seq, "Refreshing rates");
        let result = source.fetch().await;
        self.apply_refresh(ticket, result)
    }

    /// Snapshot of every row, in configured order.
    pub fn rows_view(&self) -> Vec<RowView> {
        self.rows.iter().map(ConversionRow::view).collect()
    }

    pub fn rows(&self) -> &[ConversionRow] {
        &self.rows
    }

    /// Exchange date of the current table; empty before the first refresh.
    pub fn exchange_date_view(&self) -> &str {
        &self.exchange_date
    }

    /// Whether the reference text is acceptable.
    pub fn validity_view(&self) -> bool {
        self.input.is_valid()
    }

    pub fn input_state(&self) -> InputState {
        self.input
    }

    pub fn effective_amount(&self) -> Option<f64> {
        self.input.effective_amount()
    }

    pub fn rate_table(&self) -> Option<&RateTable> {
        self.table.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputError;
    use crate::source::StaticRateSource;

    const DATE: &str = "16.10.2026";

    fn setup_engine() -> ConversionEngine {
        ConversionEngine::new(CurrencyCode::defaults())
    }

    fn full_source() -> StaticRateSource {
        StaticRateSource::with_rates(
            &[
                ("USD", 36.5686),
                ("EUR", 39.7127),
                ("CNY", 5.0123),
                ("RUB", 0.3812),
                ("JPY", 0.24512),
                ("CHF", 42.1),
            ],
            DATE,
        )
    }

    fn converted(engine: &ConversionEngine, code: &str) -> String {
        engine
            .rows_view()
            .into_iter()
            .find(|r| r.code.code() == code)
            .map(|r| r.converted)
            .unwrap()
    }

    #[test]
    fn test_initial_state() {
        let engine = setup_engine();

        assert_eq!(engine.rows().len(), 6);
        assert_eq!(engine.exchange_date_view(), "");
        assert!(engine.validity_view());
        assert!(engine.rate_table().is_none());
        assert!(engine.rows_view().iter().all(|r| r.rate.is_none() && r.converted.is_empty()));
    }

    #[test]
    fn test_input_before_rates_is_empty() {
        let mut engine = setup_engine();

        let values = engine.on_reference_text_changed("1000");

        assert_eq!(engine.input_state(), InputState::Valid(1000.0));
        assert!(values.iter().all(DisplayValue::is_empty));
    }

    #[tokio::test]
    async fn test_refresh_then_convert() {
        let mut engine = ConversionEngine::new(vec![CurrencyCode::usd(), CurrencyCode::eur()]);
        let source = StaticRateSource::with_rates(&[("USD", 36.5686), ("EUR", 39.7127)], DATE);

        let outcome = engine.refresh(&source).await;
        assert_eq!(
            outcome,
            RefreshOutcome::Applied {
                exchange_date: DATE.to_string(),
                missing: vec![],
            }
        );

        let values = engine.on_reference_text_changed("1000");

        assert_eq!(
            values,
            vec![DisplayValue::Decimal(27.3459), DisplayValue::Decimal(25.1809)]
        );
        assert_eq!(engine.exchange_date_view(), DATE);
    }

    #[tokio::test]
    async fn test_refresh_rebroadcasts_current_amount() {
        let mut engine = setup_engine();
        engine.on_reference_text_changed("1000");

        engine.refresh(&full_source()).await;

        assert_eq!(converted(&engine, "USD"), "27.3459");
        assert_eq!(converted(&engine, "EUR"), "25.1809");
    }

    #[tokio::test]
    async fn test_missing_currency_is_per_row() {
        let mut engine = setup_engine();
        engine.on_reference_text_changed("1000");
        let source = StaticRateSource::with_rates(
            &[("USD", 36.5686), ("EUR", 39.7127), ("CNY", 5.0), ("RUB", 0.4), ("CHF", 42.0)],
            DATE,
        );

        let outcome = engine.refresh(&source).await;

        assert_eq!(
            outcome,
            RefreshOutcome::Applied {
                exchange_date: DATE.to_string(),
                missing: vec![CurrencyCode::jpy()],
            }
        );
        let jpy = &engine.rows()[4];
        assert_eq!(jpy.code(), &CurrencyCode::jpy());
        assert_eq!(jpy.rate(), None);
        assert!(jpy.converted().is_empty());
        assert_eq!(converted(&engine, "USD"), "27.3459");
        assert_eq!(converted(&engine, "CNY"), "200");
    }

    #[tokio::test]
    async fn test_missing_currency_clears_previous_rate() {
        let mut engine = setup_engine();
        engine.on_reference_text_changed("1000");
        engine.refresh(&full_source()).await;
        assert!(!converted(&engine, "JPY").is_empty());

        let without_jpy = StaticRateSource::with_rates(&[("USD", 36.5686)], DATE);
        engine.refresh(&without_jpy).await;

        assert_eq!(engine.rows()[4].rate(), None);
        assert!(converted(&engine, "JPY").is_empty());
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_state() {
        let mut engine = setup_engine();
        engine.on_reference_text_changed("1000");
        engine.refresh(&full_source()).await;
        let before = engine.rows_view();

        let failing = StaticRateSource::failing(FetchError::Network("offline".to_string()));
        let outcome = engine.refresh(&failing).await;

        assert_eq!(
            outcome,
            RefreshOutcome::Failed(FetchError::Network("offline".to_string()))
        );
        assert_eq!(engine.rows_view(), before);
        assert_eq!(engine.exchange_date_view(), DATE);
        assert!(engine.rate_table().is_some());
    }

    #[test]
    fn test_stale_result_discarded() {
        let mut engine = setup_engine();
        let first = engine.on_refresh_requested();
        let second = engine.on_refresh_requested();
        assert!(first < second);

        let newer = StaticRateSource::with_rates(&[("USD", 40.0)], "17.10.2026");
        let older = StaticRateSource::with_rates(&[("USD", 30.0)], "16.10.2026");

        let outcome = engine.apply_refresh(second, tokio_test::block_on(newer.fetch()));
        assert!(matches!(outcome, RefreshOutcome::Applied { .. }));

        let outcome = engine.apply_refresh(first, tokio_test::block_on(older.fetch()));
        assert_eq!(outcome, RefreshOutcome::Stale);

        assert_eq!(engine.rows()[0].rate(), Some(40.0));
        assert_eq!(engine.exchange_date_view(), "17.10.2026");
    }

    #[test]
    fn test_stale_failure_discarded() {
        let mut engine = setup_engine();
        let first = engine.on_refresh_requested();
        let second = engine.on_refresh_requested();

        engine.apply_refresh(second, tokio_test::block_on(full_source().fetch()));
        let outcome = engine.apply_refresh(first, Err(FetchError::Status(500)));

        assert_eq!(outcome, RefreshOutcome::Stale);
    }

    #[test]
    fn test_in_order_results_both_apply() {
        let mut engine = setup_engine();
        let first = engine.on_refresh_requested();
        let second = engine.on_refresh_requested();

        let a = StaticRateSource::with_rates(&[("USD", 30.0)], "16.10.2026");
        let b = StaticRateSource::with_rates(&[("USD", 40.0)], "17.10.2026");

        assert!(matches!(
            engine.apply_refresh(first, tokio_test::block_on(a.fetch())),
            RefreshOutcome::Applied { .. }
        ));
        assert!(matches!(
            engine.apply_refresh(second, tokio_test::block_on(b.fetch())),
            RefreshOutcome::Applied { .. }
        ));
        assert_eq!(engine.rows()[0].rate(), Some(40.0));
    }

    #[tokio::test]
    async fn test_invalid_input_empties_rows() {
        let mut engine = setup_engine();
        engine.refresh(&full_source()).await;
        engine.on_reference_text_changed("1000");

        let values = engine.on_reference_text_changed("10a");

        assert_eq!(engine.input_state(), InputState::Invalid(InputError::Syntax));
        assert!(!engine.validity_view());
        assert!(values.iter().all(DisplayValue::is_empty));

        let too_big = format!("1{}", "0".repeat(80));
        engine.on_reference_text_changed(&too_big);
        assert_eq!(engine.input_state(), InputState::Invalid(InputError::Semantic));
        assert_eq!(engine.effective_amount(), None);

        engine.on_reference_text_changed("  ");
        assert_eq!(engine.input_state(), InputState::Empty);
        assert!(engine.validity_view());
    }

    #[tokio::test]
    async fn test_large_amount_scientific() {
        let mut engine = ConversionEngine::new(vec![CurrencyCode::usd()]);
        engine
            .refresh(&StaticRateSource::with_rates(&[("USD", 36.5686)], DATE))
            .await;

        engine.on_reference_text_changed("10000000000");
        assert_eq!(converted(&engine, "USD"), "273459000");

        engine.on_reference_text_changed("100000000000");
        assert_eq!(converted(&engine, "USD"), "2.7346E+09");
    }

    #[tokio::test]
    async fn test_broadcast_explicit_amount() {
        let mut engine = ConversionEngine::new(vec![CurrencyCode::usd()]);
        engine
            .refresh(&StaticRateSource::with_rates(&[("USD", 36.5686)], DATE))
            .await;

        assert_eq!(engine.broadcast(Some(1000.0)), vec![DisplayValue::Decimal(27.3459)]);
        assert_eq!(engine.broadcast(None), vec![DisplayValue::Empty]);
    }
}
