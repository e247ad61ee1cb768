//! Desk event loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use ratedesk_fx::{
    ConversionEngine, FetchError, RateSource, RateTable, RefreshOutcome, RefreshTicket,
};

use crate::config::DeskConfig;
use crate::view::DeskView;

/// Everything that can change desk state. All of it is handled on one task.
#[derive(Debug)]
pub enum DeskEvent {
    /// New reference-amount text.
    Input(String),
    /// User asked for fresh rates.
    RefreshRequested,
    /// A fetch finished.
    Fetched(RefreshTicket, Result<RateTable, FetchError>),
    /// The highlight delay for a refresh generation elapsed.
    DateSettled(u64),
    Quit,
}

impl DeskEvent {
    /// Interpret one line typed by the user.
    pub fn from_line(line: &str) -> Self {
        match line.trim() {
            ":r" | ":refresh" => DeskEvent::RefreshRequested,
            ":q" | ":quit" => DeskEvent::Quit,
            _ => DeskEvent::Input(line.to_string()),
        }
    }
}

/// What the loop should do after an event.
#[derive(Debug, PartialEq)]
pub enum Step {
    /// Print the table.
    Render(String),
    /// Show a one-shot alert.
    Alert(String),
    Idle,
    Quit,
}

/// The engine plus the presentation state around it.
pub struct Desk {
    engine: ConversionEngine,
    source: Arc<dyn RateSource>,
    host: String,
    view: DeskView,
    input: String,
    json: bool,
    highlight_delay: Duration,
    events: mpsc::UnboundedSender<DeskEvent>,
}

impl Desk {
    pub fn new(
        config: &DeskConfig,
        source: Arc<dyn RateSource>,
        host: String,
        json: bool,
        events: mpsc::UnboundedSender<DeskEvent>,
    ) -> Self {
        Self {
            engine: ConversionEngine::new(config.currencies.clone()),
            source,
            host,
            view: DeskView::new(),
            input: String::new(),
            json,
            highlight_delay: config.date_highlight_delay,
            events,
        }
    }

    pub fn engine(&self) -> &ConversionEngine {
        &self.engine
    }

    /// Apply one event.
    pub fn handle(&mut self, event: DeskEvent) -> Step {
        match event {
            DeskEvent::Input(text) => {
                self.engine.on_reference_text_changed(&text);
                self.input = text;
                self.render()
            }
            DeskEvent::RefreshRequested => {
                self.start_refresh();
                Step::Idle
            }
            DeskEvent::Fetched(ticket, result) => match self.engine.apply_refresh(ticket, result) {
                RefreshOutcome::Applied { .. } => {
                    let generation = self.view.mark_updated();
                    self.schedule_settle(generation);
                    self.render()
                }
                RefreshOutcome::Failed(e) => Step::Alert(e.alert_message(&self.host)),
                RefreshOutcome::Stale => Step::Idle,
            },
            DeskEvent::DateSettled(generation) => {
                if self.view.settle(generation) {
                    self.render()
                } else {
                    Step::Idle
                }
            }
            DeskEvent::Quit => Step::Quit,
        }
    }

    /// Fetch in the background; the result comes back as [`DeskEvent::Fetched`].
    fn start_refresh(&mut self) {
        let ticket = self.engine.on_refresh_requested();
        let source = Arc::clone(&self.source);
        let events = self.events.clone();

        debug!(seq = ticket.seq(), source = source.name(), "Starting refresh");
        tokio::spawn(async move {
            let result = source.fetch().await;
            let _ = events.send(DeskEvent::Fetched(ticket, result));
        });
    }

    fn schedule_settle(&self, generation: u64) {
        let events = self.events.clone();
        let delay = self.highlight_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(DeskEvent::DateSettled(generation));
        });
    }

    fn render(&self) -> Step {
        if self.json {
            match DeskView::render_json(&self.engine) {
                Ok(json) => Step::Render(json),
                Err(e) => {
                    warn!(error = %e, "Failed to serialize rows");
                    Step::Idle
                }
            }
        } else {
            Step::Render(self.view.render(&self.engine, &self.input))
        }
    }

    /// Kick off the initial fetch and render the empty table.
    pub fn start(&mut self) -> Step {
        self.start_refresh();
        self.render()
    }

    /// Run until a quit event or the channel closes.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<DeskEvent>) {
        let mut step = self.start();

        loop {
            match step {
                Step::Render(text) => println!("{}\n", text),
                Step::Alert(message) => eprintln!("ERROR: {}", message),
                Step::Idle => {}
                Step::Quit => break,
            }

            step = match events.recv().await {
                Some(event) => self.handle(event),
                None => break,
            };
        }

        info!(exchange_date = %self.engine().exchange_date_view(), "Desk stopped");
    }
}

/// Fetch once, convert `amount`, print, and exit.
pub async fn run_once(
    config: &DeskConfig,
    source: &dyn RateSource,
    host: &str,
    amount: &str,
    json: bool,
) -> anyhow::Result<()> {
    let mut engine = ConversionEngine::new(config.currencies.clone());
    engine.on_reference_text_changed(amount);

    if let RefreshOutcome::Failed(e) = engine.refresh(source).await {
        let alert = e.alert_message(host);
        return Err(anyhow::Error::new(e).context(alert));
    }

    if json {
        println!("{}", DeskView::render_json(&engine)?);
    } else {
        println!("{}", DeskView::new().render(&engine, amount));
    }

    if !engine.validity_view() {
        warn!(input = amount, "Amount is not a valid number");
    }

    Ok(())
}
