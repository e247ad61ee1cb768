//! Ratedesk
//!
//! Terminal currency converter backed by the NBU daily rate feed.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ratedesk_common::CurrencyCode;
use ratedesk_fx::NbuRateSource;

mod app;
mod config;
mod view;

use app::{Desk, DeskEvent};
use config::DeskConfig;

/// Ratedesk CLI
#[derive(Parser, Debug)]
#[command(name = "ratedesk")]
#[command(about = "Convert UAH amounts with the NBU exchange rates")]
struct Args {
    /// Rate feed URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Comma separated target currencies
    #[arg(short, long)]
    currencies: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Amount to convert at startup
    #[arg(short, long)]
    amount: Option<String>,

    /// Fetch once, print the table and exit
    #[arg(long, requires = "amount")]
    once: bool,

    /// Print rows as JSON
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Args {
    fn apply(&self, config: &mut DeskConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(list) = &self.currencies {
            config.currencies = CurrencyCode::parse_list(list);
        }
        if let Some(secs) = self.timeout {
            config.request_timeout = Duration::from_secs(secs);
        }
    }
}

fn init_logging(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string()),
    );
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = DeskConfig::from_env();
    args.apply(&mut config);

    init_logging(&config.log_level, args.log_json);

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    info!(
        endpoint = %config.endpoint,
        currencies = config.currencies.len(),
        "Starting ratedesk"
    );

    let source = NbuRateSource::new(config.source_config())?;
    let host = source.host();

    if args.once {
        let amount = args.amount.as_deref().unwrap_or_default();
        return app::run_once(&config, &source, &host, amount, args.json).await;
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let mut desk = Desk::new(&config, Arc::new(source), host, args.json, tx.clone());

    if let Some(amount) = &args.amount {
        desk.handle(DeskEvent::Input(amount.clone()));
    }

    // Stdin lines become events; EOF quits.
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(DeskEvent::from_line(&line)).is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    let _ = tx.send(DeskEvent::Quit);
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Failed to read stdin");
                    let _ = tx.send(DeskEvent::Quit);
                    break;
                }
            }
        }
    });

    println!("Type an amount, ':r' to refresh, ':q' to quit.");
    desk.run(rx).await;

    Ok(())
}
