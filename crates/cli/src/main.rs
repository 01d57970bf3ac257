//! Stockcart CLI - point-of-sale front-end over the Shop Service.
//!
//! # Usage
//!
//! ```bash
//! # List products with remaining stock
//! stockcart products
//!
//! # Sell two of A and one of B in one checkout
//! stockcart sell A=2 B
//!
//! # Interactive register
//! stockcart shell
//!
//! # Run against a local YAML stock table instead of the HTTP service
//! stockcart --demo products.yaml shell
//! ```
//!
//! # Commands
//!
//! - `products` - Show the catalog
//! - `sell` - Build a cart from arguments and check out
//! - `shell` - Interactive cart editing and checkout

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use stockcart_core::CurrencyCode;
use stockcart_shop::{HttpShopClient, MemoryShop, ShopConfig, ShopService, ShopStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "stockcart")]
#[command(author, version, about = "Stockcart point-of-sale tools")]
struct Cli {
    /// Serve the catalog from a YAML stock table instead of `SHOP_API_URL`
    #[arg(long, global = true, value_name = "FILE")]
    demo: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products with price and remaining stock
    Products,
    /// Build a cart from CODE[=QTY] arguments and check out
    Sell {
        /// Lines to sell, e.g. `A=2 B`
        #[arg(required = true, value_name = "CODE[=QTY]")]
        lines: Vec<commands::sell::LineSpec>,
    },
    /// Interactive register session
    Shell,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ShopConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the tracing subscriber. Logs go to stderr so they never mix with
/// command output.
fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stockcart_cli=info,stockcart_shop=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ShopConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    // Returned rather than exiting so the Sentry guard drops and flushes
    report(run(cli, &config).await)
}

/// Log a failed command and map the result to the process exit code.
fn report(result: Result<(), Box<dyn std::error::Error>>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &ShopConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = &cli.demo {
        let shop = MemoryShop::from_yaml_file(path).await?;
        dispatch(ShopStore::new(shop), cli.command, config.currency).await
    } else {
        let client = HttpShopClient::new(config.api()?)?;
        dispatch(ShopStore::new(client), cli.command, config.currency).await
    }
}

async fn dispatch<S: ShopService>(
    store: ShopStore<S>,
    command: Commands,
    currency: CurrencyCode,
) -> Result<(), Box<dyn std::error::Error>> {
    store.refresh_catalog().await?;

    match command {
        Commands::Products => commands::products::list(&store, currency),
        Commands::Sell { lines } => commands::sell::run(&store, &lines, currency).await?,
        Commands::Shell => commands::shell::run(&store, currency).await?,
    }
    Ok(())
}
