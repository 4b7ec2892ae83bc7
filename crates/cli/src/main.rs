//! Tillpoint CLI - point-of-sale terminal for the command line.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! tp products --search pan --category Bakery
//!
//! # Build a cart (lines are numbered from 1)
//! tp cart add 12 3
//! tp cart inc 1
//! tp cart show
//!
//! # Sell it
//! tp sell --payment card
//!
//! # End of day
//! tp closing status
//! tp closing process
//! ```
//!
//! # Environment Variables
//!
//! - `TILLPOINT_BACKEND_URL` - Sales backend base URL (required)
//! - `TILLPOINT_API_TOKEN` - Bearer token for the backend
//! - `TILLPOINT_DATA_DIR` - Directory for local state (default `.tillpoint`)
//! - `TILLPOINT_LOG_FORMAT` - `pretty` or `json`
//! - `SENTRY_DSN` - Error tracking

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tillpoint_core::{PaymentMethod, ProductId, parse_quantity};
use tillpoint_terminal::Terminal;
use tillpoint_terminal::config::{LogFormat, TerminalConfig};

mod commands;

#[derive(Parser)]
#[command(name = "tp")]
#[command(author, version, about = "Tillpoint point-of-sale terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Products {
        /// Case-insensitive name filter
        #[arg(short, long, default_value = "")]
        search: String,

        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List catalog categories
    Categories,
    /// Inspect or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Sell the cart
    Sell {
        /// Payment method (`cash`, `card`, `transfer`)
        #[arg(short, long)]
        payment: Option<PaymentMethod>,
    },
    /// Give the cart away as a donation
    Donate {
        /// Why the goods are donated
        #[arg(short, long)]
        reason: String,
    },
    /// Show today's sales counters
    Counters {
        /// Zero the counters
        #[arg(long)]
        reset: bool,
    },
    /// Daily closing
    Closing {
        #[command(subcommand)]
        action: ClosingAction,
    },
    /// Receipt settings
    ReceiptConfig {
        #[command(subcommand)]
        action: ReceiptAction,
    },
    /// Keep running and reset the counters when the date changes
    Watch,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        product_id: ProductId,
        #[arg(default_value = "1", value_parser = parse_quantity)]
        quantity: u32,
    },
    /// Add one unit to a line
    Inc { line: usize },
    /// Take one unit off a line (removes it at zero)
    Dec { line: usize },
    /// Remove a line
    Remove { line: usize },
    /// Empty the cart
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ClosingAction {
    /// Show the backend's view of today
    Status,
    /// Close the day and zero the counters
    Process,
}

#[derive(Subcommand)]
enum ReceiptAction {
    /// Show the current settings
    Show,
    /// Change settings
    Set {
        #[arg(long)]
        company_name: Option<String>,
        #[arg(long)]
        message: Option<String>,
        #[arg(long)]
        logo_url: Option<String>,
        #[arg(long)]
        show_qr: Option<bool>,
        #[arg(long)]
        qr_text: Option<String>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &TerminalConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tillpoint=info,tp=info".into());

    let (pretty, json) = match format {
        LogFormat::Pretty => (
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(pretty)
        .with(json)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match TerminalConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();
            tracing::error!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    let _sentry_guard = init_sentry(&config);
    init_tracing(config.log_format);

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        commands::output::failure(&*e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: TerminalConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = Terminal::open(config)?;

    match cli.command {
        Commands::Products { search, category } => {
            commands::catalog::products(&mut terminal, &search, category.as_deref()).await?;
        }
        Commands::Categories => commands::catalog::categories(&mut terminal).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&terminal),
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(&mut terminal, product_id, quantity).await?,
            CartAction::Inc { line } => commands::cart::change(&mut terminal, line, 1)?,
            CartAction::Dec { line } => commands::cart::change(&mut terminal, line, -1)?,
            CartAction::Remove { line } => commands::cart::remove(&mut terminal, line)?,
            CartAction::Clear { yes } => commands::cart::clear(&mut terminal, yes)?,
        },
        Commands::Sell { payment } => commands::sale::sell(&mut terminal, payment).await?,
        Commands::Donate { reason } => commands::sale::donate(&mut terminal, &reason).await?,
        Commands::Counters { reset } => commands::day::counters(&terminal, reset),
        Commands::Closing { action } => match action {
            ClosingAction::Status => commands::day::closing_status(&terminal).await?,
            ClosingAction::Process => commands::day::close(&terminal).await?,
        },
        Commands::ReceiptConfig { action } => match action {
            ReceiptAction::Show => commands::receipt::show(&terminal),
            ReceiptAction::Set {
                company_name,
                message,
                logo_url,
                show_qr,
                qr_text,
            } => commands::receipt::set(
                &terminal,
                commands::receipt::Changes {
                    company_name,
                    message,
                    logo_url,
                    show_qr,
                    qr_text,
                },
            )?,
        },
        Commands::Watch => commands::day::watch(&terminal).await?,
    }
    Ok(())
}
