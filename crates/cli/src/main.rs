//! Giftora CLI - offline tracking and cart tools.
//!
//! # Usage
//!
//! ```bash
//! # Normalize a saved tracking response into a timeline
//! giftora-cli tracking normalize response.json
//!
//! # Fetch and normalize live tracking for an order
//! giftora-cli tracking fetch 1001
//!
//! # Quote a quantity of a saved product
//! giftora-cli cart quote product.json --qty 3 --variant 7
//! ```
//!
//! # Commands
//!
//! - `tracking normalize` - Normalize a tracking payload file
//! - `tracking fetch` - Fetch tracking from the marketplace and normalize it
//! - `cart quote` - Price and stock-check a product quantity

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "giftora-cli")]
#[command(author, version, about = "Giftora CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shipment tracking timelines
    Tracking {
        #[command(subcommand)]
        action: TrackingAction,
    },
    /// Cart pricing
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum TrackingAction {
    /// Normalize a raw tracking response saved as JSON (`-` for stdin)
    Normalize {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Fetch tracking for an order and normalize it
    Fetch {
        /// Marketplace order id
        order_id: i64,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Resolve the unit price and check stock for a quantity
    Quote {
        /// Path to a product JSON file as returned by the marketplace
        product: PathBuf,

        /// Quantity to buy
        #[arg(short, long, default_value_t = 1)]
        qty: u32,

        /// Variant id (defaults to the first variant)
        #[arg(short, long)]
        variant: Option<i64>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), commands::CommandError> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Tracking { action } => match action {
            TrackingAction::Normalize { file } => commands::tracking::normalize(&file)?,
            TrackingAction::Fetch { order_id } => commands::tracking::fetch(order_id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Quote {
                product,
                qty,
                variant,
            } => commands::cart::quote(&product, qty, variant)?,
        },
    }
    Ok(())
}
