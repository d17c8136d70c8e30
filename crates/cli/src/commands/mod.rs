//! CLI subcommands.

pub mod cart;
pub mod tracking;

use std::io::Read;
use std::path::Path;

use giftora_storefront::cart::CartError;
use giftora_storefront::config::ConfigError;
use giftora_storefront::marketplace::MarketplaceError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Input file could not be read.
    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Input was not the expected JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Marketplace request failed.
    #[error(transparent)]
    Marketplace(#[from] MarketplaceError),

    /// The quote was rejected.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Read a JSON document from a file, or stdin when `path` is `-`.
fn read_json(path: &Path) -> Result<serde_json::Value, CommandError> {
    let io_err = |source| CommandError::Io {
        path: path.display().to_string(),
        source,
    };

    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).map_err(io_err)?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(io_err)?
    };

    Ok(serde_json::from_str(&raw)?)
}

/// Pretty-print a value to stdout.
#[allow(clippy::print_stdout)]
fn print_json(value: &impl serde::Serialize) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
