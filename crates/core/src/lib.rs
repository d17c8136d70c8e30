//! Giftora Core - Shared types library.
//!
//! This crate provides common types used across all Giftora components:
//! - `storefront` - Customer-facing storefront service and its two cores
//!   (shipment tracking timelines and cart reconciliation)
//! - `cli` - Offline tools for inspecting tracking payloads and cart quotes
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, pincodes, and shipment statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
