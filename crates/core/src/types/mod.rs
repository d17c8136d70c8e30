//! Core types for Giftora.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod pincode;
pub mod status;

pub use id::*;
pub use pincode::{Pincode, PincodeError};
pub use status::{IconKind, OwnShipmentStatus};
