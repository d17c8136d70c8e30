//! Per-visitor key-value storage.
//!
//! The cart mirror, the cart session id and the last tax calculation are kept
//! in a small key-value store owned by the visitor. Both cores receive the
//! store as a parameter so tests can substitute [`InMemoryStore`] for the
//! session-backed [`SessionStore`] used by the HTTP surface.
//!
//! There is no locking across concurrent requests from the same visitor:
//! writes are last-write-wins.

mod memory;
mod session;

pub use memory::InMemoryStore;
pub use session::SessionStore;

use std::future::Future;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

/// Well-known storage keys.
pub mod keys {
    /// Stable cart session identifier.
    pub const CART_ID: &str = "cart_id";
    /// Local cart mirror (list of cart line items).
    pub const CART: &str = "cart";
    /// Verbatim response of the last tax calculation.
    pub const TAX_SUMMARY: &str = "tax_summary";
    /// Marketplace customer id of the signed-in shopper.
    pub const CUSTOMER_ID: &str = "customer_id";
}

/// Errors raised by a key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The session backend failed to load or persist.
    #[error("Session store error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// A stored value could not be converted to or from JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Minimal async key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key is absent.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Value>, StorageError>> + Send;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: Value) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Delete a value. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Read and deserialize a value.
///
/// # Errors
///
/// Returns an error if the store fails or the stored JSON does not match `T`.
pub async fn get_typed<T, S>(store: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    S: KeyValueStore,
{
    match store.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Serialize and write a value.
///
/// # Errors
///
/// Returns an error if `value` cannot be serialized or the store fails.
pub async fn set_typed<T, S>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + Sync,
    S: KeyValueStore,
{
    let value = serde_json::to_value(value)?;
    store.set(key, value).await
}
