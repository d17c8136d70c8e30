//! Stable cart session identifier.

use giftora_core::CartSessionId;
use tracing::debug;

use crate::storage::{KeyValueStore, StorageError, get_typed, keys, set_typed};

/// Source of fresh cart session ids.
pub trait CartIdGenerator: Send + Sync {
    fn generate(&self) -> CartSessionId;
}

/// Random v4 UUIDs in simple (32 hex digit) form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidCartIdGenerator;

impl CartIdGenerator for UuidCartIdGenerator {
    fn generate(&self) -> CartSessionId {
        CartSessionId::random()
    }
}

/// Return the persisted cart id, generating and persisting one on first use.
///
/// An empty stored id is treated as absent.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written.
pub async fn obtain_cart_id<S>(
    store: &S,
    ids: &dyn CartIdGenerator,
) -> Result<CartSessionId, StorageError>
where
    S: KeyValueStore,
{
    if let Some(existing) = get_typed::<CartSessionId, _>(store, keys::CART_ID).await?
        && !existing.as_str().is_empty()
    {
        return Ok(existing);
    }

    let cart_id = ids.generate();
    set_typed(store, keys::CART_ID, &cart_id).await?;
    debug!(cart_id = %cart_id, "Created cart session id");

    Ok(cart_id)
}
