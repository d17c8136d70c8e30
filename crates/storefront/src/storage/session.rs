//! Key-value store backed by the visitor's `tower-sessions` session.

use serde_json::Value;
use tower_sessions::Session;

use super::{KeyValueStore, StorageError};

/// Adapter exposing a [`Session`] as a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    session: Session,
}

impl SessionStore {
    /// Wrap the session extracted for the current request.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl KeyValueStore for SessionStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.session.get::<Value>(key).await?)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.session.insert(key, value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.session.remove::<Value>(key).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_session_backed_store() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let store = SessionStore::new(session);

        store.set("cart_id", json!("c-1")).await.unwrap();
        assert_eq!(store.get("cart_id").await.unwrap(), Some(json!("c-1")));

        store.remove("cart_id").await.unwrap();
        assert_eq!(store.get("cart_id").await.unwrap(), None);
    }
}
