use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Slot, Store};
use crate::error::StorageError;

/// Typed JSON access to slots.
///
/// Reads never fail: an unreadable or corrupt slot is logged and replaced by
/// the type's default so the application keeps working on empty state.
/// Writes report failures to the caller.
#[derive(Debug)]
pub struct Repository<S: Store> {
    store: S,
}

impl<S: Store> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn load_or_default<T>(&self, slot: Slot) -> T
    where
        T: DeserializeOwned + Default,
    {
        match self.load_optional(slot) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!(%slot, error = %e, "slot unreadable, using empty state");
                T::default()
            }
        }
    }

    /// `Ok(None)` when the slot is empty; `Err` when it can't be read or parsed.
    pub fn load_optional<T>(&self, slot: Slot) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned,
    {
        let Some(raw) = self.store.get(slot)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Serialize {
                key: slot.key().to_string(),
                message: e.to_string(),
            })
    }

    pub fn save<T>(&self, slot: Slot, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string(value).map_err(|e| StorageError::Serialize {
            key: slot.key().to_string(),
            message: e.to_string(),
        })?;
        self.store.set(slot, &json)?;
        tracing::trace!(%slot, bytes = json.len(), "slot saved");
        Ok(())
    }

    pub fn clear(&self, slot: Slot) -> Result<(), StorageError> {
        self.store.remove(slot)
    }
}
