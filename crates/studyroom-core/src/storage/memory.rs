use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{Slot, Store};
use crate::error::StorageError;

/// In-process slot store. Reads and writes can be made to fail on demand,
/// which is how the degraded-storage paths are exercised.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<Slot, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw slot contents, bypassing failure injection.
    pub fn raw(&self, slot: Slot) -> Option<String> {
        self.lock().get(&slot).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Slot, String>> {
        match self.slots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn check_write(&self, slot: Slot) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!("write to '{slot}' refused")));
        }
        Ok(())
    }
}

impl Store for MemoryStore {
    fn get(&self, slot: Slot) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!("read of '{slot}' refused")));
        }
        Ok(self.lock().get(&slot).cloned())
    }

    fn set(&self, slot: Slot, value: &str) -> Result<(), StorageError> {
        self.check_write(slot)?;
        self.lock().insert(slot, value.to_string());
        Ok(())
    }

    fn remove(&self, slot: Slot) -> Result<(), StorageError> {
        self.check_write(slot)?;
        self.lock().remove(&slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_injection() {
        let store = MemoryStore::new();
        store.set(Slot::Tasks, "[]").unwrap();

        store.fail_reads(true);
        assert!(store.get(Slot::Tasks).is_err());
        store.fail_reads(false);

        store.fail_writes(true);
        assert!(store.set(Slot::Tasks, "[1]").is_err());
        assert!(store.remove(Slot::Tasks).is_err());
        assert_eq!(store.raw(Slot::Tasks).as_deref(), Some("[]"));
    }
}
