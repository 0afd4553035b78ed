//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as a real
//! backend but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::Result;
use crate::keyring::{HIDDEN_PREFIX, RESERVED_PREFIX};
use crate::store::Store;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped.
pub struct MemoryStore {
    inner: RwLock<BTreeMap<(String, String), Entry>>,
}

struct Entry {
    data: Vec<u8>,
    #[allow(dead_code)]
    typ: String,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn get(&self, service: &str, id: &str) -> Result<Option<Vec<u8>>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .get(&(service.to_string(), id.to_string()))
            .map(|e| e.data.clone()))
    }

    fn set(&self, service: &str, id: &str, data: &[u8], typ: &str) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.insert(
            (service.to_string(), id.to_string()),
            Entry {
                data: data.to_vec(),
                typ: typ.to_string(),
            },
        );
        Ok(())
    }

    fn remove(&self, service: &str, id: &str) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();
        Ok(inner.remove(&(service.to_string(), id.to_string())).is_some())
    }

    fn ids(
        &self,
        service: &str,
        prefix: &str,
        show_hidden: bool,
        show_reserved: bool,
    ) -> Result<Vec<String>> {
        let inner = self.inner.read().unwrap();
        // BTreeMap iteration yields ids in ascending order.
        Ok(inner
            .keys()
            .filter(|(svc, _)| svc == service)
            .map(|(_, id)| id)
            .filter(|id| id.starts_with(prefix))
            .filter(|id| show_hidden || !id.starts_with(HIDDEN_PREFIX))
            .filter(|id| show_reserved || !id.starts_with(RESERVED_PREFIX))
            .cloned()
            .collect())
    }

    fn exists(&self, service: &str, id: &str) -> Result<bool> {
        let inner = self.inner.read().unwrap();
        Ok(inner.contains_key(&(service.to_string(), id.to_string())))
    }
}
