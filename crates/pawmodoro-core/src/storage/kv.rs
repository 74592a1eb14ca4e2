//! String key-value persistence seam.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Result;

/// A string key-value store. Values are JSON documents by convention.
pub trait KvStore {
    fn kv_get(&self, key: &str) -> Result<Option<String>>;
    fn kv_set(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn kv_get(&self, key: &str) -> Result<Option<String>> {
        (**self).kv_get(key)
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        (**self).kv_set(key, value)
    }
}

impl<T: KvStore + ?Sized> KvStore for Rc<T> {
    fn kv_get(&self, key: &str) -> Result<Option<String>> {
        (**self).kv_get(key)
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        (**self).kv_set(key, value)
    }
}

/// In-memory store for tests and hosts without a database.
#[derive(Debug, Default)]
pub struct MemoryKv {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn kv_get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_kv_roundtrip() {
        let kv = MemoryKv::new();
        assert!(kv.kv_get("k").unwrap().is_none());
        kv.kv_set("k", "v").unwrap();
        assert_eq!(kv.kv_get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn shared_handles_see_same_values() {
        let kv = Rc::new(MemoryKv::new());
        let other = Rc::clone(&kv);
        kv.kv_set("k", "1").unwrap();
        assert_eq!(other.kv_get("k").unwrap().as_deref(), Some("1"));
    }
}
