//! Construct-once cache with per-key guards.
//!
//! Concurrent callers asking for the same key block on that key's guard while
//! the first caller constructs the value; callers for other keys proceed.
//! Every caller receives the same `Arc`. A failed construction leaves the
//! key empty, so the next caller retries.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

type Slot<V> = Arc<Mutex<Option<Arc<V>>>>;

pub struct KeyedCache<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> Default for KeyedCache<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone, V> KeyedCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached value for `key`, waiting for an in-flight construction.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let slot = self.slots.lock().get(key).cloned()?;
        slot.lock().clone()
    }

    /// The cached value for `key`, constructing it with `init` if absent.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, init: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let slot = self.slots.lock().entry(key).or_default().clone();
        let mut guard = slot.lock();
        if let Some(value) = guard.as_ref() {
            return Ok(Arc::clone(value));
        }
        let value = Arc::new(init()?);
        *guard = Some(Arc::clone(&value));
        Ok(value)
    }

    /// The cached value for `key`, constructing it with `init` if absent.
    pub fn get_or_insert_with<F>(&self, key: K, init: F) -> Arc<V>
    where
        F: FnOnce() -> V,
    {
        let slot = self.slots.lock().entry(key).or_default().clone();
        let mut guard = slot.lock();
        Arc::clone(guard.get_or_insert_with(|| Arc::new(init())))
    }

    /// Number of constructed values.
    pub fn len(&self) -> usize {
        let slots: Vec<Slot<V>> = self.slots.lock().values().cloned().collect();
        slots.iter().filter(|slot| slot.lock().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
