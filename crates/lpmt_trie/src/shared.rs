use std::sync::Arc;

use lpmt_core::Prefix;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::patricia::{MergePolicy, PatriciaTrie};

/// A [PatriciaTrie] behind a reader-writer lock, cheap to clone and share between threads.
///
/// Lookups take the read lock and may run concurrently; inserts and removals are exclusive.
pub struct SharedTrie<V> {
    inner: Arc<RwLock<PatriciaTrie<V>>>,
}

impl<V> Clone for SharedTrie<V> {
    fn clone(&self) -> Self {
        SharedTrie {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> From<PatriciaTrie<V>> for SharedTrie<V> {
    fn from(trie: PatriciaTrie<V>) -> Self {
        SharedTrie {
            inner: Arc::new(RwLock::new(trie)),
        }
    }
}

impl<V> SharedTrie<V> {
    #[inline]
    pub fn new(default: V) -> Self {
        PatriciaTrie::new(default).into()
    }

    #[inline]
    pub fn with_policy(default: V, policy: MergePolicy) -> Self {
        PatriciaTrie::with_policy(default, policy).into()
    }

    pub fn insert(&self, prefix: Prefix, data: V) -> Option<V> {
        self.inner.write().insert(prefix, data).1
    }

    pub fn remove(&self, prefix: &Prefix) -> Option<V> {
        self.inner.write().remove(prefix)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Holds the read lock for a batch of lookups.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, PatriciaTrie<V>> {
        self.inner.read()
    }

    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, PatriciaTrie<V>> {
        self.inner.write()
    }
}

impl<V: Clone> SharedTrie<V> {
    /// Longest-prefix match; the data is cloned out so the lock is released on return.
    pub fn lookup_cloned(&self, key: u32) -> (Prefix, V) {
        let trie = self.inner.read();
        let (prefix, data) = trie.lookup(key);
        (prefix, data.clone())
    }
}
