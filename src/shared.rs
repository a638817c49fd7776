//! A tree shared between threads.
//!
//! [`AneTree`] does no locking of its own. `SharedTree` puts the whole tree
//! behind one `parking_lot::RwLock` and holds it for the full duration of
//! every call, so each operation sees and leaves a consistent tree. Lookups
//! share the lock; inserts and removals take it exclusively.
//!
//! For several operations that must happen atomically together, take a guard
//! with [`SharedTree::read`] or [`SharedTree::write`].

use std::borrow::Borrow;
use std::ops::ControlFlow;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Result;
use crate::hash::{ProbeHasher, SlotHasher};
use crate::visit::NodeView;
use crate::AneTree;

/// An [`AneTree`] behind a reader/writer lock.
pub struct SharedTree<K, V, const ORDER: usize, H = ProbeHasher> {
    inner: RwLock<AneTree<K, V, ORDER, H>>,
}

impl<K, V, const ORDER: usize, D: Default> SharedTree<K, V, ORDER, ProbeHasher<D>> {
    pub fn new() -> Self {
        Self::from_tree(AneTree::new())
    }
}

impl<K, V, const ORDER: usize, H> SharedTree<K, V, ORDER, H> {
    pub fn with_hasher(hasher: H) -> Self {
        Self::from_tree(AneTree::with_hasher(hasher))
    }

    pub fn from_tree(tree: AneTree<K, V, ORDER, H>) -> Self {
        Self {
            inner: RwLock::new(tree),
        }
    }

    pub fn into_inner(self) -> AneTree<K, V, ORDER, H> {
        self.inner.into_inner()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, AneTree<K, V, ORDER, H>> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, AneTree<K, V, ORDER, H>> {
        self.inner.write()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Pre-order walk under the read lock. Writers wait until it finishes.
    pub fn traverse_with<F>(&self, f: F) -> ControlFlow<()>
    where
        F: FnMut(NodeView<'_, K, V>) -> ControlFlow<()>,
    {
        self.inner.read().traverse_with(f)
    }
}

impl<K: Eq, V, const ORDER: usize, H> SharedTree<K, V, ORDER, H> {
    pub fn insert(&self, key: K, value: V) -> Result<()>
    where
        H: SlotHasher<K>,
    {
        self.inner.write().insert(key, value)
    }

    pub fn insert_or_replace(&self, key: K, value: V) -> Result<Option<V>>
    where
        H: SlotHasher<K>,
    {
        self.inner.write().insert_or_replace(key, value)
    }

    /// Copy of the value for `key`; the lock is released before returning.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: SlotHasher<Q>,
        V: Clone,
    {
        self.inner.read().get(key).cloned()
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: SlotHasher<Q>,
    {
        self.inner.read().contains_key(key)
    }

    pub fn remove<Q>(&self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: SlotHasher<Q>,
    {
        self.inner.write().remove(key)
    }
}

impl<K, V, const ORDER: usize, H: Default> Default for SharedTree<K, V, ORDER, H> {
    fn default() -> Self {
        Self::from_tree(AneTree::default())
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug, const ORDER: usize, H> std::fmt::Debug
    for SharedTree<K, V, ORDER, H>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SharedTree").field(&*self.inner.read()).finish()
    }
}
