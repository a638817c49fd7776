//! # ane-rs
//!
//! A key/value map stored as an N-ary tree whose branch at every level is
//! picked by a level-dependent hash of the key instead of by key comparison.
//! There is no rotation or rebalancing: hash dispersion alone keeps the tree
//! shallow.
//!
//! Based on "ANE – Árvore N-ária de Espalhamento Naturalmente Balanceada"
//! (Silva, Fiorese, da Silva, dos Santos, 2006).
//!
//! ## Example
//!
//! ```rust
//! use ane_rs::{AneError, AneTree};
//!
//! let mut tree: AneTree<u64, &str, 2> = AneTree::new();
//! tree.insert(4, "Vier").unwrap();
//! tree.insert(9000, "Neuntausend").unwrap();
//!
//! assert_eq!(tree.insert(9000, "Das ist kaputt"), Err(AneError::DuplicateKey));
//! assert_eq!(tree.get(&9000), Some(&"Neuntausend"));
//!
//! assert_eq!(tree.remove(&9000), Ok("Neuntausend"));
//! assert_eq!(tree.find(&9000), Err(AneError::NotFound));
//! ```
//!
//! ## Concurrency
//!
//! `AneTree` has no internal locking; every mutation takes `&mut self`.
//! Callers sharing a tree across threads serialize access externally, e.g.
//! with [`SharedTree`], which holds one lock for the duration of each call.

#![forbid(unsafe_code)]

pub mod error;
pub mod hash;
mod node;
pub mod shared;
pub mod visit;

use std::borrow::Borrow;
use std::ops::ControlFlow;

pub use error::{AneError, Result};
pub use hash::{Djb2, Identity, KeyDigest, OnExhaustion, ProbeHasher, SlotHasher, PROBE_LIMIT};
pub use shared::SharedTree;
pub use visit::{Iter, NodeView, Visitor};

use node::{Link, Node};
use visit::FnVisitor;

macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::trace!($($arg)*);
    };
}

macro_rules! debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)*);
    };
}

// =============================================================================
// Public types
// =============================================================================

/// What an insert does when the key is already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnExisting {
    /// Leave the tree untouched and report [`AneError::DuplicateKey`].
    Fail,
    /// Overwrite the stored value in place.
    Replace,
}

/// Shape summary of a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Number of nodes (= keys).
    pub len: usize,
    /// Number of levels (0 for an empty tree).
    pub height: usize,
    /// Nodes with no children.
    pub leaves: usize,
    /// Node count per level, root first.
    pub level_widths: Vec<usize>,
}

/// Hash-dispersed N-ary tree map.
///
/// - `ORDER` is the branching factor (at least 1, checked at compile time).
///   With `ORDER == 1` the tree is a singly linked chain.
/// - `H` decides the child slot of a key at each level; see [`hash`].
///
/// Keys only need `Eq`: there is no ordering among children.
pub struct AneTree<K, V, const ORDER: usize, H = ProbeHasher> {
    root: Link<K, V, ORDER>,
    hasher: H,
    count: usize,
}

/// Tree keyed by strings, digested with djb2.
pub type StringTree<V, const ORDER: usize> = AneTree<String, V, ORDER, ProbeHasher<Djb2>>;

// =============================================================================
// Construction and shape
// =============================================================================

impl<K, V, const ORDER: usize, D: Default> AneTree<K, V, ORDER, ProbeHasher<D>> {
    pub fn new() -> Self {
        Self::with_hasher(ProbeHasher::default())
    }
}

impl<K, V, const ORDER: usize, H> AneTree<K, V, ORDER, H> {
    const VALID_ORDER: () = assert!(ORDER >= 1, "tree order must be at least 1");

    pub fn with_hasher(hasher: H) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_ORDER;
        Self {
            root: None,
            hasher,
            count: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn order(&self) -> usize {
        ORDER
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        node::release(self.root.take());
        self.count = 0;
    }

    pub fn iter(&self) -> Iter<'_, K, V, ORDER> {
        Iter::new(self.root.as_deref(), self.count)
    }

    /// Visit every node in pre-order (node, then children by slot).
    ///
    /// Returns `Break(())` if the visitor stopped the walk early.
    pub fn traverse<T: Visitor<K, V>>(&self, visitor: &mut T) -> ControlFlow<()> {
        let mut stack: Vec<(&Node<K, V, ORDER>, usize)> = Vec::new();
        if let Some(root) = self.root.as_deref() {
            stack.push((root, 0));
        }

        while let Some((node, level)) = stack.pop() {
            if visitor.visit(NodeView::new(node, level)).is_break() {
                return ControlFlow::Break(());
            }
            stack.extend(
                node.children
                    .iter()
                    .rev()
                    .filter_map(|c| c.as_deref())
                    .map(|child| (child, level + 1)),
            );
        }

        ControlFlow::Continue(())
    }

    /// [`traverse`](Self::traverse) with a closure.
    pub fn traverse_with<F>(&self, f: F) -> ControlFlow<()>
    where
        F: FnMut(NodeView<'_, K, V>) -> ControlFlow<()>,
    {
        self.traverse(&mut FnVisitor(f))
    }

    /// Number of levels.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let _ = self.traverse_with(|node| {
            height = height.max(node.level() + 1);
            ControlFlow::Continue(())
        });
        height
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            len: self.count,
            ..TreeStats::default()
        };
        let _ = self.traverse_with(|node| {
            if stats.level_widths.len() <= node.level() {
                stats.level_widths.resize(node.level() + 1, 0);
            }
            stats.level_widths[node.level()] += 1;
            if node.is_leaf() {
                stats.leaves += 1;
            }
            ControlFlow::Continue(())
        });
        stats.height = stats.level_widths.len();
        stats
    }

    #[inline]
    fn checked_slot<Q>(hasher: &H, level: usize, key: &Q) -> Result<usize>
    where
        Q: ?Sized,
        H: SlotHasher<Q>,
    {
        let slot = hasher.slot(ORDER, level, key);
        if slot < ORDER {
            Ok(slot)
        } else {
            debug!(slot, order = ORDER, level, "hasher returned out-of-range slot");
            Err(AneError::InvalidHashResult {
                slot,
                order: ORDER,
                level,
            })
        }
    }
}

// =============================================================================
// Insert / find / remove
// =============================================================================

impl<K: Eq, V, const ORDER: usize, H> AneTree<K, V, ORDER, H> {
    /// Insert `key`, failing with [`AneError::DuplicateKey`] if it exists.
    pub fn insert(&mut self, key: K, value: V) -> Result<()>
    where
        H: SlotHasher<K>,
    {
        self.insert_with(key, value, OnExisting::Fail).map(|_| ())
    }

    /// Insert `key`, overwriting the value of an existing entry.
    ///
    /// Returns the previous value, if any. The entry keeps its position.
    pub fn insert_or_replace(&mut self, key: K, value: V) -> Result<Option<V>>
    where
        H: SlotHasher<K>,
    {
        self.insert_with(key, value, OnExisting::Replace)
    }

    /// Insert with an explicit policy for existing keys.
    ///
    /// Starting at the root, a node with an equal key ends the descent;
    /// otherwise the slot `hash(level, key)` is followed, and the first empty
    /// slot receives the new node.
    pub fn insert_with(&mut self, key: K, value: V, on_existing: OnExisting) -> Result<Option<V>>
    where
        H: SlotHasher<K>,
    {
        let Self {
            root,
            hasher,
            count,
        } = self;

        let mut link = root;
        let mut level = 0usize;
        loop {
            match link {
                None => {
                    *link = Some(Node::new(key, value));
                    *count += 1;
                    trace!(level, len = *count, "insert: new node");
                    return Ok(None);
                }
                Some(node) => {
                    if node.key == key {
                        return match on_existing {
                            OnExisting::Fail => Err(AneError::DuplicateKey),
                            OnExisting::Replace => {
                                trace!(level, "insert: replaced value");
                                Ok(Some(std::mem::replace(&mut node.value, value)))
                            }
                        };
                    }
                    let slot = Self::checked_slot(hasher, level, &key)?;
                    link = &mut node.children[slot];
                    level += 1;
                }
            }
        }
    }

    /// Look up `key`.
    pub fn find<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: SlotHasher<Q>,
    {
        let mut node = self.root.as_deref().ok_or(AneError::NotFound)?;
        let mut level = 0usize;
        loop {
            if node.matches(key) {
                return Ok(&node.value);
            }
            let slot = Self::checked_slot(&self.hasher, level, key)?;
            node = node.children[slot]
                .as_deref()
                .ok_or(AneError::NotFound)?;
            level += 1;
        }
    }

    pub fn find_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: SlotHasher<Q>,
    {
        let Self { root, hasher, .. } = self;
        let mut node = root.as_deref_mut().ok_or(AneError::NotFound)?;
        let mut level = 0usize;
        loop {
            if node.matches(key) {
                return Ok(&mut node.value);
            }
            let slot = Self::checked_slot(hasher, level, key)?;
            node = node.children[slot]
                .as_deref_mut()
                .ok_or(AneError::NotFound)?;
            level += 1;
        }
    }

    /// Like [`find`](Self::find), but any failure reads as absent.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: SlotHasher<Q>,
    {
        self.find(key).ok()
    }

    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: SlotHasher<Q>,
    {
        self.find_mut(key).ok()
    }

    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: SlotHasher<Q>,
    {
        self.find(key).is_ok()
    }

    /// Remove `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: SlotHasher<Q>,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Remove `key`, returning the stored key and value.
    ///
    /// A leaf is unlinked from its parent. An internal node stays where it is
    /// and takes over the key and value of the first leaf found at maximum
    /// depth below it; that leaf is unlinked instead. Either way exactly one
    /// node is freed. The moved key remains reachable because the internal
    /// node lies on its placement path.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Result<(K, V)>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: SlotHasher<Q>,
    {
        let link = self.locate_link_mut(key)?;
        let node = link.as_deref_mut().ok_or(AneError::NotFound)?;

        let removed = match node.detach_deepest_leaf() {
            Some(deepest) => {
                let Node {
                    key: moved_key,
                    value: moved_value,
                    ..
                } = *deepest;
                debug!("remove: internal node takes payload of deepest leaf");
                (
                    std::mem::replace(&mut node.key, moved_key),
                    std::mem::replace(&mut node.value, moved_value),
                )
            }
            None => {
                let leaf = link.take().ok_or(AneError::NotFound)?;
                let Node {
                    key: leaf_key,
                    value: leaf_value,
                    ..
                } = *leaf;
                (leaf_key, leaf_value)
            }
        };

        self.count -= 1;
        trace!(len = self.count, "remove: done");
        Ok(removed)
    }

    /// The slot owning the node for `key`; the root's slot is `self.root`.
    fn locate_link_mut<Q>(&mut self, key: &Q) -> Result<&mut Link<K, V, ORDER>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: SlotHasher<Q>,
    {
        let Self { root, hasher, .. } = self;

        let root_hit = match root.as_deref() {
            None => return Err(AneError::NotFound),
            Some(node) => node.matches(key),
        };
        if root_hit {
            return Ok(root);
        }

        let mut link = root;
        let mut level = 0usize;
        loop {
            let node = match link {
                Some(node) => node,
                None => return Err(AneError::NotFound),
            };
            let slot = Self::checked_slot(hasher, level, key)?;
            let child = &mut node.children[slot];
            let hit = match child.as_deref() {
                None => return Err(AneError::NotFound),
                Some(c) => c.matches(key),
            };
            if hit {
                return Ok(child);
            }
            link = child;
            level += 1;
        }
    }
}

// =============================================================================
// Trait impls
// =============================================================================

impl<K, V, const ORDER: usize, H: Default> Default for AneTree<K, V, ORDER, H> {
    fn default() -> Self {
        Self::with_hasher(H::default())
    }
}

impl<K, V, const ORDER: usize, H> Drop for AneTree<K, V, ORDER, H> {
    fn drop(&mut self) {
        node::release(self.root.take());
    }
}

/// Deep copy: the clone owns its own nodes, in the same shape.
impl<K: Clone, V: Clone, const ORDER: usize, H: Clone> Clone for AneTree<K, V, ORDER, H> {
    fn clone(&self) -> Self {
        Self {
            root: node::clone_link(&self.root),
            hasher: self.hasher.clone(),
            count: self.count,
        }
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug, const ORDER: usize, H> std::fmt::Debug
    for AneTree<K, V, ORDER, H>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, const ORDER: usize, H> IntoIterator for &'a AneTree<K, V, ORDER, H> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, ORDER>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}


#[cfg(test)]
mod proptests;
