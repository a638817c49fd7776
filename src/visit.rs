//! Pre-order visiting: the [`Visitor`] capability and the [`Iter`] iterator.

use std::iter::FusedIterator;
use std::ops::ControlFlow;

use crate::node::Node;

/// A read-only look at one node during traversal.
pub struct NodeView<'a, K, V> {
    key: &'a K,
    value: &'a V,
    level: usize,
    children: usize,
}

impl<'a, K, V> NodeView<'a, K, V> {
    pub(crate) fn new<const ORDER: usize>(node: &'a Node<K, V, ORDER>, level: usize) -> Self {
        Self {
            key: &node.key,
            value: &node.value,
            level,
            children: node.child_count(),
        }
    }

    pub fn key(&self) -> &'a K {
        self.key
    }

    pub fn value(&self) -> &'a V {
        self.value
    }

    /// Depth below the root (root = 0).
    pub fn level(&self) -> usize {
        self.level
    }

    /// Number of occupied child slots.
    pub fn child_count(&self) -> usize {
        self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children == 0
    }
}

impl<K, V> Clone for NodeView<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeView<'_, K, V> {}

impl<K: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for NodeView<'_, K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeView")
            .field("key", self.key)
            .field("value", self.value)
            .field("level", &self.level)
            .field("children", &self.children)
            .finish()
    }
}

/// Receives nodes in pre-order from [`AneTree::traverse`](crate::AneTree::traverse).
///
/// Returning `ControlFlow::Break(())` stops the whole traversal: no further
/// node is visited, at any level.
pub trait Visitor<K, V> {
    fn visit(&mut self, node: NodeView<'_, K, V>) -> ControlFlow<()>;
}

/// Adapts a closure into a [`Visitor`].
pub(crate) struct FnVisitor<F>(pub(crate) F);

impl<K, V, F> Visitor<K, V> for FnVisitor<F>
where
    F: FnMut(NodeView<'_, K, V>) -> ControlFlow<()>,
{
    #[inline]
    fn visit(&mut self, node: NodeView<'_, K, V>) -> ControlFlow<()> {
        (self.0)(node)
    }
}

/// Pre-order iterator over `(&key, &value)`.
///
/// Order follows the tree shape (node, then children by slot), not the keys.
pub struct Iter<'a, K, V, const ORDER: usize> {
    stack: Vec<&'a Node<K, V, ORDER>>,
    remaining: usize,
}

impl<'a, K, V, const ORDER: usize> Iter<'a, K, V, ORDER> {
    pub(crate) fn new(root: Option<&'a Node<K, V, ORDER>>, len: usize) -> Self {
        Self {
            stack: root.into_iter().collect(),
            remaining: len,
        }
    }
}

impl<'a, K, V, const ORDER: usize> Iterator for Iter<'a, K, V, ORDER> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().filter_map(|c| c.as_deref()));
        self.remaining = self.remaining.saturating_sub(1);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, const ORDER: usize> ExactSizeIterator for Iter<'_, K, V, ORDER> {}

impl<K, V, const ORDER: usize> FusedIterator for Iter<'_, K, V, ORDER> {}
