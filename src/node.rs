//! Tree nodes and the subtree walks that must not recurse.
//!
//! Every child slot owns its subtree through a `Box`. Anything that touches
//! a whole subtree (release, deep clone, deepest-leaf search) runs on an
//! explicit stack so an `ORDER == 1` chain of millions of nodes cannot blow
//! the call stack.

use std::borrow::Borrow;

/// An owning child slot.
pub(crate) type Link<K, V, const ORDER: usize> = Option<Box<Node<K, V, ORDER>>>;

pub(crate) struct Node<K, V, const ORDER: usize> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) children: [Link<K, V, ORDER>; ORDER],
}

impl<K, V, const ORDER: usize> Node<K, V, ORDER> {
    pub(crate) fn new(key: K, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            children: std::array::from_fn(|_| None),
        })
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    #[inline]
    pub(crate) fn child_count(&self) -> usize {
        self.children.iter().filter(|c| c.is_some()).count()
    }

    #[inline]
    pub(crate) fn matches<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let own: &Q = self.key.borrow();
        own == key
    }

    /// Slot path from `self` to the first leaf found at maximum depth, in
    /// depth-first increasing-slot order. Empty when `self` is a leaf.
    pub(crate) fn deepest_leaf_path(&self) -> Vec<usize> {
        let mut best: Vec<usize> = Vec::new();
        let mut path: Vec<usize> = Vec::new();
        // (node, next slot to explore)
        let mut stack: Vec<(&Self, usize)> = vec![(self, 0)];

        while let Some(top) = stack.last_mut() {
            let node = top.0;
            let next = (top.1..ORDER)
                .find_map(|i| node.children[i].as_deref().map(|child| (i, child)));
            match next {
                Some((i, child)) => {
                    top.1 = i + 1;
                    path.push(i);
                    stack.push((child, 0));
                }
                None => {
                    // Strictly deeper only: ties keep the first leaf found.
                    if path.len() > best.len() && node.is_leaf() {
                        best.clone_from(&path);
                    }
                    stack.pop();
                    path.pop();
                }
            }
        }

        best
    }

    /// Unlink and return the deepest leaf below `self`, or `None` if `self`
    /// is itself a leaf.
    pub(crate) fn detach_deepest_leaf(&mut self) -> Option<Box<Self>> {
        let path = self.deepest_leaf_path();
        let (&last, prefix) = path.split_last()?;
        let mut parent = self;
        for &i in prefix {
            parent = parent.children[i].as_deref_mut()?;
        }
        parent.children[last].take()
    }
}

/// Free a subtree one node at a time.
pub(crate) fn release<K, V, const ORDER: usize>(link: Link<K, V, ORDER>) {
    let mut stack: Vec<Box<Node<K, V, ORDER>>> = link.into_iter().collect();
    while let Some(mut node) = stack.pop() {
        stack.extend(node.children.iter_mut().filter_map(Option::take));
        // `node` drops here with every slot already empty.
    }
}

/// Deep copy of a subtree with identical shape.
pub(crate) fn clone_link<K: Clone, V: Clone, const ORDER: usize>(
    link: &Link<K, V, ORDER>,
) -> Link<K, V, ORDER> {
    struct Frame<'a, K, V, const ORDER: usize> {
        src: &'a Node<K, V, ORDER>,
        dst: Box<Node<K, V, ORDER>>,
        /// Next source slot to copy.
        next: usize,
        /// Slot this node occupies in its parent.
        slot: usize,
    }

    let root = link.as_deref()?;
    let mut stack = vec![Frame {
        src: root,
        dst: Node::new(root.key.clone(), root.value.clone()),
        next: 0,
        slot: 0,
    }];

    while let Some(top) = stack.last_mut() {
        let src = top.src;
        let next = (top.next..ORDER)
            .find_map(|i| src.children[i].as_deref().map(|child| (i, child)));
        match next {
            Some((i, child)) => {
                top.next = i + 1;
                stack.push(Frame {
                    src: child,
                    dst: Node::new(child.key.clone(), child.value.clone()),
                    next: 0,
                    slot: i,
                });
            }
            None => {
                let Some(done) = stack.pop() else { break };
                match stack.last_mut() {
                    Some(parent) => parent.dst.children[done.slot] = Some(done.dst),
                    None => return Some(done.dst),
                }
            }
        }
    }

    None
}
