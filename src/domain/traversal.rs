use std::fmt;
use std::iter::FusedIterator;

use generational_arena::Index;

use crate::domain::arena::BinarySearchTree;

/// Read-only view of one node.
///
/// Borrows the tree, so it cannot outlive or observe a mutation.
pub struct NodeRef<'a, K> {
    tree: &'a BinarySearchTree<K>,
    idx: Index,
}

impl<'a, K> NodeRef<'a, K> {
    pub(crate) fn new(tree: &'a BinarySearchTree<K>, idx: Index) -> Self {
        Self { tree, idx }
    }

    pub fn key(&self) -> &'a K {
        &self.tree.node(self.idx).key
    }

    pub fn parent(&self) -> Option<NodeRef<'a, K>> {
        self.link(self.tree.node(self.idx).parent)
    }

    pub fn left(&self) -> Option<NodeRef<'a, K>> {
        self.link(self.tree.node(self.idx).left)
    }

    pub fn right(&self) -> Option<NodeRef<'a, K>> {
        self.link(self.tree.node(self.idx).right)
    }

    pub fn is_leaf(&self) -> bool {
        self.tree.node(self.idx).is_leaf()
    }

    pub fn is_root(&self) -> bool {
        self.tree.root_index() == Some(self.idx)
    }

    /// Node with the smallest key greater than this one.
    pub fn successor(&self) -> Option<NodeRef<'a, K>> {
        self.link(self.tree.successor_index(self.idx))
    }

    /// Node with the greatest key smaller than this one.
    pub fn predecessor(&self) -> Option<NodeRef<'a, K>> {
        self.link(self.tree.predecessor_index(self.idx))
    }

    fn link(&self, idx: Option<Index>) -> Option<NodeRef<'a, K>> {
        idx.map(|idx| NodeRef::new(self.tree, idx))
    }
}

impl<K> Clone for NodeRef<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for NodeRef<'_, K> {}

impl<K> PartialEq for NodeRef<'_, K> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.idx == other.idx
    }
}

impl<K> Eq for NodeRef<'_, K> {}

impl<K: fmt::Debug> fmt::Debug for NodeRef<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.tree.node(self.idx);
        let key_of = |idx: Option<Index>| idx.map(|idx| &self.tree.node(idx).key);
        f.debug_struct("NodeRef")
            .field("key", &node.key)
            .field("parent", &key_of(node.parent))
            .field("left", &key_of(node.left))
            .field("right", &key_of(node.right))
            .finish()
    }
}

/// Ascending traversal following successor links, no auxiliary stack.
pub struct InOrder<'a, K> {
    tree: &'a BinarySearchTree<K>,
    front: Option<Index>,
    back: Option<Index>,
    remaining: usize,
}

impl<'a, K> InOrder<'a, K> {
    pub(crate) fn new(tree: &'a BinarySearchTree<K>) -> Self {
        let root = tree.root_index();
        Self {
            tree,
            front: root.map(|root| tree.most_left(root)),
            back: root.map(|root| tree.most_right(root)),
            remaining: tree.len(),
        }
    }
}

// Manual impl: derive would add a `K: Clone` bound.
impl<K> Clone for InOrder<'_, K> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K> Iterator for InOrder<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.front?;
        self.remaining -= 1;
        self.front = self.tree.successor_index(current);
        Some(&self.tree.node(current).key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> DoubleEndedIterator for InOrder<'_, K> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.back?;
        self.remaining -= 1;
        self.back = self.tree.predecessor_index(current);
        Some(&self.tree.node(current).key)
    }
}

impl<K> ExactSizeIterator for InOrder<'_, K> {}

impl<K> FusedIterator for InOrder<'_, K> {}
