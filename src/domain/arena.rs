//! Arena-backed binary search tree.
//!
//! Nodes live in a generational arena owned by the tree. The `left`/`right` slots are
//! the owning edges: a node stays allocated exactly as long as one parent slot (or the
//! root slot) refers to it. `parent` is a plain back-reference for upward navigation.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::mem;

use generational_arena::{Arena, Index};
use itertools::Itertools;
use tracing::{debug, instrument, trace};

use crate::domain::error::{TreeError, TreeResult};
use crate::domain::traversal::{InOrder, NodeRef};

/// Tree node in the arena: one key plus its structural links.
#[derive(Debug)]
pub struct Node<K> {
    /// Stored key, swapped in place when a two-children node is deleted
    pub(crate) key: K,
    /// Index of the parent node, None for the root
    pub(crate) parent: Option<Index>,
    /// Owning edge to the left subtree (smaller keys)
    pub(crate) left: Option<Index>,
    /// Owning edge to the right subtree (greater keys)
    pub(crate) right: Option<Index>,
}

impl<K> Node<K> {
    fn new(key: K, parent: Option<Index>) -> Self {
        Self {
            key,
            parent,
            left: None,
            right: None,
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    fn children(&self) -> impl Iterator<Item = Index> {
        self.left.into_iter().chain(self.right)
    }
}

/// Child slot of a parent node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Unbalanced binary search tree over totally ordered keys.
///
/// Duplicate inserts are no-ops and deleting a missing key leaves the tree untouched.
/// No rebalancing happens, so the height can degrade to the number of keys; every
/// algorithm here is iterative to keep stack usage independent of the height.
pub struct BinarySearchTree<K> {
    /// Arena storage for all nodes reachable from `root`
    arena: Arena<Node<K>>,
    /// Index of the root node, None for an empty tree
    root: Option<Index>,
}

impl<K> Default for BinarySearchTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> BinarySearchTree<K> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// True if the tree holds no keys.
    pub fn empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.empty()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    #[instrument(level = "trace", skip_all)]
    pub fn clear(&mut self) {
        debug!(len = self.arena.len(), "clearing tree");
        self.arena.clear();
        self.root = None;
    }

    pub fn root(&self) -> Option<NodeRef<'_, K>> {
        self.root.map(|idx| NodeRef::new(self, idx))
    }

    /// Smallest key, None on an empty tree.
    pub fn min(&self) -> Option<&K> {
        self.root.map(|root| &self.node(self.most_left(root)).key)
    }

    /// Greatest key, None on an empty tree.
    pub fn max(&self) -> Option<&K> {
        self.root.map(|root| &self.node(self.most_right(root)).key)
    }

    /// Number of levels: 0 for an empty tree, 1 for a single node.
    #[instrument(level = "trace", skip_all)]
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(Index, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();

        while let Some((idx, depth)) = stack.pop() {
            height = height.max(depth);
            stack.extend(self.node(idx).children().map(|child| (child, depth + 1)));
        }

        height
    }

    /// Keys in ascending order. Every call starts a fresh traversal.
    pub fn in_order(&self) -> InOrder<'_, K> {
        InOrder::new(self)
    }

    pub fn iter(&self) -> InOrder<'_, K> {
        self.in_order()
    }

    pub(crate) fn root_index(&self) -> Option<Index> {
        self.root
    }

    // Every index stored in the tree refers to a live arena slot.
    pub(crate) fn node(&self, idx: Index) -> &Node<K> {
        &self.arena[idx]
    }

    pub(crate) fn most_left(&self, mut idx: Index) -> Index {
        while let Some(left) = self.node(idx).left {
            idx = left;
        }
        idx
    }

    pub(crate) fn most_right(&self, mut idx: Index) -> Index {
        while let Some(right) = self.node(idx).right {
            idx = right;
        }
        idx
    }

    /// Next node in key order: leftmost node of the right subtree, otherwise the nearest
    /// ancestor whose left subtree contains `idx`.
    pub(crate) fn successor_index(&self, idx: Index) -> Option<Index> {
        if let Some(right) = self.node(idx).right {
            return Some(self.most_left(right));
        }
        let mut child = idx;
        let mut parent = self.node(idx).parent;
        while let Some(p) = parent {
            if self.node(p).left == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self.node(p).parent;
        }
        None
    }

    /// Mirror of [`Self::successor_index`].
    pub(crate) fn predecessor_index(&self, idx: Index) -> Option<Index> {
        if let Some(left) = self.node(idx).left {
            return Some(self.most_right(left));
        }
        let mut child = idx;
        let mut parent = self.node(idx).parent;
        while let Some(p) = parent {
            if self.node(p).right == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self.node(p).parent;
        }
        None
    }

    /// Parent of `idx` and the slot `idx` occupies in it.
    fn slot_of(&self, idx: Index) -> Option<(Index, Side)> {
        let parent = self.node(idx).parent?;
        let side = if self.node(parent).left == Some(idx) {
            Side::Left
        } else {
            Side::Right
        };
        Some((parent, side))
    }

    fn set_child(&mut self, parent: Index, side: Side, child: Option<Index>) {
        let node = &mut self.arena[parent];
        match side {
            Side::Left => node.left = child,
            Side::Right => node.right = child,
        }
    }

    /// Puts `child` into the slot held by `idx` (parent slot or root) and frees `idx`.
    fn splice(&mut self, idx: Index, child: Option<Index>) {
        let slot = self.slot_of(idx);
        if let Some(child) = child {
            self.arena[child].parent = slot.map(|(parent, _)| parent);
        }
        match slot {
            Some((parent, side)) => self.set_child(parent, side, child),
            None => self.root = child,
        }
        self.arena.remove(idx);
    }

    fn delete_node(&mut self, idx: Index) {
        let node = self.node(idx);
        match (node.left, node.right) {
            (None, None) => {
                trace!("deleting leaf");
                self.splice(idx, None);
            }
            (Some(child), None) | (None, Some(child)) => {
                trace!("deleting node with one child");
                self.splice(idx, Some(child));
            }
            (Some(_), Some(right)) => {
                // The successor has no left child, so the second pass is a leaf or
                // one-child deletion.
                let successor = self.most_left(right);
                trace!("deleting node with two children via its successor");
                if let (Some(target), Some(donor)) = self.arena.get2_mut(idx, successor) {
                    mem::swap(&mut target.key, &mut donor.key);
                }
                self.delete_node(successor);
            }
        }
    }
}

impl<K: Ord> BinarySearchTree<K> {
    /// Inserts `key` unless an equal key is present. Returns true if the tree changed.
    #[instrument(level = "trace", skip_all)]
    pub fn insert(&mut self, key: K) -> bool {
        let Some(mut current) = self.root else {
            self.root = Some(self.arena.insert(Node::new(key, None)));
            trace!("inserted root");
            return true;
        };

        loop {
            let node = self.node(current);
            let (side, next) = match key.cmp(&node.key) {
                Ordering::Less => (Side::Left, node.left),
                Ordering::Greater => (Side::Right, node.right),
                Ordering::Equal => {
                    trace!("key already present");
                    return false;
                }
            };
            match next {
                Some(child) => current = child,
                None => {
                    let idx = self.arena.insert(Node::new(key, Some(current)));
                    self.set_child(current, side, Some(idx));
                    trace!(?side, len = self.arena.len(), "inserted leaf");
                    return true;
                }
            }
        }
    }

    /// Removes the node holding `key`. Returns true if a key was removed.
    #[instrument(level = "trace", skip_all)]
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.find_index(key) {
            Some(idx) => {
                self.delete_node(idx);
                debug!(len = self.arena.len(), "deleted key");
                true
            }
            None => {
                trace!("key not present, nothing to delete");
                false
            }
        }
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_index(key).is_some()
    }

    /// Node holding `key`, None if absent.
    pub fn find_by_key<Q>(&self, key: &Q) -> Option<NodeRef<'_, K>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_index(key).map(|idx| NodeRef::new(self, idx))
    }

    fn find_index<Q>(&self, key: &Q) -> Option<Index>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.root;
        while let Some(idx) = cursor {
            let node = self.node(idx);
            cursor = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(idx),
            };
        }
        None
    }

    /// Checks order, parent consistency and reachability; reports the first violation.
    #[instrument(level = "debug", skip_all)]
    pub fn validate(&self) -> TreeResult<()> {
        let Some(root) = self.root else {
            return match self.arena.len() {
                0 => Ok(()),
                stored => Err(TreeError::LengthMismatch {
                    reachable: 0,
                    stored,
                }),
            };
        };
        let root_node = self
            .arena
            .get(root)
            .ok_or(TreeError::DanglingIndex { depth: 1 })?;
        if root_node.parent.is_some() {
            return Err(TreeError::RootHasParent);
        }

        // (node, depth, exclusive lower bound, exclusive upper bound)
        let mut stack: Vec<(Index, usize, Option<&K>, Option<&K>)> = vec![(root, 1, None, None)];
        let mut reachable = 0;

        while let Some((idx, depth, lower, upper)) = stack.pop() {
            reachable += 1;
            if reachable > self.arena.len() {
                return Err(TreeError::Cycle);
            }
            let node = self
                .arena
                .get(idx)
                .ok_or(TreeError::DanglingIndex { depth })?;

            let above_lower = lower.map_or(true, |bound| node.key > *bound);
            let below_upper = upper.map_or(true, |bound| node.key < *bound);
            if !(above_lower && below_upper) {
                return Err(TreeError::OrderViolation { depth });
            }
            if node.left.is_some() && node.left == node.right {
                return Err(TreeError::ParentMismatch { depth: depth + 1 });
            }

            for (child, side) in [(node.left, Side::Left), (node.right, Side::Right)] {
                let Some(child) = child else { continue };
                let child_node = self
                    .arena
                    .get(child)
                    .ok_or(TreeError::DanglingIndex { depth: depth + 1 })?;
                if child_node.parent != Some(idx) {
                    return Err(TreeError::ParentMismatch { depth: depth + 1 });
                }
                match side {
                    Side::Left => stack.push((child, depth + 1, lower, Some(&node.key))),
                    Side::Right => stack.push((child, depth + 1, Some(&node.key), upper)),
                }
            }
        }

        if reachable != self.arena.len() {
            return Err(TreeError::LengthMismatch {
                reachable,
                stored: self.arena.len(),
            });
        }
        Ok(())
    }
}

impl<K: fmt::Display> BinarySearchTree<K> {
    /// Writes the keys in ascending order to stdout, separated by spaces.
    pub fn print_in_order(&self) {
        println!("{}", self);
    }
}

impl<K: fmt::Display> fmt::Display for BinarySearchTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iter().join(" "))
    }
}

impl<K: fmt::Debug> fmt::Debug for BinarySearchTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinarySearchTree")
            .field("len", &self.len())
            .field("height", &self.height())
            .field("keys", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<K: Ord> FromIterator<K> for BinarySearchTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for BinarySearchTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K> IntoIterator for &'a BinarySearchTree<K> {
    type Item = &'a K;
    type IntoIter = InOrder<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.in_order()
    }
}
