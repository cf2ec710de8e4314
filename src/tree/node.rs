use std::ptr;
use std::fmt;

use crate::slab::{Ptr, Slab};

/// A single cell of the tree as it is stored in the slab
///
/// The `left` and `right` links own the subtrees hanging from them: freeing a node frees every
/// node still attached below it. The `parent` link is only ever used to navigate upwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InnerNode<K> {
    key: K,
    parent: Option<Ptr>,
    left: Option<Ptr>,
    right: Option<Ptr>,
}

impl<K: Default> Default for InnerNode<K> {
    fn default() -> Self {
        Self::new(K::default())
    }
}

impl<K> InnerNode<K> {
    pub(crate) fn new(key: K) -> Self {
        Self {
            key,
            parent: None,
            left: None,
            right: None,
        }
    }

    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    pub(crate) fn parent(&self) -> Option<Ptr> {
        self.parent
    }

    pub(crate) fn left(&self) -> Option<Ptr> {
        self.left
    }

    pub(crate) fn right(&self) -> Option<Ptr> {
        self.right
    }

    /// New key MUST maintain BST property
    pub(crate) fn set_key(&mut self, key: K) -> K {
        std::mem::replace(&mut self.key, key)
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Ptr>) {
        self.parent = parent;
    }

    /// New subtree MUST maintain BST property
    pub(crate) fn set_left(&mut self, left: Option<Ptr>) {
        self.left = left;
    }

    /// New subtree MUST maintain BST property
    pub(crate) fn set_right(&mut self, right: Option<Ptr>) {
        self.right = right;
    }

    /// Unlinks this node from its parent and both of its children without freeing anything
    ///
    /// Must be called on a node before it is freed whenever its children have been relinked
    /// elsewhere. Otherwise freeing the node would take those subtrees with it.
    pub(crate) fn detach(&mut self) {
        self.parent = None;
        self.left = None;
        self.right = None;
    }

    #[cfg(test)]
    pub(crate) fn is_detached(&self) -> bool {
        self.parent.is_none() && self.left.is_none() && self.right.is_none()
    }

    pub(crate) fn into_key(self) -> K {
        self.key
    }
}

/// A single node of the binary search tree
///
/// Nodes are read-only views into a `BSTree`. Keys cannot be modified through a node since that
/// could invalidate the ordering properties of the tree.
pub struct Node<'a, K> {
    nodes: &'a Slab<InnerNode<K>>,
    node: &'a InnerNode<K>,
}

impl<'a, K> fmt::Debug for Node<'a, K>
    where K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only print the parent's key, printing the whole parent would recurse back into this node
        f.debug_struct("Node")
            .field("key", self.key())
            .field("parent", &self.parent().map(|parent| parent.key()))
            .field("left", &self.left())
            .field("right", &self.right())
            .finish()
    }
}

impl<'a, K> Clone for Node<'a, K> {
    fn clone(&self) -> Self {
        Self {..*self}
    }
}

impl<'a, K> Copy for Node<'a, K> {}

impl<'a, K: PartialEq> PartialEq for Node<'a, K> {
    fn eq(&self, other: &Self) -> bool {
        // If the pointers are the same, the keys are guaranteed to be equal (similar to `Arc`
        // using `ptr_eq` to optimize its `PartialEq` impl)
        let ptr_eq = ptr::eq(self.nodes, other.nodes) && ptr::eq(self.node, other.node);
        ptr_eq || self.key().eq(other.key())
    }
}

impl<'a, K: Eq> Eq for Node<'a, K> {}

impl<'a, K> Node<'a, K> {
    /// Creates a new `Node` for the entry at `ptr`
    ///
    /// Panics if `ptr` does not refer to a node in `nodes`.
    pub(crate) fn new(nodes: &'a Slab<InnerNode<K>>, ptr: Ptr) -> Self {
        Self {nodes, node: &nodes[ptr]}
    }

    /// Returns the key of this node
    pub fn key(&self) -> &'a K {
        &self.node.key
    }

    /// Returns the parent of this node, or `None` if this node is the root
    pub fn parent(&self) -> Option<Self> {
        // Nodes only contain pointers to other nodes within `self.nodes`
        self.node.parent.map(|ptr| Self::new(self.nodes, ptr))
    }

    /// Returns the left child node (subtree) of this node, if any
    pub fn left(&self) -> Option<Self> {
        self.node.left.map(|ptr| Self::new(self.nodes, ptr))
    }

    /// Returns the right child node (subtree) of this node, if any
    pub fn right(&self) -> Option<Self> {
        self.node.right.map(|ptr| Self::new(self.nodes, ptr))
    }

    /// Returns true if this node has a left subtree
    pub fn has_left(&self) -> bool {
        self.node.left.is_some()
    }

    /// Returns true if this node has a right subtree
    pub fn has_right(&self) -> bool {
        self.node.right.is_some()
    }

    /// Returns true if this node is the root of its tree
    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    /// Returns true if this node has no children
    pub fn is_leaf(&self) -> bool {
        !self.has_left() && !self.has_right()
    }
}
