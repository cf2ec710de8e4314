use std::mem;
use std::cmp::Ordering;
use std::borrow::Borrow;
use std::iter::FromIterator;

mod node;
mod preorder;
mod inorder;
mod postorder;

pub use node::*;
pub use preorder::*;
pub use inorder::*;
pub use postorder::*;

type Link<K> = Option<Box<Node<K>>>;

/// A "simple" BST that uses `Box` for internal storage and keeps no parent links
///
/// Used to check the `bstree` crate. Duplicate keys go to the left, and deleting a key with two
/// children moves the smallest key of its right subtree into its place, so both trees always end
/// up with the same shape for the same sequence of operations.
#[derive(Debug, Clone)]
pub struct SimpleBSTree<K> {
    root: Link<K>,
    len: usize,
}

impl<K> Default for SimpleBSTree<K> {
    fn default() -> Self {
        Self {
            root: None,
            len: 0,
        }
    }
}

impl<K: Ord> PartialEq for SimpleBSTree<K> {
    fn eq(&self, other: &Self) -> bool {
        // Trees with the same keys can have different shapes, so only the sorted order matters
        self.len() == other.len() && self.iter_inorder().eq(other.iter_inorder())
    }
}

impl<K: Ord> Eq for SimpleBSTree<K> {}

impl<K: Ord> SimpleBSTree<K> {
    /// Creates an empty `SimpleBSTree`
    ///
    /// # Examples
    ///
    /// ```
    /// use simple_bstree::SimpleBSTree;
    /// let mut tree: SimpleBSTree<i32> = SimpleBSTree::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of keys in the tree, duplicates included
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        debug_assert!(self.len != 0 || self.root.is_none());
        self.len == 0
    }

    /// Returns `true` if some node of the tree holds the given key
    ///
    /// ```
    /// use simple_bstree::SimpleBSTree;
    ///
    /// let mut tree = SimpleBSTree::new();
    /// tree.insert(1);
    /// assert!(tree.contains(&1));
    /// assert!(!tree.contains(&2));
    /// ```
    pub fn contains<Q>(&self, key: &Q) -> bool
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        let mut current = self.root();
        while let Some(node) = current {
            match key.cmp(node.key().borrow()) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => current = node.right(),
                Ordering::Equal => return true,
            }
        }

        false
    }

    /// Returns the smallest key in the tree
    pub fn min(&self) -> Option<&K> {
        let mut current = self.root()?;
        while let Some(left) = current.left() {
            current = left;
        }

        Some(current.key())
    }

    /// Returns the largest key in the tree
    pub fn max(&self) -> Option<&K> {
        let mut current = self.root()?;
        while let Some(right) = current.right() {
            current = right;
        }

        Some(current.key())
    }

    /// Returns the number of nodes on the longest path from the root to a leaf
    pub fn height(&self) -> usize {
        fn height_of<K>(node: Option<&Node<K>>) -> usize {
            match node {
                Some(node) => 1 + height_of(node.left()).max(height_of(node.right())),
                None => 0,
            }
        }

        height_of(self.root())
    }

    /// Inserts a key into the tree
    ///
    /// A key equal to the key of a node it passes is placed in that node's left subtree.
    ///
    /// ```
    /// use simple_bstree::SimpleBSTree;
    ///
    /// let mut tree = SimpleBSTree::new();
    /// tree.insert(1);
    /// tree.insert(1);
    /// assert_eq!(tree.len(), 2);
    /// assert_eq!(tree.height(), 2);
    /// ```
    pub fn insert(&mut self, key: K) {
        Self::insert_into(&mut self.root, key);
        self.len += 1;
    }

    fn insert_into(link: &mut Link<K>, key: K) {
        match link {
            Some(node) => if key <= node.key {
                Self::insert_into(&mut node.left, key)
            } else {
                Self::insert_into(&mut node.right, key)
            },

            None => *link = Some(Box::new(Node::new(key))),
        }
    }

    /// Removes the first node found holding the given key
    ///
    /// Returns `true` if a node was removed.
    ///
    /// ```
    /// use simple_bstree::SimpleBSTree;
    ///
    /// let mut tree = SimpleBSTree::new();
    /// tree.insert(1);
    /// assert!(tree.remove(&1));
    /// assert!(!tree.remove(&1));
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> bool
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        let removed = Self::remove_from(&mut self.root, key);
        if removed {
            self.len -= 1;
        }

        removed
    }

    fn remove_from<Q>(link: &mut Link<K>, key: &Q) -> bool
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        let node = match link {
            Some(node) => node,
            None => return false,
        };

        match key.cmp(node.key.borrow()) {
            Ordering::Less => return Self::remove_from(&mut node.left, key),
            Ordering::Greater => return Self::remove_from(&mut node.right, key),
            Ordering::Equal => {},
        }

        Self::remove_node(link).is_some()
    }

    /// Removes the node at `link` and returns its key
    ///
    /// A node with two children takes the smallest key of its right subtree, and that key is
    /// then removed from the right subtree the same way.
    fn remove_node(link: &mut Link<K>) -> Option<K> {
        let node = link.as_mut()?;
        if node.has_left() && node.has_right() {
            let successor = Self::take_min(&mut node.right)?;
            return Some(mem::replace(&mut node.key, successor));
        }

        let mut removed = link.take()?;
        *link = removed.left.take().or_else(|| removed.right.take());
        Some(removed.key)
    }

    /// Removes the copy of the smallest key of the subtree that is closest to its root
    fn take_min(link: &mut Link<K>) -> Option<K> {
        // Number of steps down the left spine to reach that copy
        let steps = {
            let mut spine = Vec::new();
            let mut current = link.as_deref();
            while let Some(node) = current {
                spine.push(node.key());
                current = node.left();
            }

            let min = *spine.last()?;
            spine.iter().position(|&key| key == min)?
        };

        let mut target = link;
        for _ in 0..steps {
            target = &mut target.as_mut()?.left;
        }

        Self::remove_node(target)
    }

    /// Removes every key from the tree
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    pub fn root(&self) -> Option<&Node<K>> {
        self.root.as_deref()
    }

    pub fn iter_preorder(&self) -> IterPreorder<'_, K> {
        IterPreorder::new(self.root())
    }

    pub fn iter_inorder(&self) -> IterInorder<'_, K> {
        IterInorder::new(self.root())
    }

    pub fn iter_postorder(&self) -> IterPostorder<'_, K> {
        IterPostorder::new(self.root())
    }
}

impl<K: Ord> Extend<K> for SimpleBSTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord> FromIterator<K> for SimpleBSTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}
