mod node;
mod preorder;
mod inorder;
mod postorder;
mod traversal;

pub use node::Node;
pub use preorder::*;
pub use inorder::*;
pub use postorder::*;
pub use traversal::*;

use std::fmt;
use std::io::{self, Write};
use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::iter::FromIterator;

use crate::slab::{Ptr, Slab};

use node::InnerNode;

/// A binary search tree (BST) whose nodes know their parent
///
/// BST properties: For each node with key `k`:
/// - The key of each node in the left subtree is less than or equal to `k`
/// - The key of each node in the right subtree is greater than `k`
///
/// Duplicate keys are allowed. A key equal to an existing key is always inserted into the left
/// subtree of that key. Deleting a node with two children moves its successor's key into it, so
/// copies of that key may afterwards also appear in its right subtree.
///
/// The tree never rebalances itself. Inserting keys in sorted order produces a chain whose height
/// equals the number of keys.
///
/// Nodes are stored in a slab and refer to each other by index, so the parent links never
/// participate in ownership and dropping the tree never recurses.
#[derive(Clone)]
pub struct BSTree<K> {
    nodes: Slab<InnerNode<K>>,
    root: Option<Ptr>,
}

impl<K> Default for BSTree<K> {
    fn default() -> Self {
        Self {
            nodes: Default::default(),
            root: None,
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for BSTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BSTree")
            .field("len", &self.nodes.len())
            .field("root", &self.root.map(|ptr| Node::new(&self.nodes, ptr)))
            .finish()
    }
}

impl<K: PartialEq> PartialEq for BSTree<K> {
    fn eq(&self, other: &Self) -> bool {
        // Two trees built from the same keys in a different order have different shapes, so only
        // the sorted order of the keys is compared
        if self.nodes.len() != other.nodes.len() {
            return false;
        }

        IterInorder::new(&self.nodes, self.root).eq(IterInorder::new(&other.nodes, other.root))
    }
}

impl<K: Eq> Eq for BSTree<K> {}

impl<K: Ord> BSTree<K> {
    /// Creates an empty `BSTree`
    ///
    /// The tree is initially created with a capacity of 0, so it will not allocate until it is
    /// first inserted into.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::BSTree;
    /// let mut tree: BSTree<i32> = BSTree::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty tree with space for at least `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Slab::with_capacity(capacity),
            root: None,
        }
    }

    /// Returns the number of nodes in the tree
    ///
    /// Time complexity: `O(1)`
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree is empty
    ///
    /// Time complexity: `O(1)`
    pub fn is_empty(&self) -> bool {
        debug_assert!(self.nodes.is_empty() == self.root.is_none());
        self.nodes.is_empty()
    }

    /// Returns the number of nodes the tree can hold without reallocating
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Reserves capacity for at least `additional` more nodes
    pub fn reserve(&mut self, additional: usize) {
        self.nodes.reserve(additional)
    }

    /// Shrinks the capacity of the tree as much as possible
    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit()
    }

    /// Removes every node from the tree
    ///
    /// Note that this method has no effect on the allocated capacity of the tree.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Inserts a key into the tree as a new leaf
    ///
    /// Keys less than or equal to a node's key go into its left subtree, greater keys go into its
    /// right subtree. Inserting a key that is already present adds another node for it.
    ///
    /// Time complexity: `O(h)` where `h` is the height of the tree
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::BSTree;
    ///
    /// let mut tree = BSTree::new();
    /// tree.insert(37);
    /// tree.insert(37);
    /// assert_eq!(tree.len(), 2);
    /// assert!(tree.search(&37));
    /// ```
    pub fn insert(&mut self, key: K) {
        // `parent` trails one step behind `current` and ends up as the parent of the new leaf
        let mut parent = None;
        let mut current = self.root;
        while let Some(ptr) = current {
            parent = Some(ptr);

            let node = &self.nodes[ptr];
            current = if key <= *node.key() {
                node.left()
            } else {
                node.right()
            };
        }

        let mut leaf = InnerNode::new(key);
        leaf.set_parent(parent);
        let leaf_ptr = self.nodes.push(leaf);

        match parent {
            None => self.root = Some(leaf_ptr),

            Some(parent_ptr) => {
                let goes_left = self.nodes[leaf_ptr].key() <= self.nodes[parent_ptr].key();
                let parent = &mut self.nodes[parent_ptr];
                if goes_left {
                    parent.set_left(Some(leaf_ptr));
                } else {
                    parent.set_right(Some(leaf_ptr));
                }
            },
        }
    }

    /// Returns `true` if the tree contains a node with the given key
    ///
    /// The key may be any borrowed form of the tree's key type, but the ordering on the borrowed
    /// form must match the ordering on the key type.
    ///
    /// Time complexity: `O(h)`
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::BSTree;
    ///
    /// let mut tree = BSTree::new();
    /// tree.insert(String::from("abc"));
    /// assert!(tree.search("abc"));
    /// assert!(!tree.search("def"));
    /// ```
    pub fn search<Q>(&self, key: &Q) -> bool
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        self.search_from(self.root, key).is_some()
    }

    /// Returns the node with the given key, or `None` if no such key exists in the tree
    ///
    /// With duplicate keys, this is the node closest to the root.
    pub fn find<Q>(&self, key: &Q) -> Option<Node<'_, K>>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        self.search_from(self.root, key).map(|ptr| Node::new(&self.nodes, ptr))
    }

    /// Returns the smallest key in the tree, or `None` if the tree is empty
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::bstree;
    ///
    /// let tree = bstree![50, 30, 70];
    /// assert_eq!(tree.min(), Some(&30));
    /// assert_eq!(tree.max(), Some(&70));
    /// ```
    pub fn min(&self) -> Option<&K> {
        self.min_from(self.root).map(|ptr| self.nodes[ptr].key())
    }

    /// Returns the largest key in the tree, or `None` if the tree is empty
    pub fn max(&self) -> Option<&K> {
        self.max_from(self.root).map(|ptr| self.nodes[ptr].key())
    }

    /// Returns the next key after `key` in ascending order
    ///
    /// Returns `None` if `key` is not in the tree or if it is the largest key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::bstree;
    ///
    /// let tree = bstree![50, 30, 70, 20, 40];
    /// assert_eq!(tree.successor(&40), Some(&50));
    /// assert_eq!(tree.successor(&70), None);
    /// assert_eq!(tree.successor(&45), None);
    /// ```
    pub fn successor<Q>(&self, key: &Q) -> Option<&K>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        self.successor_from(self.root, key).map(|ptr| self.nodes[ptr].key())
    }

    /// Returns the previous key before `key` in ascending order
    ///
    /// Returns `None` if `key` is not in the tree or if it is the smallest key.
    pub fn predecessor<Q>(&self, key: &Q) -> Option<&K>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        self.predecessor_from(self.root, key).map(|ptr| self.nodes[ptr].key())
    }

    /// Removes one node holding `key` from the tree
    ///
    /// Returns `true` if a node was removed. Deleting a key that is not in the tree (including
    /// deleting from an empty tree) does nothing and returns `false`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::bstree;
    ///
    /// let mut tree = bstree![50, 30, 70, 20, 40];
    /// assert!(tree.delete(&30));
    /// assert!(!tree.delete(&30));
    /// assert_eq!(tree.iter_inorder().copied().collect::<Vec<_>>(), &[20, 40, 50, 70]);
    /// ```
    pub fn delete<Q>(&mut self, key: &Q) -> bool
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        self.delete_from(self.root, key)
    }

    /// Returns the number of nodes on the longest path from the root to a leaf
    ///
    /// An empty tree has height 0 and a tree with a single node has height 1.
    pub fn height(&self) -> usize {
        self.height_from(self.root)
    }

    /// Returns the depth of the node holding `key`, counting the root as depth 1
    ///
    /// Returns `None` if `key` is not in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::bstree;
    ///
    /// let tree = bstree![50, 30, 70, 20, 40];
    /// assert_eq!(tree.depth(&50), Some(1));
    /// assert_eq!(tree.depth(&20), Some(3));
    /// assert_eq!(tree.depth(&21), None);
    /// ```
    pub fn depth<Q>(&self, key: &Q) -> Option<usize>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        self.depth_of(self.search_from(self.root, key))
    }

    /// Same as `depth`, but computed with a loop instead of recursion
    pub fn depth_iterative<Q>(&self, key: &Q) -> Option<usize>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        self.depth_iterative_of(self.search_from(self.root, key))
    }

    /// Overwrites the keys of the tree in ascending order with the given values, without changing
    /// the shape of the tree
    ///
    /// The smallest node receives the first value, its successor the second value, and so on. The
    /// values must be in ascending order for the tree to remain a valid BST.
    ///
    /// Returns the number of nodes that were overwritten. If there are fewer values than nodes,
    /// the remaining nodes keep their previous keys. Extra values are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::bstree;
    ///
    /// let mut tree = bstree![50, 30, 70];
    /// assert_eq!(tree.natural_fill(200..), 3);
    /// assert_eq!(tree.iter_preorder().copied().collect::<Vec<_>>(), &[201, 200, 202]);
    /// ```
    pub fn natural_fill<I>(&mut self, values: I) -> usize
        where I: IntoIterator<Item = K>,
    {
        let mut values = values.into_iter();

        let mut filled = 0;
        let mut current = self.min_from(self.root);
        while let Some(ptr) = current {
            let value = match values.next() {
                Some(value) => value,
                None => break,
            };

            self.nodes[ptr].set_key(value);
            filled += 1;

            // Successors only depend on the shape of the tree, so overwriting keys does not
            // affect the walk
            current = self.successor_of(ptr);
        }

        if filled < self.len() {
            tracing::warn!(
                filled,
                len = self.len(),
                "natural_fill ran out of values, remaining nodes keep their previous keys"
            );
        }

        filled
    }

    /// Writes every key of the tree to `out` in the given order, each followed by a space, and
    /// then terminates the line
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::{bstree, Traversal};
    ///
    /// let tree = bstree![50, 30, 70, 20, 40];
    /// let mut out = Vec::new();
    /// tree.print(Traversal::Inorder, &mut out).unwrap();
    /// assert_eq!(String::from_utf8(out).unwrap(), "20 30 40 50 70 \n");
    /// ```
    pub fn print<W: Write>(&self, traversal: Traversal, out: &mut W) -> io::Result<()>
        where K: fmt::Display,
    {
        match traversal {
            Traversal::Inorder => self.write_inorder(self.root, out)?,
            Traversal::Preorder => self.write_preorder(self.root, out)?,
            Traversal::Postorder => self.write_postorder(self.root, out)?,
        }

        writeln!(out)
    }

    /// Same as `print`, but the traversal is selected by name (`"inorder"`, `"preorder"` or
    /// `"postorder"`)
    ///
    /// An unrecognized name is reported on `err` and nothing but the line terminator is written
    /// to `out`. This is not treated as an error.
    pub fn print_named<W, E>(&self, method: &str, out: &mut W, err: &mut E) -> io::Result<()>
        where K: fmt::Display,
              W: Write,
              E: Write,
    {
        match method.parse::<Traversal>() {
            Ok(traversal) => self.print(traversal, out),

            Err(error) => {
                writeln!(err, "error: {}", error)?;
                writeln!(out)
            },
        }
    }

    /// Same as `print`, writing to standard output
    pub fn print_stdout(&self, traversal: Traversal) -> io::Result<()>
        where K: fmt::Display,
    {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.print(traversal, &mut out)
    }

    /// Performs a pre-order traversal of the tree
    pub fn iter_preorder(&self) -> IterPreorder<'_, K> {
        IterPreorder::new(&self.nodes, self.root)
    }

    /// Performs an in-order traversal of the tree
    pub fn iter_inorder(&self) -> IterInorder<'_, K> {
        IterInorder::new(&self.nodes, self.root)
    }

    /// Performs a post-order traversal of the tree
    pub fn iter_postorder(&self) -> IterPostorder<'_, K> {
        IterPostorder::new(&self.nodes, self.root)
    }

    /// Performs a traversal of the tree in the given order
    pub fn iter(&self, traversal: Traversal) -> Box<dyn Iterator<Item=&K> + '_> {
        match traversal {
            Traversal::Inorder => Box::new(self.iter_inorder()),
            Traversal::Preorder => Box::new(self.iter_preorder()),
            Traversal::Postorder => Box::new(self.iter_postorder()),
        }
    }

    /// Returns the root node of the tree, or `None` if the tree is empty
    ///
    /// This is a low-level API meant to be used for implementing custom traversals. Every node
    /// can reach its parent and both of its children.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::{bstree, Node};
    ///
    /// // Walks down to the leftmost leaf and back up to the root
    /// fn round_trip(node: Node<i32>) -> usize {
    ///     let mut current = node;
    ///     while let Some(left) = current.left() {
    ///         current = left;
    ///     }
    ///
    ///     let mut steps = 0;
    ///     while let Some(parent) = current.parent() {
    ///         current = parent;
    ///         steps += 1;
    ///     }
    ///     steps
    /// }
    ///
    /// let tree = bstree![50, 30, 70, 20, 40];
    /// assert_eq!(tree.root().map(round_trip), Some(2));
    /// ```
    pub fn root(&self) -> Option<Node<'_, K>> {
        self.root.map(|ptr| Node::new(&self.nodes, ptr))
    }

    fn search_from<Q>(&self, subtree: Option<Ptr>, key: &Q) -> Option<Ptr>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        let ptr = subtree?;
        let node = &self.nodes[ptr];
        match key.cmp(node.key().borrow()) {
            Ordering::Equal => Some(ptr),
            Ordering::Less => self.search_from(node.left(), key),
            Ordering::Greater => self.search_from(node.right(), key),
        }
    }

    fn min_from(&self, subtree: Option<Ptr>) -> Option<Ptr> {
        let ptr = subtree?;
        match self.nodes[ptr].left() {
            None => Some(ptr),
            left => self.min_from(left),
        }
    }

    fn max_from(&self, subtree: Option<Ptr>) -> Option<Ptr> {
        let ptr = subtree?;
        match self.nodes[ptr].right() {
            None => Some(ptr),
            right => self.max_from(right),
        }
    }

    fn successor_from<Q>(&self, subtree: Option<Ptr>, key: &Q) -> Option<Ptr>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        self.search_from(subtree, key).and_then(|ptr| self.successor_of(ptr))
    }

    fn predecessor_from<Q>(&self, subtree: Option<Ptr>, key: &Q) -> Option<Ptr>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        self.search_from(subtree, key).and_then(|ptr| self.predecessor_of(ptr))
    }

    /// Returns the node that follows `ptr` in in-order, using only the structure of the tree
    fn successor_of(&self, ptr: Ptr) -> Option<Ptr> {
        let node = &self.nodes[ptr];
        if node.right().is_some() {
            return self.min_from(node.right());
        }

        // Climb until we arrive at a parent from its left subtree
        let mut child = ptr;
        let mut parent = node.parent();
        while let Some(parent_ptr) = parent {
            let parent_node = &self.nodes[parent_ptr];
            if parent_node.right() != Some(child) {
                break;
            }

            child = parent_ptr;
            parent = parent_node.parent();
        }

        parent
    }

    /// Returns the node that precedes `ptr` in in-order, using only the structure of the tree
    fn predecessor_of(&self, ptr: Ptr) -> Option<Ptr> {
        let node = &self.nodes[ptr];
        if node.left().is_some() {
            return self.max_from(node.left());
        }

        // Climb until we arrive at a parent from its right subtree
        let mut child = ptr;
        let mut parent = node.parent();
        while let Some(parent_ptr) = parent {
            let parent_node = &self.nodes[parent_ptr];
            if parent_node.left() != Some(child) {
                break;
            }

            child = parent_ptr;
            parent = parent_node.parent();
        }

        parent
    }

    fn delete_from<Q>(&mut self, subtree: Option<Ptr>, key: &Q) -> bool
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        let ptr = match self.search_from(subtree, key) {
            Some(ptr) => ptr,
            None => {
                tracing::trace!(len = self.len(), "key not found, nothing to delete");
                return false;
            },
        };

        self.delete_node(ptr);
        true
    }

    /// Removes the node at `ptr` and returns the key it held
    ///
    /// A node with two children takes the key of its successor, and that key is then deleted
    /// from the node's right subtree. The node found for it there is the copy of the key closest
    /// to the top of the subtree, so any other copies stay behind in the right subtree.
    fn delete_node(&mut self, ptr: Ptr) -> Option<K> {
        let node = &self.nodes[ptr];
        let right = match (node.left(), node.right()) {
            (Some(_), Some(right)) => right,
            _ => return self.unlink(ptr),
        };

        let succ = self.min_from(Some(right))?;
        let target = self.search_from(Some(right), self.nodes[succ].key())?;
        let succ_key = self.delete_node(target)?;

        Some(self.nodes[ptr].set_key(succ_key))
    }

    /// Removes a node with at most one child from the tree, splicing its child (if any) into its
    /// place, and returns its key
    fn unlink(&mut self, ptr: Ptr) -> Option<K> {
        let node = &self.nodes[ptr];
        debug_assert!(node.left().is_none() || node.right().is_none(),
            "bug: only nodes with at most one child can be unlinked");

        let parent = node.parent();
        let child = node.left().or_else(|| node.right());

        match parent {
            None => self.root = child,

            Some(parent_ptr) => {
                let parent_node = &mut self.nodes[parent_ptr];
                if parent_node.left() == Some(ptr) {
                    parent_node.set_left(child);
                } else {
                    parent_node.set_right(child);
                }
            },
        }

        if let Some(child_ptr) = child {
            self.nodes[child_ptr].set_parent(parent);
        }

        // The child now hangs from the parent, so it must not be freed along with this node
        self.nodes[ptr].detach();
        self.free(ptr).map(InnerNode::into_key)
    }

    /// Frees the node at `ptr` along with every node still attached below it
    ///
    /// Uses an explicit stack so that freeing a deep subtree cannot overflow the call stack. The
    /// parent link is never followed.
    fn free(&mut self, ptr: Ptr) -> Option<InnerNode<K>> {
        let node = self.nodes.remove(ptr)?;

        let mut stack: Vec<Ptr> = node.left().into_iter().chain(node.right()).collect();
        while let Some(child) = stack.pop() {
            if let Some(child_node) = self.nodes.remove(child) {
                stack.extend(child_node.left());
                stack.extend(child_node.right());
            }
        }

        Some(node)
    }

    fn height_from(&self, subtree: Option<Ptr>) -> usize {
        match subtree {
            None => 0,
            Some(ptr) => {
                let node = &self.nodes[ptr];
                let left_height = self.height_from(node.left());
                let right_height = self.height_from(node.right());
                1 + cmp::max(left_height, right_height)
            },
        }
    }

    fn depth_of(&self, node: Option<Ptr>) -> Option<usize> {
        let ptr = node?;
        match self.nodes[ptr].parent() {
            // Only the root has no parent
            None => Some(1),
            parent => self.depth_of(parent).map(|depth| depth + 1),
        }
    }

    fn depth_iterative_of(&self, node: Option<Ptr>) -> Option<usize> {
        let mut current = node?;
        let mut depth = 1;
        while let Some(parent) = self.nodes[current].parent() {
            current = parent;
            depth += 1;
        }

        debug_assert_eq!(Some(current), self.root);
        Some(depth)
    }

    fn write_inorder<W: Write>(&self, subtree: Option<Ptr>, out: &mut W) -> io::Result<()>
        where K: fmt::Display,
    {
        if let Some(ptr) = subtree {
            let node = &self.nodes[ptr];
            self.write_inorder(node.left(), out)?;
            write!(out, "{} ", node.key())?;
            self.write_inorder(node.right(), out)?;
        }

        Ok(())
    }

    fn write_preorder<W: Write>(&self, subtree: Option<Ptr>, out: &mut W) -> io::Result<()>
        where K: fmt::Display,
    {
        if let Some(ptr) = subtree {
            let node = &self.nodes[ptr];
            write!(out, "{} ", node.key())?;
            self.write_preorder(node.left(), out)?;
            self.write_preorder(node.right(), out)?;
        }

        Ok(())
    }

    fn write_postorder<W: Write>(&self, subtree: Option<Ptr>, out: &mut W) -> io::Result<()>
        where K: fmt::Display,
    {
        if let Some(ptr) = subtree {
            let node = &self.nodes[ptr];
            self.write_postorder(node.left(), out)?;
            self.write_postorder(node.right(), out)?;
            write!(out, "{} ", node.key())?;
        }

        Ok(())
    }
}

impl<K: Ord> Extend<K> for BSTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord> FromIterator<K> for BSTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::prelude::*;
    use simple_bstree::SimpleBSTree;

    /// Checks the ordering of every key, the consistency of every parent link and that every node
    /// in the slab is reachable from the root
    ///
    /// Keys in a right subtree may be equal to their ancestor: deleting a node with two children
    /// can leave other copies of its successor's key below it on the right.
    fn assert_valid<K: Ord + fmt::Debug>(tree: &BSTree<K>) {
        // Each entry is (node, inclusive lower bound, inclusive upper bound)
        let mut stack: Vec<(Ptr, Option<&K>, Option<&K>)> = tree.root.into_iter()
            .map(|ptr| (ptr, None, None))
            .collect();
        let mut reachable = 0;

        if let Some(root) = tree.root {
            assert_eq!(tree.nodes[root].parent(), None, "root must not have a parent");
        }

        while let Some((ptr, lower, upper)) = stack.pop() {
            reachable += 1;
            let node = &tree.nodes[ptr];
            let key = node.key();

            if let Some(lower) = lower {
                assert!(key >= lower, "{:?} is in the right subtree of {:?}", key, lower);
            }
            if let Some(upper) = upper {
                assert!(key <= upper, "{:?} is in the left subtree of {:?}", key, upper);
            }

            if let Some(left) = node.left() {
                assert_eq!(tree.nodes[left].parent(), Some(ptr));
                stack.push((left, lower, Some(key)));
            }
            if let Some(right) = node.right() {
                assert_eq!(tree.nodes[right].parent(), Some(ptr));
                stack.push((right, Some(key), upper));
            }
        }

        assert_eq!(reachable, tree.len());
    }

    fn print_to_string<K: Ord + fmt::Display>(tree: &BSTree<K>, traversal: Traversal) -> String {
        let mut out = Vec::new();
        tree.print(traversal, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn fifty_tree() -> BSTree<i32> {
        // Create the following tree:
        //        50
        //     30    70
        //   20  40
        [50, 30, 70, 20, 40].iter().copied().collect()
    }

    #[test]
    fn fifty_scenario() {
        let tree = fifty_tree();
        assert_valid(&tree);

        assert_eq!(print_to_string(&tree, Traversal::Inorder), "20 30 40 50 70 \n");
        assert!(tree.search(&50));
        assert!(!tree.search(&51));
        assert_eq!(tree.min(), Some(&20));
        assert_eq!(tree.max(), Some(&70));
        assert_eq!(tree.height(), 3);
        assert_eq!(tree.depth(&50), Some(1));
        assert_eq!(tree.depth(&20), Some(3));
    }

    #[test]
    fn delete_node_with_two_children() {
        let mut tree = fifty_tree();
        assert!(tree.delete(&30));
        assert_valid(&tree);
        assert_eq!(print_to_string(&tree, Traversal::Inorder), "20 40 50 70 \n");

        // The node that held 30 now holds its successor, and the leaf that held 40 is gone
        let root = tree.root().unwrap();
        let replaced = root.left().unwrap();
        assert_eq!(replaced.key(), &40);
        assert_eq!(replaced.left().map(|node| *node.key()), Some(20));
        assert!(!replaced.has_right());
        assert_eq!(tree.len(), 4);
        assert!(!tree.search(&30));
    }

    #[test]
    fn delete_root() {
        // Root with two children
        let mut tree = fifty_tree();
        assert!(tree.delete(&50));
        assert_valid(&tree);
        assert_eq!(tree.root().map(|node| *node.key()), Some(70));
        assert_eq!(print_to_string(&tree, Traversal::Preorder), "70 30 20 40 \n");

        // Root with a single child gets replaced by that child
        let mut tree: BSTree<_> = vec![1, 2, 3].into_iter().collect();
        assert!(tree.delete(&1));
        assert_valid(&tree);
        assert_eq!(tree.root().map(|node| *node.key()), Some(2));
        assert!(tree.root().unwrap().is_root());

        // Deleting the only node empties the tree
        let mut tree: BSTree<_> = vec![1].into_iter().collect();
        assert!(tree.delete(&1));
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn delete_with_duplicate_successor_keys() {
        // Create the following tree:
        //     10
        //   5    20
        //      15
        //    15
        let mut tree: BSTree<_> = vec![10, 5, 20, 15, 15].into_iter().collect();
        assert!(tree.delete(&10));
        assert_valid(&tree);

        // The upper copy of 15 is removed and the lower one stays in the right subtree
        assert_eq!(print_to_string(&tree, Traversal::Preorder), "15 5 20 15 \n");
        assert_eq!(print_to_string(&tree, Traversal::Inorder), "5 15 15 20 \n");
        assert_eq!(tree.successor(&15), Some(&15));
        assert_eq!(tree.depth(&15), Some(1));

        // Each copy is still deleted one at a time
        assert!(tree.delete(&15));
        assert_valid(&tree);
        assert_eq!(print_to_string(&tree, Traversal::Preorder), "15 5 20 \n");
        assert!(tree.delete(&15));
        assert!(!tree.search(&15));
        assert_eq!(print_to_string(&tree, Traversal::Inorder), "5 20 \n");
    }

    #[test]
    fn delete_removes_topmost_copy_of_successor_key() {
        // The copy of 15 closest to 20 has two children, so it is replaced in turn by 17:
        //     10                15
        //   5    20           5    20
        //      15       ->       17
        //    15  17            15
        let mut tree: BSTree<_> = vec![10, 5, 20, 15, 15, 17].into_iter().collect();
        assert!(tree.delete(&10));
        assert_valid(&tree);

        assert_eq!(print_to_string(&tree, Traversal::Preorder), "15 5 20 17 15 \n");
        assert_eq!(tree.depth(&17), Some(3));
        assert_eq!(tree.depth_iterative(&17), Some(3));
        assert_eq!(tree.len(), 5);

        let expected: SimpleBSTree<_> = {
            let mut expected: SimpleBSTree<_> = vec![10, 5, 20, 15, 15, 17].into_iter().collect();
            assert!(expected.remove(&10));
            expected
        };
        assert!(tree.iter_preorder().eq(expected.iter_preorder()));
    }

    #[test]
    fn delete_missing_is_a_no_op() {
        let mut tree: BSTree<i32> = BSTree::new();
        assert!(!tree.delete(&3));
        assert!(tree.is_empty());

        let mut tree = fifty_tree();
        assert!(!tree.delete(&45));
        assert_eq!(tree.len(), 5);
        assert_eq!(print_to_string(&tree, Traversal::Preorder), "50 30 20 40 70 \n");
    }

    #[test]
    fn empty_tree() {
        let tree: BSTree<i32> = BSTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.min(), None);
        assert_eq!(tree.max(), None);
        assert_eq!(tree.successor(&1), None);
        assert_eq!(tree.predecessor(&1), None);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.depth(&1), None);
        assert_eq!(tree.depth_iterative(&1), None);
        assert!(!tree.search(&1));

        for &traversal in &Traversal::ALL {
            assert_eq!(print_to_string(&tree, traversal), "\n");
        }
    }

    #[test]
    fn negative_one_is_a_normal_key() {
        let tree: BSTree<i32> = vec![-1, 5].into_iter().collect();
        assert_eq!(tree.min(), Some(&-1));
        assert_eq!(tree.predecessor(&5), Some(&-1));
        assert_eq!(tree.predecessor(&-1), None);
    }

    #[test]
    fn height() {
        let mut tree = BSTree::new();
        assert_eq!(tree.height(), 0);

        tree.insert(0);
        assert_eq!(tree.height(), 1);

        // Right-only chain
        for i in 1..100 {
            tree.insert(i);
            assert_eq!(tree.height(), i + 1);
        }
        assert_eq!(tree.depth(&99), Some(100));
        assert_eq!(tree.depth_iterative(&99), Some(100));
    }

    #[test]
    fn duplicates_go_left() {
        let mut tree = BSTree::new();
        tree.insert(5);
        tree.insert(5);
        assert_valid(&tree);

        let root = tree.root().unwrap();
        assert_eq!(root.left().map(|node| *node.key()), Some(5));
        assert!(!root.has_right());

        // Deleting removes exactly one occurrence at a time
        assert!(tree.delete(&5));
        assert!(tree.search(&5));
        assert_eq!(tree.len(), 1);
        assert!(tree.delete(&5));
        assert!(!tree.search(&5));
        assert!(!tree.delete(&5));
    }

    #[test]
    fn successor_predecessor_adjacent_pairs() {
        let mut rng = StdRng::seed_from_u64(3904);
        let mut tree = BSTree::new();
        for _ in 0..200 {
            // Unique keys so that each pair is unambiguous
            let key: u32 = rng.gen_range(0..10_000);
            if !tree.search(&key) {
                tree.insert(key);
            }
        }

        let keys: Vec<_> = tree.iter_inorder().copied().collect();
        for pair in keys.windows(2) {
            assert_eq!(tree.successor(&pair[0]), Some(&pair[1]));
            assert_eq!(tree.predecessor(&pair[1]), Some(&pair[0]));
        }

        assert_eq!(tree.successor(keys.last().unwrap()), None);
        assert_eq!(tree.predecessor(keys.first().unwrap()), None);
    }

    #[test]
    fn depth_matches_depth_iterative() {
        let mut rng = StdRng::seed_from_u64(1238);
        let tree: BSTree<u8> = (0..300).map(|_| rng.gen()).collect();

        for key in 0..=255u8 {
            assert_eq!(tree.depth(&key), tree.depth_iterative(&key));
        }
        assert_eq!(tree.depth(tree.root().unwrap().key()), Some(1));
    }

    #[test]
    fn natural_fill_preserves_shape() {
        let mut rng = StdRng::seed_from_u64(45930923092);
        let mut tree: BSTree<i32> = (0..100).map(|_| rng.gen_range(0..100)).collect();
        let height = tree.height();
        let shape = shape_of(&tree);

        let filled = tree.natural_fill(200..300);
        assert_eq!(filled, 100);
        assert_valid(&tree);

        assert_eq!(tree.height(), height);
        assert_eq!(shape_of(&tree), shape);
        assert!(tree.iter_inorder().copied().eq(200..300));
    }

    #[test]
    fn natural_fill_shortfall() {
        let mut tree = fifty_tree();

        // Too few values: the remaining nodes keep their keys
        assert_eq!(tree.natural_fill(vec![1, 2]), 2);
        assert_eq!(print_to_string(&tree, Traversal::Inorder), "1 2 40 50 70 \n");

        // Too many values: the extra values are ignored
        assert_eq!(tree.natural_fill(0..), 5);
        assert_eq!(print_to_string(&tree, Traversal::Inorder), "0 1 2 3 4 \n");

        let mut tree: BSTree<i32> = BSTree::new();
        assert_eq!(tree.natural_fill(0..10), 0);
        assert!(tree.is_empty());
    }

    /// Encodes the shape of a tree as the pre-order sequence of (has_left, has_right)
    fn shape_of<K: Ord>(tree: &BSTree<K>) -> Vec<(bool, bool)> {
        let mut shape = Vec::new();
        let mut stack: Vec<_> = tree.root().into_iter().collect();
        while let Some(node) = stack.pop() {
            shape.push((node.has_left(), node.has_right()));
            stack.extend(node.right());
            stack.extend(node.left());
        }
        shape
    }

    #[test]
    fn traversals() {
        let tree = fifty_tree();

        assert_eq!(print_to_string(&tree, Traversal::Inorder), "20 30 40 50 70 \n");
        assert_eq!(print_to_string(&tree, Traversal::Preorder), "50 30 20 40 70 \n");
        assert_eq!(print_to_string(&tree, Traversal::Postorder), "20 40 30 70 50 \n");

        // The iterators visit nodes in the same order as the recursive printers
        for &traversal in &Traversal::ALL {
            let mut expected: String = tree.iter(traversal).map(|key| format!("{} ", key)).collect();
            expected.push('\n');
            assert_eq!(print_to_string(&tree, traversal), expected);
        }
    }

    #[test]
    fn print_named() {
        let tree = fifty_tree();

        let mut out = Vec::new();
        let mut err = Vec::new();
        tree.print_named("postorder", &mut out, &mut err).unwrap();
        assert_eq!(out, b"20 40 30 70 50 \n");
        assert!(err.is_empty());

        let mut out = Vec::new();
        tree.print_named("sideways", &mut out, &mut err).unwrap();
        assert_eq!(out, b"\n");
        let err = String::from_utf8(err).unwrap();
        assert!(err.contains("invalid traversal method `sideways`"), "{}", err);
    }

    #[test]
    fn deleted_slots_are_reused() {
        let mut tree: BSTree<_> = (0..64).collect();
        let capacity = tree.capacity();

        for _ in 0..10 {
            for key in 0..32 {
                assert!(tree.delete(&key));
            }
            for key in (0..32).rev() {
                tree.insert(key);
            }
            assert_eq!(tree.len(), 64);
            assert_valid(&tree);
        }

        assert_eq!(tree.capacity(), capacity);
    }

    #[test]
    fn free_takes_attached_subtree() {
        let mut tree = fifty_tree();
        let left = tree.root.and_then(|root| tree.nodes[root].left()).unwrap();

        // Freeing 30 without detaching it first also frees 20 and 40
        let freed = tree.free(left).unwrap();
        assert_eq!(freed.key(), &30);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn borrowed_keys() {
        let mut tree: BSTree<String> = BSTree::new();
        tree.insert("m".to_string());
        tree.insert("c".to_string());
        tree.insert("x".to_string());

        assert!(tree.search("c"));
        assert_eq!(tree.successor("c").map(String::as_str), Some("m"));
        assert_eq!(tree.depth("x"), Some(2));
        assert!(tree.delete("m"));
        assert!(!tree.search("m"));
        assert_valid(&tree);
    }

    #[test]
    fn clone_eq() {
        let tree: BSTree<_> = (0..10).rev().collect();
        let sorted: BSTree<_> = (0..10).collect();

        // Same keys, different shapes
        assert_eq!(tree, sorted);
        assert_eq!(tree, tree.clone());
        assert_ne!(tree, fifty_tree());
        assert_eq!(BSTree::<i32>::new(), BSTree::default());
    }

    #[test]
    fn test_random_operations() {
        cfg_if::cfg_if! {
            if #[cfg(miri)] {
                const TEST_CASES: usize = 16;
                const OPERATIONS: usize = 24;

                (0..TEST_CASES).into_iter().for_each(|_| test_case());

            } else {
                use rayon::prelude::*;

                const TEST_CASES: usize = 512;
                const OPERATIONS: usize = 128;

                (0..TEST_CASES).into_par_iter().for_each(|_| test_case());
            }
        }

        fn test_case() {
            let mut tree = BSTree::new();
            // Compare against a tree without parent links that follows the same rules
            let mut expected = SimpleBSTree::new();
            // The list of keys that have been inserted
            let mut keys = Vec::new();

            let mut rng = rand::thread_rng();
            for _ in 0..rng.gen_range(OPERATIONS..=OPERATIONS*2) {
                assert_eq!(tree.is_empty(), expected.is_empty());
                assert_eq!(tree.len(), expected.len());

                match rng.gen_range(1..=100) {
                    // Check for a key that hasn't been inserted
                    1..=10 => {
                        // Not inserting any negative numbers
                        let key = -rng.gen_range(1..=64);
                        assert!(!tree.search(&key));
                        assert_eq!(tree.depth(&key), None);
                        assert_eq!(tree.successor(&key), None);
                    },

                    // Check for a key that may have been inserted
                    11..=30 => {
                        let key = match keys.choose(&mut rng).copied() {
                            Some(key) => key,
                            None => continue,
                        };

                        assert_eq!(tree.search(&key), expected.contains(&key));
                        assert_eq!(tree.depth(&key), tree.depth_iterative(&key));
                    },

                    // Delete a key that may have been inserted
                    31..=55 => {
                        let key = match keys.choose(&mut rng).copied() {
                            Some(key) => key,
                            None => continue,
                        };

                        assert_eq!(tree.delete(&key), expected.remove(&key));
                        assert_valid(&tree);
                    },

                    // Insert a key, possibly a duplicate
                    56..=100 => {
                        let key = rng.gen_range(0..=64);
                        keys.push(key);

                        tree.insert(key);
                        expected.insert(key);
                        assert!(tree.search(&key));
                        assert_valid(&tree);
                    },

                    _ => unreachable!(),
                }

                // Both trees have exactly the same shape
                assert!(tree.iter_preorder().eq(expected.iter_preorder()));
                assert_eq!(tree.height(), expected.height());
                assert_eq!(tree.min(), expected.min());
                assert_eq!(tree.max(), expected.max());
            }

            assert!(tree.iter_inorder().eq(expected.iter_inorder()));
            assert!(tree.iter_postorder().eq(expected.iter_postorder()));

            tree.clear();
            expected.clear();

            assert_eq!(tree.is_empty(), expected.is_empty());
            assert_eq!(tree.len(), expected.len());

            for &key in &keys {
                assert!(!tree.search(&key));
            }
        }
    }
}
