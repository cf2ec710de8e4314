#![allow(clippy::upper_case_acronyms)]

mod slab;

pub mod tree;

pub use tree::{BSTree, Node, Traversal, ParseTraversalError};

/// Creates a `BSTree` by inserting the given keys in order
///
/// ```
/// use bstree::bstree;
///
/// let tree = bstree![2, 1, 3];
/// assert_eq!(tree.root().map(|node| *node.key()), Some(2));
/// ```
#[macro_export(local_inner_macros)]
macro_rules! bstree {
    (@single $($x:tt)*) => (());
    (@count $($rest:expr),*) => (<[()]>::len(&[$(bstree!(@single $rest)),*]));

    ($($key:expr,)+) => { bstree!($($key),+) };
    ($($key:expr),*) => {
        {
            let _cap = bstree!(@count $($key),*);
            let mut _tree = $crate::BSTree::with_capacity(_cap);
            $(
                _tree.insert($key);
            )*
            _tree
        }
    };
}
