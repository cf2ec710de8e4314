use std::iter::FusedIterator;

use crate::slab::{Ptr, Slab};

use super::InnerNode;

pub struct IterInorder<'a, K> {
    nodes: &'a Slab<InnerNode<K>>,
    stack: Vec<Ptr>,
}

// See: https://www.geeksforgeeks.org/inorder-tree-traversal-without-recursion/
impl<'a, K> IterInorder<'a, K> {
    pub(super) fn new(nodes: &'a Slab<InnerNode<K>>, root: Option<Ptr>) -> Self {
        let mut iter = Self {nodes, stack: Vec::new()};
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut current: Option<Ptr>) {
        let nodes = self.nodes;
        while let Some(ptr) = current {
            self.stack.push(ptr);
            current = nodes[ptr].left();
        }
    }
}

impl<'a, K> Iterator for IterInorder<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        let top_ptr = self.stack.pop()?;
        let node = &nodes[top_ptr];
        self.push_left_spine(node.right());

        Some(node.key())
    }
}

impl<'a, K> FusedIterator for IterInorder<'a, K> {}
