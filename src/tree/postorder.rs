use std::iter::FusedIterator;

use crate::slab::{Ptr, Slab};

use super::InnerNode;

pub struct IterPostorder<'a, K> {
    nodes: &'a Slab<InnerNode<K>>,
    stack: Vec<Ptr>,
}

// See: https://www.geeksforgeeks.org/iterative-postorder-traversal-using-stack/
impl<'a, K> IterPostorder<'a, K> {
    pub(super) fn new(nodes: &'a Slab<InnerNode<K>>, root: Option<Ptr>) -> Self {
        let mut iter = Self {nodes, stack: Vec::new()};
        iter.descend(root);
        iter
    }

    /// Walks down the left spine from `current`, leaving each node on the stack just above its
    /// right child so the right subtree is visited before the node itself
    fn descend(&mut self, mut current: Option<Ptr>) {
        let nodes = self.nodes;
        while let Some(ptr) = current {
            let node = &nodes[ptr];

            self.stack.extend(node.right());
            self.stack.push(ptr);

            current = node.left();
        }
    }
}

impl<'a, K> Iterator for IterPostorder<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        while let Some(current_ptr) = self.stack.pop() {
            let node = &nodes[current_ptr];

            // If the top of the stack is the current node's right child, the right subtree has
            // not been visited yet
            match node.right() {
                Some(right) if self.stack.last().copied() == Some(right) => {
                    // Remove right from stack
                    self.stack.pop();

                    // Push the current pointer back onto the stack
                    self.stack.push(current_ptr);

                    self.descend(Some(right));
                },

                _ => return Some(node.key()),
            }
        }

        None
    }
}

impl<'a, K> FusedIterator for IterPostorder<'a, K> {}
