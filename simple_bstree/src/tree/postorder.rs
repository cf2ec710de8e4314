use std::ptr;
use std::iter::FusedIterator;

use super::Node;

pub struct IterPostorder<'a, K> {
    stack: Vec<&'a Node<K>>,
}

// See: https://www.geeksforgeeks.org/iterative-postorder-traversal-using-stack/
impl<'a, K> IterPostorder<'a, K> {
    pub(super) fn new(root: Option<&'a Node<K>>) -> Self {
        let mut iter = Self {stack: Vec::new()};
        iter.descend(root);
        iter
    }

    fn descend(&mut self, mut current: Option<&'a Node<K>>) {
        while let Some(node) = current {
            self.stack.extend(node.right());
            self.stack.push(node);

            current = node.left();
        }
    }
}

/// Compares two nodes for equality using pointer equality only
fn node_eq<K>(left: Option<&&Node<K>>, right: &Node<K>) -> bool {
    left.map(|&left| ptr::eq(left, right))
        // default to not equal
        .unwrap_or(false)
}

impl<'a, K> Iterator for IterPostorder<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            // If the top of the stack is the current node's right child
            match node.right() {
                Some(right) if node_eq(self.stack.last(), right) => {
                    // Remove right from stack
                    self.stack.pop();

                    // Push the current node back onto the stack
                    self.stack.push(node);

                    self.descend(Some(right));
                },

                _ => return Some(node.key()),
            }
        }

        None
    }
}

impl<'a, K> FusedIterator for IterPostorder<'a, K> {}
