use std::iter::FusedIterator;

use super::Node;

pub struct IterInorder<'a, K> {
    stack: Vec<&'a Node<K>>,
}

// See: https://www.geeksforgeeks.org/inorder-tree-traversal-without-recursion/
impl<'a, K> IterInorder<'a, K> {
    pub(super) fn new(root: Option<&'a Node<K>>) -> Self {
        let mut stack = Vec::new();
        let mut current = root;
        while let Some(current_node) = current {
            stack.push(current_node);
            current = current_node.left();
        }

        Self {stack}
    }
}

impl<'a, K> Iterator for IterInorder<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;

        let mut current = node.right();
        while let Some(current_node) = current {
            self.stack.push(current_node);
            current = current_node.left();
        }

        Some(node.key())
    }
}

impl<'a, K> FusedIterator for IterInorder<'a, K> {}
