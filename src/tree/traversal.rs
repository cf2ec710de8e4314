use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The order in which the nodes of a tree are visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Traversal {
    /// Left subtree, node, right subtree (ascending key order)
    Inorder,
    /// Node, left subtree, right subtree
    Preorder,
    /// Left subtree, right subtree, node
    Postorder,
}

impl Traversal {
    /// All traversal orders, in the order they are usually printed
    pub const ALL: [Traversal; 3] = [Traversal::Inorder, Traversal::Preorder, Traversal::Postorder];

    /// The name accepted by `FromStr` for this traversal
    pub fn name(self) -> &'static str {
        match self {
            Traversal::Inorder => "inorder",
            Traversal::Preorder => "preorder",
            Traversal::Postorder => "postorder",
        }
    }
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when parsing a name that is not one of `inorder`, `preorder` or `postorder`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid traversal method `{name}` (expected inorder, preorder or postorder)")]
pub struct ParseTraversalError {
    name: String,
}

impl ParseTraversalError {
    /// The name that failed to parse
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for Traversal {
    type Err = ParseTraversalError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Traversal::ALL.iter()
            .copied()
            .find(|traversal| traversal.name() == name)
            .ok_or_else(|| ParseTraversalError {name: name.to_string()})
    }
}
