#![allow(clippy::upper_case_acronyms)]

pub mod tree;

pub use tree::SimpleBSTree;
