//! Unbalanced binary search tree over totally ordered keys.
//!
//! The tree lives in [`domain`]; the remaining modules form the `bstree` command-line
//! front end (settings, operation scripts, rendering).
//!
//! ```
//! use bstree::BinarySearchTree;
//!
//! let mut tree: BinarySearchTree<i32> = [5, 3, 2, 1, 6, 10, 9].into_iter().collect();
//! assert_eq!(tree.min(), Some(&1));
//! tree.delete(&5);
//! assert_eq!(tree.to_string(), "1 2 3 6 9 10");
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod parser;
pub mod tree_traits;
pub mod util;

pub use domain::{BinarySearchTree, FloatKey, InOrder, NodeRef, TreeError, TreeResult};
