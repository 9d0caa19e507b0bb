//! Domain layer: the search tree and its key types
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod error;
pub mod key;
pub mod traversal;

pub use arena::BinarySearchTree;
pub use error::{TreeError, TreeResult};
pub use key::FloatKey;
pub use traversal::{InOrder, NodeRef};
