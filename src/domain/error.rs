//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Structural invariant violations found by `BinarySearchTree::validate`.
///
/// Depth is 1-based, counted from the root.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("order invariant violated at depth {depth}")]
    OrderViolation { depth: usize },

    #[error("parent link does not match child slot at depth {depth}")]
    ParentMismatch { depth: usize },

    #[error("root node has a parent")]
    RootHasParent,

    #[error("dangling node index at depth {depth}")]
    DanglingIndex { depth: usize },

    #[error("cycle detected in node links")]
    Cycle,

    #[error("{stored} nodes stored but {reachable} reachable from root")]
    LengthMismatch { reachable: usize, stored: usize },
}

pub type TreeResult<T> = Result<T, TreeError>;
