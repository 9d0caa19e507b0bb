//! Application layer: operation scripts run against a tree
//!
//! This layer turns parsed commands into tree operations and formats their results.

pub mod error;
pub mod error_ext;
pub mod script;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use script::Script;
