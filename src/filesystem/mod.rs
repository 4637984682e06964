//! In-memory filesystem tree.
//!
//! This module provides a tree of directories and files rooted at `/`, with
//! a current-directory cursor that all names are resolved against. Children of
//! every directory are kept sorted by name.

mod listing;
pub mod name;
mod node;
mod tree;

pub use tree::FileSystem;
