//! View-models built on the reactive core

pub mod document;
pub mod node;

pub use document::{DocumentError, DocumentKey, DocumentViewModel};
pub use node::{NodeKey, TreeNodeViewModel};
