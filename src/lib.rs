//! jxview - JSON and XML document inspector
//!
//! This crate loads JSON or XML documents into a name/value tree, exposes
//! them through dependency-tracked view-models for browsing and editing, and
//! writes edits back to disk.

pub mod config;
pub mod file_types;
pub mod outline;
pub mod parsers;
pub mod reactive;
pub mod serializers;
pub mod tree;
pub mod viewmodels;
