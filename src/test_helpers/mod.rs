//! # Test Helpers
//!
//! An in-memory entity store that interprets [`VisibilityFilter`]s over
//! plain rows. It stands in for the real persistence layer in tests, which
//! lets the scope-resolution properties be checked end to end (identity →
//! filter → row set) without a database, and proves the resolvers produce
//! *predicates* rather than performing queries themselves.

pub mod memory_store;

pub use memory_store::{CustomerRow, MemoryStore, ProjectRow, TaskRow};
