// file: src/dataset/mod.rs
// description: query dataset module exports
// reference: internal module structure

pub mod queries;
pub mod taxonomy;

pub use queries::{QueryDataset, query_id};
pub use taxonomy::{Concept, Taxonomy};
