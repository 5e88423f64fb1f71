// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod article;
pub mod engine;
pub mod query;
pub mod results;

pub use article::Article;
pub use engine::EngineKind;
pub use query::{MAX_PAGE_RESULTS, SearchQuery, parenthesize_phrases};
pub use results::{EngineResults, ResultStatus};
