// file: src/parser/mod.rs
// description: title normalization and matching module exports
// reference: internal module structure

pub mod matcher;
pub mod normalizer;
pub mod patterns;

pub use matcher::TitleMatcher;
pub use normalizer::TitleNormalizer;
