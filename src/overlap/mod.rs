// file: src/overlap/mod.rs
// description: overlap scoring between engine result sets
// reference: internal module structure

pub mod accumulator;
pub mod combinations;
pub mod jaccard;
pub mod stats;

pub use accumulator::{CombinationSummary, OverlapAccumulator, OverlapSummary};
pub use combinations::{Combination, combinations};
pub use jaccard::{CombinationScore, QueryOverlap, jaccard};
pub use stats::BoxStats;
