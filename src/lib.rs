//! Color-histogram similarity search over a directory of JPEG images.
//!
//! Each image is reduced to a normalized RGB histogram, candidates are
//! scored against the query by histogram intersection, and the best `k`
//! are kept. Corpus images are extracted and scored in parallel shards.

pub mod corpus;
pub mod error;
pub mod histogram;
pub mod search;
pub mod similarity;
pub mod topk;

pub use corpus::{scan_dir, shard, shard_dir};
pub use error::{Result, SearchError};
pub use histogram::{Depth, Histogram};
pub use search::{default_config, CancelHandle, Config, SearchReport, Searcher, SkippedImage};
pub use similarity::similarity;
pub use topk::{ScoredCandidate, SharedTopK, TopK};
