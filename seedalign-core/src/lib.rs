//! seedalign core library
//!
//! Greedy seed-and-chain pairwise sequence alignment: exact-match seed
//! finders, a divide-and-conquer chaining engine and gap insertion.

pub mod alignment;
pub mod chain;
pub mod config;
pub mod gaps;
pub mod geometry;
pub mod seed;
pub mod types;

// Re-export commonly used types and functions
pub use alignment::{align_pair, align_pairs, AlignError, AlignResult, Alignment};
pub use chain::{AlignmentEngine, ChainParams};
pub use config::AlignConfig;
pub use gaps::GapInserter;
pub use seed::{FinderKind, FinderParams, SeedError, SeedFinder, SeedFinderFactory, SeedResult};
pub use types::{Match, SearchSpace, Sequence};

/// Version information for the seedalign core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
