//! Seed finders
//!
//! Each finder locates exact matches of at least a minimum length between
//! two sequences inside a [`SearchSpace`]. They form the candidate pool the
//! chaining engine picks its anchors from.

pub use crate::types::{Match, SearchSpace};

use serde::{Deserialize, Serialize};

pub mod hash_index;
pub mod packed;
pub mod unique;
pub mod utils;


/// The three seed finding strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FinderKind {
    /// Literal k-mer hash index, any alphabet
    #[default]
    HashIndex,
    /// 2-bit packed bucket index, nucleotides only (maximal exact matches)
    PackedKey,
    /// Sorted table of sequence-unique packed k-mers (MUM-style)
    UniqueIndex,
}

impl FinderKind {
    pub const ALL: [FinderKind; 3] = [
        FinderKind::HashIndex,
        FinderKind::PackedKey,
        FinderKind::UniqueIndex,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FinderKind::HashIndex => "hash_index",
            FinderKind::PackedKey => "packed_key",
            FinderKind::UniqueIndex => "unique_index",
        }
    }
}

/// Parameters shared by the finder constructors
#[derive(Debug, Clone)]
pub struct FinderParams {
    /// Which finder to build
    pub kind: FinderKind,
    /// Step between indexed subject windows for the hash finder
    pub index_step: usize,
    /// Longest bucket key the packed finder indexes on
    pub max_key_len: usize,
    /// Step between query windows for the unique finder (0 = use k)
    pub query_step: usize,
    /// Step between subject windows for the unique finder
    pub subject_step: usize,
}

impl Default for FinderParams {
    fn default() -> Self {
        Self {
            kind: FinderKind::HashIndex,
            index_step: 1,
            max_key_len: packed::DEFAULT_MAX_KEY_LEN,
            query_step: 0,
            subject_step: 1,
        }
    }
}

/// Result type for seeding operations
pub type SeedResult<T> = Result<T, SeedError>;

/// Errors that can occur during seeding
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Invalid symbol '{symbol}' at position {position}")]
    InvalidAlphabet { symbol: char, position: usize },

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}

/// Trait for seed finding algorithms
pub trait SeedFinder: Send + Sync {
    /// Find exact matches of length `>= min_len` between `q_seq` and `s_seq`
    /// inside `space`. Sequences are expected to be lower-cased already.
    /// Matches covering cells of an earlier reported match are suppressed.
    fn find(
        &self,
        q_seq: &[u8],
        s_seq: &[u8],
        space: &SearchSpace,
        min_len: usize,
    ) -> SeedResult<Vec<Match>>;

    /// Get the name/identifier of this finder
    fn name(&self) -> &'static str;
}

/// Factory for creating seed finders
pub struct SeedFinderFactory;

impl SeedFinderFactory {
    /// Create a finder instance based on parameters
    pub fn create(params: &FinderParams) -> SeedResult<Box<dyn SeedFinder>> {
        if params.index_step == 0 {
            return Err(SeedError::InvalidParams(
                "index step must be at least 1".to_string(),
            ));
        }

        let finder: Box<dyn SeedFinder> = match params.kind {
            FinderKind::HashIndex => Box::new(hash_index::HashIndexFinder::with_step(params.index_step)),
            FinderKind::PackedKey => Box::new(packed::PackedKeyFinder::with_max_key_len(params.max_key_len)?),
            FinderKind::UniqueIndex => Box::new(unique::UniqueIndexFinder::with_steps(
                params.query_step,
                params.subject_step,
            )?),
        };

        Ok(finder)
    }

    /// List all available finders
    pub fn available_finders() -> Vec<&'static str> {
        FinderKind::ALL.iter().map(FinderKind::name).collect()
    }
}
