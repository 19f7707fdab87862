//! Aligned sequence container and the pairwise alignment entry points.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::chain::AlignmentEngine;
use crate::config::AlignConfig;
use crate::seed::SeedError;
use crate::types::Sequence;

/// Errors that can occur while aligning or inspecting an alignment
#[derive(Debug, Error)]
pub enum AlignError {
    #[error("Seeding failed: {0}")]
    Seed(#[from] SeedError),

    #[error("Aligned sequences differ in length: {first} vs {second}")]
    SequenceLengthMismatch { first: usize, second: usize },

    #[error("Bad number of members for identity calculation: {0}")]
    BadMemberCount(usize),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}

pub type AlignResult<T> = Result<T, AlignError>;

/// A set of gap-padded sequences sharing one column coordinate system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    entries: Vec<Sequence>,
}

impl Alignment {
    pub fn new(entries: Vec<Sequence>) -> Self {
        Self { entries }
    }

    /// Number of columns, taken from the first member.
    pub fn length(&self) -> usize {
        self.entries.first().map_or(0, Sequence::len)
    }

    /// Number of member sequences.
    pub fn members(&self) -> usize {
        self.entries.len()
    }

    /// Fraction of columns whose two symbols are equal ignoring case.
    /// Defined only for exactly two members of equal length.
    pub fn identity(&self) -> AlignResult<f64> {
        let [first, second] = self.entries.as_slice() else {
            return Err(AlignError::BadMemberCount(self.members()));
        };

        if first.len() != second.len() {
            return Err(AlignError::SequenceLengthMismatch {
                first: first.len(),
                second: second.len(),
            });
        }

        if first.is_empty() {
            return Ok(0.0);
        }

        let shared = first
            .seq
            .iter()
            .zip(&second.seq)
            .filter(|(a, b)| a.eq_ignore_ascii_case(b))
            .count();

        Ok(shared as f64 / first.len() as f64)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sequence> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[Sequence] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Sequence> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Alignment {
    type Item = &'a Sequence;
    type IntoIter = std::slice::Iter<'a, Sequence>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}\t{}", entry.name, entry.as_str_lossy())?;
        }
        writeln!(f)
    }
}

/// Align two sequences with the default engine: hash-index seeding from an
/// initial seed length of 32, default diagonal scoring, matched spans
/// upper-cased and `-` as the gap symbol.
pub fn align_pair(query: Sequence, subject: Sequence) -> AlignResult<Alignment> {
    AlignmentEngine::default().align(query, subject)
}

/// Align many independent pairs in parallel. Results keep input order.
pub fn align_pairs(
    pairs: Vec<(Sequence, Sequence)>,
    config: &AlignConfig,
) -> AlignResult<Vec<AlignResult<Alignment>>> {
    let engine = AlignmentEngine::from_config(config)?;
    log::debug!("Aligning {} pairs with {}", pairs.len(), engine.finder_name());

    Ok(pairs
        .into_par_iter()
        .map(|(query, subject)| engine.align(query, subject))
        .collect())
}
