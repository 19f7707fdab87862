//! Unique-k-mer (MUM-style) seed finder
//!
//! Builds, for each sequence, a table of packed k-mer keys and positions,
//! sorts it by key and drops every key that occurs more than once in the same
//! table. Query entries are then looked up in the subject table by binary
//! search. Runs of perfectly diagonal-adjacent hits are merged into a single
//! match, and all matches are grown against the whole sequences.

use fnv::FnvHashSet;
use std::ops::RangeInclusive;

use super::utils::{window_keys, window_range, MAX_PACKED_K};
use super::{Match, SearchSpace, SeedError, SeedFinder, SeedResult};

/// Sorted table of sequence-unique packed k-mers
struct UniqueTable {
    entries: Vec<(u64, usize)>,
}

impl UniqueTable {
    /// Index every `step`-th window of `starts`. Windows holding a symbol
    /// outside ACGT/U have no key and are left out.
    fn build(seq: &[u8], starts: RangeInclusive<usize>, k: usize, step: usize) -> Self {
        let first = *starts.start();
        let mut entries: Vec<(u64, usize)> = window_keys(seq, starts, k)
            .into_iter()
            .enumerate()
            .step_by(step)
            .filter_map(|(i, key)| key.map(|key| (key, first + i)))
            .collect();

        entries.sort_unstable();

        let mut unique = Vec::with_capacity(entries.len());
        let mut i = 0;
        while i < entries.len() {
            let mut j = i + 1;
            while j < entries.len() && entries[j].0 == entries[i].0 {
                j += 1;
            }
            if j - i == 1 {
                unique.push(entries[i]);
            }
            i = j;
        }

        Self { entries: unique }
    }

    fn lookup(&self, key: u64) -> Option<usize> {
        self.entries
            .binary_search_by_key(&key, |&(k, _)| k)
            .ok()
            .map(|i| self.entries[i].1)
    }

    fn by_position(mut self) -> Vec<(u64, usize)> {
        self.entries.sort_unstable_by_key(|&(_, pos)| pos);
        self.entries
    }
}

/// Unique-k-mer seed finder
pub struct UniqueIndexFinder {
    query_step: usize,
    subject_step: usize,
}

impl UniqueIndexFinder {
    /// Query windows every `k` bases, subject windows at every base.
    pub fn new() -> Self {
        Self {
            query_step: 0,
            subject_step: 1,
        }
    }

    /// A `query_step` of 0 means "step by the seed length".
    pub fn with_steps(query_step: usize, subject_step: usize) -> SeedResult<Self> {
        if subject_step == 0 {
            return Err(SeedError::InvalidParams(
                "subject step must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            query_step,
            subject_step,
        })
    }

    fn query_step_for(&self, k: usize) -> usize {
        if self.query_step == 0 {
            k
        } else {
            self.query_step
        }
    }

    /// Unique k-mer hits in query position order, with runs of
    /// diagonal-adjacent hits merged. Nothing is expanded yet.
    fn merged_hits(&self, q_seq: &[u8], s_seq: &[u8], space: &SearchSpace, k: usize) -> Vec<Match> {
        let mut hits: Vec<Match> = Vec::new();

        let (Some(q_starts), Some(s_starts)) = (
            window_range(space.q_min, space.q_max, k, q_seq.len()),
            window_range(space.s_min, space.s_max, k, s_seq.len()),
        ) else {
            return hits;
        };

        let q_table = UniqueTable::build(q_seq, q_starts, k, self.query_step_for(k));
        let s_table = UniqueTable::build(s_seq, s_starts, k, self.subject_step);

        for (key, q_pos) in q_table.by_position() {
            let Some(s_pos) = s_table.lookup(key) else {
                continue;
            };
            // T and U share a code
            if q_seq[q_pos..q_pos + k] != s_seq[s_pos..s_pos + k] {
                continue;
            }

            match hits.last_mut() {
                Some(last) if last.q_beg + last.length == q_pos && last.s_beg + last.length == s_pos => {
                    last.length += k;
                }
                _ => hits.push(Match::new(q_pos, s_pos, k)),
            }
        }

        hits
    }
}

impl SeedFinder for UniqueIndexFinder {
    fn find(
        &self,
        q_seq: &[u8],
        s_seq: &[u8],
        space: &SearchSpace,
        min_len: usize,
    ) -> SeedResult<Vec<Match>> {
        if min_len == 0 || min_len > MAX_PACKED_K {
            return Err(SeedError::InvalidParams(format!(
                "unique k-mer length must be between 1 and {}, got {}",
                MAX_PACKED_K, min_len
            )));
        }

        if space.is_empty() {
            return Ok(Vec::new());
        }

        let mums = self.merged_hits(q_seq, s_seq, space, min_len);

        let whole = SearchSpace::whole(q_seq.len(), s_seq.len());
        let mut seen = FnvHashSet::default();
        let mums: Vec<Match> = mums
            .into_iter()
            .map(|m| m.expanded(q_seq, s_seq, &whole))
            .filter(|m| seen.insert((m.q_beg, m.s_beg)))
            .collect();

        log::trace!(
            "unique_index: {} unique matches of length >= {} in {}",
            mums.len(),
            min_len,
            space
        );

        Ok(mums)
    }

    fn name(&self) -> &'static str {
        "unique_index"
    }
}

impl Default for UniqueIndexFinder {
    fn default() -> Self {
        Self::new()
    }
}
