//! Hash-indexed seed finder
//!
//! Indexes every literal k-mer of the subject inside the search space and
//! looks up each query k-mer in it. Works for any alphabet.

use fnv::FnvHashMap;
use std::ops::RangeInclusive;

use super::utils::{window_range, VisitedCells};
use super::{Match, SearchSpace, SeedError, SeedFinder, SeedResult};

/// Literal k-mer hash index seed finder
pub struct HashIndexFinder {
    step: usize,
}

impl HashIndexFinder {
    pub fn new() -> Self {
        Self { step: 1 }
    }

    /// Index only every `step`-th subject window.
    pub fn with_step(step: usize) -> Self {
        Self { step: step.max(1) }
    }

    /// Map each subject k-mer in `starts` to its positions, ascending.
    fn index_subject<'a>(
        &self,
        s_seq: &'a [u8],
        starts: RangeInclusive<usize>,
        k: usize,
    ) -> FnvHashMap<&'a [u8], Vec<usize>> {
        let mut index: FnvHashMap<&[u8], Vec<usize>> = FnvHashMap::default();

        for pos in starts.step_by(self.step) {
            index.entry(&s_seq[pos..pos + k]).or_default().push(pos);
        }

        index
    }
}

impl SeedFinder for HashIndexFinder {
    fn find(
        &self,
        q_seq: &[u8],
        s_seq: &[u8],
        space: &SearchSpace,
        min_len: usize,
    ) -> SeedResult<Vec<Match>> {
        if min_len == 0 {
            return Err(SeedError::InvalidParams(
                "seed length must be at least 1".to_string(),
            ));
        }

        let mut matches = Vec::new();
        if space.is_empty() {
            return Ok(matches);
        }

        let (Some(q_starts), Some(s_starts)) = (
            window_range(space.q_min, space.q_max, min_len, q_seq.len()),
            window_range(space.s_min, space.s_max, min_len, s_seq.len()),
        ) else {
            return Ok(matches);
        };

        let index = self.index_subject(s_seq, s_starts, min_len);
        let mut visited = VisitedCells::new();

        for q_pos in q_starts {
            let Some(s_positions) = index.get(&q_seq[q_pos..q_pos + min_len]) else {
                continue;
            };

            for &s_pos in s_positions {
                if visited.contains(q_pos, s_pos) {
                    continue;
                }

                let mut seed = Match::new(q_pos, s_pos, min_len);
                seed.expand(q_seq, s_seq, space);
                visited.mark(&seed);
                matches.push(seed);
            }
        }

        log::trace!(
            "hash_index: {} seeds of length >= {} in {}",
            matches.len(),
            min_len,
            space
        );

        Ok(matches)
    }

    fn name(&self) -> &'static str {
        "hash_index"
    }
}

impl Default for HashIndexFinder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(q: &[u8], s: &[u8], space: SearchSpace, k: usize) -> Vec<String> {
        HashIndexFinder::new()
            .find(q, s, &space, k)
            .unwrap()
            .iter()
            .map(|m| m.to_string())
            .collect()
    }

    #[test]
    fn test_finder_name() {
        assert_eq!(HashIndexFinder::new().name(), "hash_index");
    }

    #[test]
    fn test_no_match_when_seed_longer_than_space() {
        assert!(find(b"atcg", b"atcg", SearchSpace::new(0, 0, 3, 3), 8).is_empty());
    }

    #[test]
    fn test_seed_exactly_as_long_as_space() {
        // One window per side when k equals the space dimension
        assert_eq!(
            find(b"atcg", b"atcg", SearchSpace::new(1, 1, 2, 2), 2),
            vec!["q: 1 2 s: 1 2 l: 2 s: 0.00"]
        );
        assert!(find(b"atcg", b"atcg", SearchSpace::new(1, 1, 2, 2), 3).is_empty());

        // Narrow subject side: three query windows, one subject window
        assert_eq!(
            find(b"gacgt", b"acg", SearchSpace::whole(5, 3), 3),
            vec!["q: 1 3 s: 0 2 l: 3 s: 0.00"]
        );
        assert!(find(b"gacgt", b"acg", SearchSpace::whole(5, 3), 4).is_empty());
    }

    #[test]
    fn test_one_match() {
        assert_eq!(
            find(b"01cg", b"cg23", SearchSpace::new(0, 0, 3, 3), 2),
            vec!["q: 2 3 s: 0 1 l: 2 s: 0.00"]
        );
        assert_eq!(
            find(b"cg23", b"01cg", SearchSpace::new(0, 0, 3, 3), 2),
            vec!["q: 0 1 s: 2 3 l: 2 s: 0.00"]
        );
    }

    #[test]
    fn test_two_matches() {
        let expected = vec!["q: 0 1 s: 0 1 l: 2 s: 0.00", "q: 3 4 s: 3 4 l: 2 s: 0.00"];
        assert_eq!(find(b"atXcg", b"atYcg", SearchSpace::new(0, 0, 4, 4), 2), expected);
        assert_eq!(find(b"atYcg", b"atXcg", SearchSpace::new(0, 0, 4, 4), 2), expected);
    }

    #[test]
    fn test_match_not_expanded_outside_space() {
        assert_eq!(
            find(b"atcg", b"atcg", SearchSpace::new(1, 1, 2, 2), 2),
            vec!["q: 1 2 s: 1 2 l: 2 s: 0.00"]
        );
    }

    #[test]
    fn test_right_expansion_suppresses_covered_seed() {
        // Seed at (0,0) grows to the full length; seed at (1,1) is covered.
        assert_eq!(
            find(b"atcg", b"atcg", SearchSpace::new(0, 0, 3, 3), 3),
            vec!["q: 0 3 s: 0 3 l: 4 s: 0.00"]
        );
    }

    #[test]
    fn test_repeats_report_every_diagonal() {
        let matches = HashIndexFinder::new()
            .find(b"acac", b"acac", &SearchSpace::whole(4, 4), 2)
            .unwrap();
        let cells: Vec<_> = matches.iter().map(|m| (m.q_beg, m.s_beg, m.length)).collect();

        assert_eq!(cells, vec![(0, 0, 4), (0, 2, 2), (2, 0, 2)]);
    }

    #[test]
    fn test_empty_space() {
        assert!(find(b"atcg", b"atcg", SearchSpace::new(2, 0, 1, 3), 1).is_empty());
    }

    #[test]
    fn test_zero_seed_length_is_rejected() {
        let result = HashIndexFinder::new().find(b"a", b"a", &SearchSpace::whole(1, 1), 0);
        assert!(matches!(result, Err(SeedError::InvalidParams(_))));
    }

    #[test]
    fn test_step_skips_subject_windows() {
        // Only even subject positions are indexed.
        let finder = HashIndexFinder::with_step(2);
        let matches = finder
            .find(b"gt", b"agta", &SearchSpace::whole(2, 4), 2)
            .unwrap();
        assert!(matches.is_empty());

        let matches = finder
            .find(b"ag", b"agta", &SearchSpace::whole(2, 4), 2)
            .unwrap();
        assert_eq!(matches.len(), 1);
    }
}
