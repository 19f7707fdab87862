//! Packed-key maximal exact match finder
//!
//! Nucleotides are packed two bits per base. The subject windows of the
//! search space are threaded into singly linked buckets (parallel `head` and
//! `next` arrays over the `4^key_len` key space); every query window then
//! walks the bucket of its key and each hit is grown into a maximal exact
//! match.

use std::ops::RangeInclusive;

use super::utils::{encode_nucleotide, window_keys, window_range, VisitedCells};
use super::{Match, SearchSpace, SeedError, SeedFinder, SeedResult};

/// Default cap on the number of bases a bucket key covers.
pub const DEFAULT_MAX_KEY_LEN: usize = 10;

/// Hard cap: `4^16` buckets is the largest head array we allow.
pub const MAX_KEY_LEN_LIMIT: usize = 16;

const NIL: usize = usize::MAX;

/// 2-bit packed bucket index seed finder (nucleotides only)
pub struct PackedKeyFinder {
    max_key_len: usize,
}

impl PackedKeyFinder {
    pub fn new() -> Self {
        Self {
            max_key_len: DEFAULT_MAX_KEY_LEN,
        }
    }

    pub fn with_max_key_len(max_key_len: usize) -> SeedResult<Self> {
        if max_key_len == 0 || max_key_len > MAX_KEY_LEN_LIMIT {
            return Err(SeedError::InvalidParams(format!(
                "packed key length must be between 1 and {}, got {}",
                MAX_KEY_LEN_LIMIT, max_key_len
            )));
        }
        Ok(Self { max_key_len })
    }

    /// Bases per bucket key: no longer than the seed or the cap, and no
    /// longer than needed to give every indexed window its own bucket.
    fn bucket_key_len(&self, k: usize, windows: usize) -> usize {
        let mut needed = 1;
        while needed < self.max_key_len && (1usize << (2 * needed)) < windows {
            needed += 1;
        }
        k.min(needed)
    }
}

/// Reject any symbol outside ACGT/U in the bases covered by `starts`.
fn check_alphabet(seq: &[u8], starts: &RangeInclusive<usize>, k: usize) -> SeedResult<()> {
    let covered = *starts.start()..*starts.end() + k;
    for position in covered {
        let symbol = seq[position];
        if encode_nucleotide(symbol).is_none() {
            return Err(SeedError::InvalidAlphabet {
                symbol: symbol as char,
                position,
            });
        }
    }
    Ok(())
}

struct BucketIndex {
    head: Vec<usize>,
    next: Vec<usize>,
    first: usize,
}

impl BucketIndex {
    /// Thread the windows so each bucket lists its positions in ascending
    /// order.
    fn build(keys: &[Option<u64>], first: usize, key_len: usize) -> Self {
        let mut head = vec![NIL; 1usize << (2 * key_len)];
        let mut next = vec![NIL; keys.len()];

        for (i, key) in keys.iter().enumerate().rev() {
            if let Some(key) = key {
                let bucket = *key as usize;
                next[i] = head[bucket];
                head[bucket] = first + i;
            }
        }

        Self { head, next, first }
    }

    fn bucket(&self, key: u64) -> BucketIter<'_> {
        BucketIter {
            index: self,
            pos: self.head[key as usize],
        }
    }
}

struct BucketIter<'a> {
    index: &'a BucketIndex,
    pos: usize,
}

impl Iterator for BucketIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.pos == NIL {
            return None;
        }
        let pos = self.pos;
        self.pos = self.index.next[pos - self.index.first];
        Some(pos)
    }
}

impl SeedFinder for PackedKeyFinder {
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

        check_alphabet(s_seq, &s_starts, min_len)?;
        check_alphabet(q_seq, &q_starts, min_len)?;

        let key_len = self.bucket_key_len(min_len, s_starts.clone().count());
        if key_len < min_len {
            log::trace!(
                "packed_key: keying seed length {} on its first {} bases",
                min_len,
                key_len
            );
        }

        let s_keys = window_keys(s_seq, s_starts.clone(), key_len);
        let index = BucketIndex::build(&s_keys, *s_starts.start(), key_len);
        let q_keys = window_keys(q_seq, q_starts.clone(), key_len);
        let mut visited = VisitedCells::new();

        for (q_pos, q_key) in q_starts.zip(q_keys) {
            let Some(q_key) = q_key else {
                continue;
            };
            let q_word = &q_seq[q_pos..q_pos + min_len];

            for s_pos in index.bucket(q_key) {
                if visited.contains(q_pos, s_pos) || q_word != &s_seq[s_pos..s_pos + min_len] {
                    continue;
                }

                let mut seed = Match::new(q_pos, s_pos, min_len);
                seed.expand(q_seq, s_seq, space);
                visited.mark(&seed);
                matches.push(seed);
            }
        }

        log::trace!(
            "packed_key: {} seeds of length >= {} in {}",
            matches.len(),
            min_len,
            space
        );

        Ok(matches)
    }

    fn name(&self) -> &'static str {
        "packed_key"
    }
}

impl Default for PackedKeyFinder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(matches: &[Match]) -> Vec<(usize, usize, usize)> {
        matches.iter().map(|m| (m.q_beg, m.s_beg, m.length)).collect()
    }

    #[test]
    fn test_finder_name() {
        assert_eq!(PackedKeyFinder::new().name(), "packed_key");
    }

    #[test]
    fn test_no_match_when_seed_longer_than_space() {
        let matches = PackedKeyFinder::new()
            .find(b"atcg", b"atcg", &SearchSpace::whole(4, 4), 8)
            .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_seed_exactly_as_long_as_space() {
        let finder = PackedKeyFinder::new();
        let space = SearchSpace::new(1, 1, 2, 2);
        assert_eq!(cells(&finder.find(b"atcg", b"atcg", &space, 2).unwrap()), vec![(1, 1, 2)]);
        assert!(finder.find(b"atcg", b"atcg", &space, 3).unwrap().is_empty());

        let space = SearchSpace::whole(5, 3);
        assert_eq!(cells(&finder.find(b"gacgt", b"acg", &space, 3).unwrap()), vec![(1, 0, 3)]);
        assert!(finder.find(b"gacgt", b"acg", &space, 4).unwrap().is_empty());
    }

    #[test]
    fn test_two_separated_matches() {
        let matches = PackedKeyFinder::new()
            .find(b"atacg", b"atgcg", &SearchSpace::whole(5, 5), 2)
            .unwrap();
        assert_eq!(cells(&matches), vec![(0, 0, 2), (3, 3, 2)]);
    }

    #[test]
    fn test_query_coordinates_refer_to_query() {
        let matches = PackedKeyFinder::new()
            .find(b"ttcg", b"cgaa", &SearchSpace::whole(4, 4), 2)
            .unwrap();
        assert_eq!(cells(&matches), vec![(2, 0, 2)]);
    }

    #[test]
    fn test_expansion_stays_in_space() {
        let matches = PackedKeyFinder::new()
            .find(b"atcg", b"atcg", &SearchSpace::new(1, 1, 2, 2), 2)
            .unwrap();
        assert_eq!(cells(&matches), vec![(1, 1, 2)]);
    }

    #[test]
    fn test_long_seed_with_capped_key() {
        let q = b"ggggacgtacgtacgtacgtacgtcccc";
        let s = b"ttacgtacgtacgtacgtacgtaa";
        let finder = PackedKeyFinder::with_max_key_len(2).unwrap();
        let matches = finder.find(q, s, &SearchSpace::whole(q.len(), s.len()), 20).unwrap();

        assert_eq!(cells(&matches), vec![(4, 2, 20)]);
    }

    #[test]
    fn test_invalid_symbol_is_an_error() {
        let result = PackedKeyFinder::new().find(b"acgt", b"acnt", &SearchSpace::whole(4, 4), 2);
        match result {
            Err(SeedError::InvalidAlphabet { symbol, position }) => {
                assert_eq!(symbol, 'n');
                assert_eq!(position, 2);
            }
            other => panic!("expected InvalidAlphabet, got {:?}", other),
        }
    }

    #[test]
    fn test_symbols_outside_space_are_not_checked() {
        let matches = PackedKeyFinder::new()
            .find(b"nacg", b"acgn", &SearchSpace::new(1, 0, 3, 2), 3)
            .unwrap();
        assert_eq!(cells(&matches), vec![(1, 0, 3)]);
    }

    #[test]
    fn test_t_and_u_share_a_key_but_not_a_match() {
        let matches = PackedKeyFinder::new()
            .find(b"acgt", b"acgu", &SearchSpace::whole(4, 4), 4)
            .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_key_length_bounds() {
        assert!(PackedKeyFinder::with_max_key_len(0).is_err());
        assert!(PackedKeyFinder::with_max_key_len(17).is_err());
        assert!(PackedKeyFinder::with_max_key_len(16).is_ok());
    }

    #[test]
    fn test_bucket_key_len() {
        let finder = PackedKeyFinder::new();
        assert_eq!(finder.bucket_key_len(32, 3), 1);
        assert_eq!(finder.bucket_key_len(32, 17), 3);
        assert_eq!(finder.bucket_key_len(2, 1_000_000), 2);
        assert_eq!(finder.bucket_key_len(32, usize::MAX), DEFAULT_MAX_KEY_LEN);
    }
}
