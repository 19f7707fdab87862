//! Greedy divide-and-conquer chaining
//!
//! The engine picks the best scoring seed in the current search space,
//! accepts it as an anchor and splits the space into the rectangle before
//! and the rectangle after the anchor. Each part is then handled the same
//! way, re-using leftover candidates from the parent space before asking
//! the seed finder again at a halved seed length. Accepted anchors are
//! pairwise collinear by construction.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::alignment::{AlignError, AlignResult, Alignment};
use crate::config::AlignConfig;
use crate::gaps::GapInserter;
use crate::geometry::dist_point_to_line;
use crate::seed::hash_index::HashIndexFinder;
use crate::seed::{SeedFinder, SeedFinderFactory};
use crate::types::{Match, SearchSpace, Sequence};

/// Seed length used for the first search space.
pub const DEFAULT_SEED_LEN: usize = 32;
pub const DEFAULT_LENGTH_WEIGHT: f64 = 1.0;
pub const DEFAULT_DIAGONAL_WEIGHT: f64 = -1.41;

/// Parameters for the chaining algorithm
#[derive(Debug, Clone)]
pub struct ChainParams {
    /// Seed length used for the whole-sequence search space
    pub initial_seed_len: usize,
    /// Weight of the match length in the score
    pub length_weight: f64,
    /// Weight of the distance to the nearest corner diagonal (negative)
    pub diagonal_weight: f64,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            initial_seed_len: DEFAULT_SEED_LEN,
            length_weight: DEFAULT_LENGTH_WEIGHT,
            diagonal_weight: DEFAULT_DIAGONAL_WEIGHT,
        }
    }
}

/// One pending search space together with the candidates inherited from
/// its parent.
struct Frame {
    space: SearchSpace,
    seed_len: usize,
    carried: Rc<[Match]>,
}

/// Pairwise aligner built on a seed finder and greedy chaining
pub struct AlignmentEngine {
    params: ChainParams,
    finder: Box<dyn SeedFinder>,
    gaps: GapInserter,
    upcase_matches: bool,
}

impl AlignmentEngine {
    pub fn new(params: ChainParams, finder: Box<dyn SeedFinder>) -> Self {
        Self {
            params,
            finder,
            gaps: GapInserter::default(),
            upcase_matches: true,
        }
    }

    /// Build an engine from a validated configuration.
    pub fn from_config(config: &AlignConfig) -> AlignResult<Self> {
        config.validate()?;

        let finder = SeedFinderFactory::create(&config.finder_params())?;
        let params = ChainParams {
            initial_seed_len: config.engine.initial_seed_len,
            length_weight: config.engine.length_weight,
            diagonal_weight: config.engine.diagonal_weight,
        };

        Ok(Self {
            params,
            finder,
            gaps: GapInserter::new(config.output.gap_byte(), config.output.neutral_quality_byte()),
            upcase_matches: config.engine.upcase_matches,
        })
    }

    pub fn with_gap_inserter(mut self, gaps: GapInserter) -> Self {
        self.gaps = gaps;
        self
    }

    pub fn with_upcase_matches(mut self, upcase: bool) -> Self {
        self.upcase_matches = upcase;
        self
    }

    pub fn params(&self) -> &ChainParams {
        &self.params
    }

    pub fn finder_name(&self) -> &'static str {
        self.finder.name()
    }

    /// Align `query` against `subject`.
    ///
    /// Both sequences are lower-cased, chained, matched spans are
    /// upper-cased (unless disabled) and gaps are inserted so that both
    /// rows end up the same length.
    pub fn align(&self, mut query: Sequence, mut subject: Sequence) -> AlignResult<Alignment> {
        if query.qual.as_ref().is_some_and(|q| q.len() != query.len()) {
            return Err(AlignError::InvalidParams(format!(
                "quality length differs from sequence length for {}",
                query.name
            )));
        }
        if subject.qual.as_ref().is_some_and(|q| q.len() != subject.len()) {
            return Err(AlignError::InvalidParams(format!(
                "quality length differs from sequence length for {}",
                subject.name
            )));
        }

        query.to_lowercase_in_place();
        subject.to_lowercase_in_place();

        let matches = self.chain(&query.seq, &subject.seq)?;

        if self.upcase_matches {
            for m in &matches {
                query.upcase_span(m.q_beg, m.q_end());
                subject.upcase_span(m.s_beg, m.s_end());
            }
        }

        self.gaps.insert(&mut query, &mut subject, &matches);

        log::debug!(
            "Aligned {} ({} bp) to {} ({} bp) with {} anchors",
            query.name,
            query.len(),
            subject.name,
            subject.len(),
            matches.len()
        );

        Ok(Alignment::new(vec![query, subject]))
    }

    /// Collect collinear anchors between `q_seq` and `s_seq`, in the order
    /// they were accepted.
    pub fn chain(&self, q_seq: &[u8], s_seq: &[u8]) -> AlignResult<Vec<Match>> {
        let mut accepted = Vec::new();
        let whole = SearchSpace::whole(q_seq.len(), s_seq.len());
        if whole.is_empty() {
            return Ok(accepted);
        }

        let mut stack = vec![Frame {
            space: whole,
            seed_len: self.params.initial_seed_len,
            carried: Rc::from(Vec::new()),
        }];

        while let Some(frame) = stack.pop() {
            self.chain_space(q_seq, s_seq, frame, &mut accepted, &mut stack)?;
        }

        log::debug!(
            "Chained {} anchors using {} from seed length {}",
            accepted.len(),
            self.finder.name(),
            self.params.initial_seed_len
        );

        Ok(accepted)
    }

    fn chain_space(
        &self,
        q_seq: &[u8],
        s_seq: &[u8],
        frame: Frame,
        accepted: &mut Vec<Match>,
        stack: &mut Vec<Frame>,
    ) -> AlignResult<()> {
        let space = frame.space;
        let inherited: Vec<Match> = frame
            .carried
            .iter()
            .filter(|m| space.contains(m))
            .copied()
            .collect();

        let mut candidates = self.select_by_score(inherited, &space);
        let mut seed_len = frame.seed_len;

        while candidates.is_empty() && seed_len > 0 {
            let mut found: Vec<Match> = self
                .finder
                .find(q_seq, s_seq, &space, seed_len)?
                .into_iter()
                .filter(|m| space.contains(m))
                .collect();

            candidates = if accepted.is_empty() {
                // Nothing anchored yet: the longest seed wins outright.
                found.sort_by_key(|m| m.length);
                found
            } else {
                self.select_by_score(found, &space)
            };

            seed_len /= 2;
        }

        let Some(best) = candidates.pop() else {
            log::trace!("No anchor in {}", space);
            return Ok(());
        };

        log::trace!("Anchor {} in {}", best, space);
        accepted.push(best);

        let carried: Rc<[Match]> = Rc::from(candidates);
        let left = space.left_of(&best);
        let right = space.right_of(&best);

        // Right goes on the stack first so the left part is finished first.
        if !right.is_empty() {
            stack.push(Frame {
                space: right,
                seed_len,
                carried: Rc::clone(&carried),
            });
        }
        if !left.is_empty() {
            stack.push(Frame {
                space: left,
                seed_len,
                carried,
            });
        }

        Ok(())
    }

    /// Score every candidate, sort ascending by score and drop those that
    /// do not score above zero. The best candidate ends up last.
    pub fn select_by_score(&self, mut candidates: Vec<Match>, space: &SearchSpace) -> Vec<Match> {
        for m in candidates.iter_mut() {
            m.score = self.score(m, space);
        }

        candidates.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));
        candidates.retain(|m| m.score > 0.0);
        candidates
    }

    pub fn score(&self, m: &Match, space: &SearchSpace) -> f64 {
        m.length as f64 * self.params.length_weight
            + diagonal_distance(m, space) * self.params.diagonal_weight
    }
}

impl Default for AlignmentEngine {
    fn default() -> Self {
        Self::new(ChainParams::default(), Box::new(HashIndexFinder::new()))
    }
}

/// Distance from the start of `m` to the nearer of the two corner diagonals
/// of `space`: the 45 degree line through its lower-left corner and the one
/// through its upper-right corner, each as long as the shorter side.
pub fn diagonal_distance(m: &Match, space: &SearchSpace) -> f64 {
    let dim = space.q_dim().min(space.s_dim()) as f64;
    let (px, py) = (m.q_beg as f64, m.s_beg as f64);
    let (q_min, s_min) = (space.q_min as f64, space.s_min as f64);
    let (q_max, s_max) = (space.q_max as f64, space.s_max as f64);

    let to_begin = dist_point_to_line(px, py, q_min, s_min, q_min + dim, s_min + dim);
    let to_end = dist_point_to_line(px, py, q_max - dim, s_max - dim, q_max, s_max);

    to_begin.min(to_end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::packed::PackedKeyFinder;
    use crate::seed::unique::UniqueIndexFinder;

    fn cells(matches: &[Match]) -> Vec<(usize, usize, usize)> {
        matches.iter().map(|m| (m.q_beg, m.s_beg, m.length)).collect()
    }

    #[test]
    fn test_identical_sequences_give_one_anchor() {
        let engine = AlignmentEngine::default();
        assert_eq!(cells(&engine.chain(b"atcg", b"atcg").unwrap()), vec![(0, 0, 4)]);
    }

    #[test]
    fn test_two_anchors_right_then_left() {
        let engine = AlignmentEngine::default();
        let matches = engine.chain(b"atxcg", b"atycg").unwrap();

        assert_eq!(cells(&matches), vec![(3, 3, 2), (0, 0, 2)]);
    }

    #[test]
    fn test_no_common_symbols() {
        let engine = AlignmentEngine::default();
        assert!(engine.chain(b"aaaa", b"tttt").unwrap().is_empty());
    }

    #[test]
    fn test_empty_input() {
        let engine = AlignmentEngine::default();
        assert!(engine.chain(b"", b"acgt").unwrap().is_empty());
        assert!(engine.chain(b"acgt", b"").unwrap().is_empty());
    }

    #[test]
    fn test_anchors_are_collinear_and_disjoint() {
        let q = b"ggggaaaaccccttttacgtacgtgggg";
        let s = b"ggggaaaatccccttttacgtaacgtgggg";
        let mut matches = AlignmentEngine::default().chain(q, s).unwrap();
        assert!(!matches.is_empty());

        matches.sort_by_key(|m| m.q_beg);
        for pair in matches.windows(2) {
            assert!(pair[0].q_end() < pair[1].q_beg);
            assert!(pair[0].s_end() < pair[1].s_beg);
        }
        for m in &matches {
            assert_eq!(&q[m.q_beg..=m.q_end()], &s[m.s_beg..=m.s_end()]);
        }
    }

    #[test]
    fn test_diagonal_distance_on_square_space() {
        let space = SearchSpace::whole(10, 10);
        assert_eq!(diagonal_distance(&Match::new(3, 3, 2), &space), 0.0);

        let off = diagonal_distance(&Match::new(0, 4, 2), &space);
        assert!((off - 4.0 / 2f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_diagonal_distance_uses_nearer_corner() {
        // Wide space: the upper-right diagonal runs through (15, 0) and (19, 4).
        let space = SearchSpace::whole(20, 5);
        let near_end = diagonal_distance(&Match::new(15, 0, 2), &space);
        assert!(near_end.abs() < 1e-9);

        let near_begin = diagonal_distance(&Match::new(1, 1, 2), &space);
        assert!(near_begin.abs() < 1e-9);
    }

    #[test]
    fn test_select_by_score_drops_non_positive() {
        let engine = AlignmentEngine::default();
        let space = SearchSpace::whole(100, 100);
        let candidates = vec![
            Match::new(0, 0, 5),
            Match::new(0, 60, 3),
            Match::new(10, 10, 8),
        ];
        let selected = engine.select_by_score(candidates, &space);

        assert_eq!(cells(&selected), vec![(0, 0, 5), (10, 10, 8)]);
        assert!(selected.windows(2).all(|w| w[0].score <= w[1].score));
    }

    #[test]
    fn test_score_formula() {
        let engine = AlignmentEngine::default();
        let space = SearchSpace::whole(10, 10);
        let m = Match::new(0, 2, 4);
        let expected = 4.0 - 1.41 * (2.0 / 2f64.sqrt());
        assert!((engine.score(&m, &space) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_initial_seed_len_zero_finds_nothing() {
        let params = ChainParams {
            initial_seed_len: 0,
            ..Default::default()
        };
        let engine = AlignmentEngine::new(params, Box::new(HashIndexFinder::new()));
        assert!(engine.chain(b"acgt", b"acgt").unwrap().is_empty());
    }

    #[test]
    fn test_every_finder_chains_a_shared_block() {
        let q = b"ttttttttacgatcgatgcatgcaaaaaaaa";
        let s = b"ccacgatcgatgcatgcagg";
        let finders: Vec<Box<dyn SeedFinder>> = vec![
            Box::new(HashIndexFinder::new()),
            Box::new(PackedKeyFinder::new()),
            Box::new(UniqueIndexFinder::new()),
        ];

        for finder in finders {
            let name = finder.name();
            let engine = AlignmentEngine::new(ChainParams::default(), finder);
            let matches = engine.chain(q, s).unwrap();
            assert!(
                matches.iter().any(|m| m.q_beg == 8 && m.s_beg == 2 && m.length == 16),
                "{} missed the shared block: {:?}",
                name,
                matches
            );
        }
    }

    #[test]
    fn test_finder_errors_propagate() {
        let engine = AlignmentEngine::new(ChainParams::default(), Box::new(PackedKeyFinder::new()));
        let result = engine.chain(b"acgnacgt", b"acgtacgt");
        assert!(matches!(result, Err(AlignError::Seed(_))));
    }
}
