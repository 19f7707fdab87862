use serde::{Deserialize, Serialize};
use std::fmt;

/// A named symbol sequence with optional per-symbol qualities.
///
/// Matching is case-insensitive only because the engine lower-cases both
/// sequences before seeding; case otherwise only matters for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub name: String,
    pub seq: Vec<u8>,
    pub qual: Option<Vec<u8>>,
}

impl Sequence {
    pub fn new<N: Into<String>, S: Into<Vec<u8>>>(name: N, seq: S) -> Self {
        Self {
            name: name.into(),
            seq: seq.into(),
            qual: None,
        }
    }

    pub fn with_qual<Q: Into<Vec<u8>>>(mut self, qual: Q) -> Self {
        self.qual = Some(qual.into());
        self
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn as_str_lossy(&self) -> String {
        String::from_utf8_lossy(&self.seq).into_owned()
    }

    pub fn to_lowercase_in_place(&mut self) {
        self.seq.make_ascii_lowercase();
    }

    /// Upper-case the inclusive span `beg..=end`, clamped to the sequence.
    pub fn upcase_span(&mut self, beg: usize, end: usize) {
        if beg >= self.seq.len() || end < beg {
            return;
        }
        let end = end.min(self.seq.len() - 1);
        self.seq[beg..=end].make_ascii_uppercase();
    }

    /// Insert runs of gap symbols. Each `(pos, count)` places `count` gaps
    /// before the symbol currently at `pos` (ungapped coordinates); entries
    /// must be sorted by `pos`. Qualities, when present, receive
    /// `neutral_qual` at exactly the same indices.
    pub fn insert_gaps(&mut self, inserts: &[(usize, usize)], gap: u8, neutral_qual: u8) {
        if inserts.iter().all(|&(_, count)| count == 0) {
            return;
        }

        self.seq = splice_runs(&self.seq, inserts, gap);
        if let Some(qual) = &self.qual {
            self.qual = Some(splice_runs(qual, inserts, neutral_qual));
        }
    }

    /// Append `count` gap symbols (and neutral qualities).
    pub fn pad_end(&mut self, count: usize, gap: u8, neutral_qual: u8) {
        self.seq.extend(std::iter::repeat(gap).take(count));
        if let Some(qual) = self.qual.as_mut() {
            qual.extend(std::iter::repeat(neutral_qual).take(count));
        }
    }
}

fn splice_runs(src: &[u8], inserts: &[(usize, usize)], fill: u8) -> Vec<u8> {
    let total: usize = inserts.iter().map(|&(_, count)| count).sum();
    let mut out = Vec::with_capacity(src.len() + total);
    let mut last = 0;

    for &(pos, count) in inserts {
        let pos = pos.clamp(last, src.len());
        out.extend_from_slice(&src[last..pos]);
        out.extend(std::iter::repeat(fill).take(count));
        last = pos;
    }
    out.extend_from_slice(&src[last..]);

    out
}

/// Inclusive rectangle of query (Q) and subject (S) coordinates inside
/// which seeds may be searched.
///
/// Bounds are signed so that splitting around a match at coordinate 0
/// yields an empty space (`max = -1`) rather than an underflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchSpace {
    pub q_min: isize,
    pub s_min: isize,
    pub q_max: isize,
    pub s_max: isize,
}

impl SearchSpace {
    pub fn new(q_min: isize, s_min: isize, q_max: isize, s_max: isize) -> Self {
        Self { q_min, s_min, q_max, s_max }
    }

    /// Space covering two whole sequences.
    pub fn whole(q_len: usize, s_len: usize) -> Self {
        Self::new(0, 0, q_len as isize - 1, s_len as isize - 1)
    }

    pub fn is_empty(&self) -> bool {
        self.q_max < self.q_min || self.s_max < self.s_min
    }

    pub fn q_dim(&self) -> isize {
        self.q_max - self.q_min + 1
    }

    pub fn s_dim(&self) -> isize {
        self.s_max - self.s_min + 1
    }

    /// True when `m` lies completely inside this space.
    pub fn contains(&self, m: &Match) -> bool {
        m.q_beg as isize >= self.q_min
            && m.s_beg as isize >= self.s_min
            && m.q_end() as isize <= self.q_max
            && m.s_end() as isize <= self.s_max
    }

    /// The part of this space strictly before `m` on both axes.
    pub fn left_of(&self, m: &Match) -> Self {
        Self::new(
            self.q_min,
            self.s_min,
            m.q_beg as isize - 1,
            m.s_beg as isize - 1,
        )
    }

    /// The part of this space strictly after `m` on both axes.
    pub fn right_of(&self, m: &Match) -> Self {
        Self::new(
            m.q_end() as isize + 1,
            m.s_end() as isize + 1,
            self.q_max,
            self.s_max,
        )
    }
}

impl fmt::Display for SearchSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "q: {}..={} s: {}..={}",
            self.q_min, self.q_max, self.s_min, self.s_max
        )
    }
}

/// An exact shared segment: `Q[q_beg..q_beg + length]` equals
/// `S[s_beg..s_beg + length]`.
///
/// `score` is relative to whichever search space the match was last scored
/// against; it carries no global meaning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub q_beg: usize,
    pub s_beg: usize,
    pub length: usize,
    pub score: f64,
}

impl Match {
    pub fn new(q_beg: usize, s_beg: usize, length: usize) -> Self {
        Self {
            q_beg,
            s_beg,
            length,
            score: 0.0,
        }
    }

    pub fn q_end(&self) -> usize {
        self.q_beg + self.length - 1
    }

    pub fn s_end(&self) -> usize {
        self.s_beg + self.length - 1
    }

    /// Diagonal offset `q - s` of the match.
    pub fn diagonal(&self) -> isize {
        self.q_beg as isize - self.s_beg as isize
    }

    /// Grow the match in place, first left then right, for as long as the
    /// flanking symbols are equal and the new cells stay inside `space`.
    /// Never reads outside `space` or outside either sequence.
    pub fn expand(&mut self, q_seq: &[u8], s_seq: &[u8], space: &SearchSpace) {
        while self.q_beg > 0
            && self.s_beg > 0
            && self.q_beg as isize > space.q_min
            && self.s_beg as isize > space.s_min
            && same_symbol(q_seq, s_seq, self.q_beg - 1, self.s_beg - 1)
        {
            self.q_beg -= 1;
            self.s_beg -= 1;
            self.length += 1;
        }

        while (self.q_end() as isize) < space.q_max
            && (self.s_end() as isize) < space.s_max
            && same_symbol(q_seq, s_seq, self.q_end() + 1, self.s_end() + 1)
        {
            self.length += 1;
        }
    }

    /// Non-mutating form of [`Match::expand`].
    pub fn expanded(&self, q_seq: &[u8], s_seq: &[u8], space: &SearchSpace) -> Self {
        let mut grown = *self;
        grown.expand(q_seq, s_seq, space);
        grown
    }

    /// Display form followed by the matched query substring.
    pub fn describe(&self, q_seq: &[u8]) -> String {
        let end = (self.q_beg + self.length).min(q_seq.len());
        let beg = self.q_beg.min(end);
        format!("{} {}", self, String::from_utf8_lossy(&q_seq[beg..end]))
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "q: {} {} s: {} {} l: {} s: {:.2}",
            self.q_beg,
            self.q_end(),
            self.s_beg,
            self.s_end(),
            self.length,
            self.score
        )
    }
}

fn same_symbol(q_seq: &[u8], s_seq: &[u8], q: usize, s: usize) -> bool {
    matches!((q_seq.get(q), s_seq.get(s)), (Some(a), Some(b)) if a == b)
}
