//! Shared utilities for the seed finders

use fnv::FnvHashSet;
use std::ops::RangeInclusive;

use crate::types::Match;

/// Longest k-mer that still packs into a `u64` key.
pub const MAX_PACKED_K: usize = 32;

/// Encode a nucleotide to its 2-bit code (A=0, T/U=1, C=2, G=3).
pub fn encode_nucleotide(nucleotide: u8) -> Option<u64> {
    match nucleotide.to_ascii_lowercase() {
        b'a' => Some(0),
        b't' | b'u' => Some(1),
        b'c' => Some(2),
        b'g' => Some(3),
        _ => None,
    }
}

/// Bit mask covering `k` packed bases.
pub fn kmer_mask(k: usize) -> u64 {
    if k >= MAX_PACKED_K {
        u64::MAX
    } else {
        (1u64 << (2 * k)) - 1
    }
}

/// Start positions of every complete `k`-window inside the inclusive
/// interval `min..=max`, clamped to a sequence of length `len`.
pub fn window_range(min: isize, max: isize, k: usize, len: usize) -> Option<RangeInclusive<usize>> {
    if k == 0 || len == 0 {
        return None;
    }

    let lo = min.max(0) as usize;
    let hi = max.min(len as isize - 1);
    if hi < 0 {
        return None;
    }
    let hi = hi as usize;

    if hi < lo || hi - lo + 1 < k {
        return None;
    }

    Some(lo..=hi - k + 1)
}

/// Rolling window of the last `k` bases packed two bits each.
pub struct KeyWindow {
    key: u64,
    mask: u64,
    k: usize,
    filled: usize,
}

impl KeyWindow {
    pub fn new(k: usize) -> Self {
        Self {
            key: 0,
            mask: kmer_mask(k),
            k,
            filled: 0,
        }
    }

    /// Shift in one base. Returns the current key once `k` valid bases have
    /// been seen since the last undefined symbol, `None` otherwise.
    pub fn push(&mut self, nucleotide: u8) -> Option<u64> {
        match encode_nucleotide(nucleotide) {
            Some(code) => {
                self.key = ((self.key << 2) | code) & self.mask;
                self.filled = (self.filled + 1).min(self.k);
                (self.filled == self.k).then_some(self.key)
            }
            None => {
                self.reset();
                None
            }
        }
    }

    pub fn reset(&mut self) {
        self.key = 0;
        self.filled = 0;
    }
}

/// Packed keys of every `k`-window starting in `starts`, or `None` for a
/// window that contains an undefined base.
pub fn window_keys(seq: &[u8], starts: RangeInclusive<usize>, k: usize) -> Vec<Option<u64>> {
    let first = *starts.start();
    let last = *starts.end();
    let mut window = KeyWindow::new(k);
    let mut keys = Vec::with_capacity(last - first + 1);

    for i in first..last + k {
        let key = window.push(seq[i]);
        if i + 1 >= first + k {
            keys.push(key);
        }
    }

    keys
}

/// Set of `(q, s)` cells already covered by a reported match.
///
/// Keyed by the coordinate pair itself, so no two distinct cells can ever
/// collide regardless of sequence length.
#[derive(Debug, Default)]
pub struct VisitedCells {
    cells: FnvHashSet<(usize, usize)>,
}

impl VisitedCells {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, q: usize, s: usize) -> bool {
        self.cells.contains(&(q, s))
    }

    /// Mark every diagonal cell of `m`.
    pub fn mark(&mut self, m: &Match) {
        for j in 0..m.length {
            self.cells.insert((m.q_beg + j, m.s_beg + j));
        }
    }
}
