//! Gap insertion between chained anchors

use crate::types::{Match, Sequence};

/// Symbol used for alignment gaps.
pub const GAP: u8 = b'-';

/// Quality symbol written at every inserted gap.
pub const NEUTRAL_QUALITY: u8 = b'@';

/// Pads two sequences with gaps so that every anchor lands in the same
/// columns of both rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapInserter {
    gap: u8,
    neutral_qual: u8,
}

/// Ungapped `(position, count)` insertions for query and subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GapPlan {
    pub query: Vec<(usize, usize)>,
    pub subject: Vec<(usize, usize)>,
}

impl GapPlan {
    /// Work out where gaps go for `matches`, visited by ascending `q_beg`.
    /// The first anchor's offset is corrected at column 0; every later
    /// anchor's offset is corrected just before the anchor itself.
    pub fn for_matches(matches: &[Match]) -> Self {
        let mut sorted = matches.to_vec();
        sorted.sort_by_key(|m| m.q_beg);

        let mut plan = Self::default();
        let (mut q_gaps, mut s_gaps) = (0usize, 0usize);

        for (i, m) in sorted.iter().enumerate() {
            let q_col = (m.q_beg + q_gaps) as isize;
            let s_col = (m.s_beg + s_gaps) as isize;
            let diff = q_col - s_col;
            let count = diff.unsigned_abs();

            let (q_at, s_at) = if i == 0 { (0, 0) } else { (m.q_beg, m.s_beg) };

            if diff < 0 {
                plan.query.push((q_at, count));
                q_gaps += count;
            } else if diff > 0 {
                plan.subject.push((s_at, count));
                s_gaps += count;
            }
        }

        plan
    }

    pub fn total_gaps(&self) -> usize {
        self.query
            .iter()
            .chain(&self.subject)
            .map(|&(_, count)| count)
            .sum()
    }
}

impl GapInserter {
    pub fn new(gap: u8, neutral_qual: u8) -> Self {
        Self { gap, neutral_qual }
    }

    /// Insert gaps for `matches` into both sequences, then pad the shorter
    /// one at its end. Qualities receive the neutral symbol at the same
    /// indices as the gaps.
    pub fn insert(&self, query: &mut Sequence, subject: &mut Sequence, matches: &[Match]) {
        let plan = GapPlan::for_matches(matches);

        query.insert_gaps(&plan.query, self.gap, self.neutral_qual);
        subject.insert_gaps(&plan.subject, self.gap, self.neutral_qual);

        let (q_len, s_len) = (query.len(), subject.len());
        if q_len < s_len {
            query.pad_end(s_len - q_len, self.gap, self.neutral_qual);
        } else {
            subject.pad_end(q_len - s_len, self.gap, self.neutral_qual);
        }

        log::trace!(
            "Inserted {} gaps ({} trailing)",
            plan.total_gaps() + q_len.abs_diff(s_len),
            q_len.abs_diff(s_len)
        );
    }
}

impl Default for GapInserter {
    fn default() -> Self {
        Self::new(GAP, NEUTRAL_QUALITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(q: &str, s: &str, matches: &[Match]) -> (String, String) {
        let mut query = Sequence::new("q", q);
        let mut subject = Sequence::new("s", s);
        GapInserter::default().insert(&mut query, &mut subject, matches);
        (query.as_str_lossy(), subject.as_str_lossy())
    }

    #[test]
    fn test_no_matches_pads_shorter_sequence() {
        assert_eq!(run("aaaa", "tt", &[]), ("aaaa".into(), "tt--".into()));
        assert_eq!(run("tt", "aaaa", &[]), ("tt--".into(), "aaaa".into()));
        assert_eq!(run("aaaa", "tttt", &[]), ("aaaa".into(), "tttt".into()));
    }

    #[test]
    fn test_leading_offset_goes_to_column_zero() {
        // "acgt" sits at q 0 and s 2
        let (q, s) = run("acgt", "ttacgt", &[Match::new(0, 2, 4)]);
        assert_eq!(q, "--acgt");
        assert_eq!(s, "ttacgt");

        let (q, s) = run("ggacgt", "acgt", &[Match::new(2, 0, 4)]);
        assert_eq!(q, "ggacgt");
        assert_eq!(s, "--acgt");
    }

    #[test]
    fn test_later_offset_goes_before_its_match() {
        // q: aaccgg, s: aatttccgg. Anchors aa (0,0) and ccgg (2,5).
        let (q, s) = run(
            "aaccgg",
            "aatttccgg",
            &[Match::new(2, 5, 4), Match::new(0, 0, 2)],
        );
        assert_eq!(q, "aa---ccgg");
        assert_eq!(s, "aatttccgg");
    }

    #[test]
    fn test_offsets_accumulate() {
        let matches = [Match::new(0, 0, 2), Match::new(4, 2, 2), Match::new(6, 6, 2)];
        let (q, s) = run("aattccgg", "aaccttgg", &matches);

        assert_eq!(q, "aattcc--gg");
        assert_eq!(s, "aa--ccttgg");
    }

    #[test]
    fn test_qualities_follow_gaps() {
        let mut query = Sequence::new("q", "acgt").with_qual("IIII");
        let mut subject = Sequence::new("s", "ttacgtc").with_qual("JJJJJJJ");
        GapInserter::default().insert(&mut query, &mut subject, &[Match::new(0, 2, 4)]);

        assert_eq!(query.seq, b"--acgt-");
        assert_eq!(query.qual.as_deref(), Some(&b"@@IIII@"[..]));
        assert_eq!(subject.seq, b"ttacgtc");
        assert_eq!(subject.qual.as_deref(), Some(&b"JJJJJJJ"[..]));
    }

    #[test]
    fn test_custom_symbols() {
        let mut query = Sequence::new("q", "ac").with_qual("II");
        let mut subject = Sequence::new("s", "acg");
        GapInserter::new(b'.', b'!').insert(&mut query, &mut subject, &[]);

        assert_eq!(query.seq, b"ac.");
        assert_eq!(query.qual.as_deref(), Some(&b"II!"[..]));
    }

    #[test]
    fn test_plan() {
        let plan = GapPlan::for_matches(&[Match::new(3, 0, 2), Match::new(6, 5, 1)]);
        assert_eq!(plan.subject, vec![(0, 3)]);
        assert_eq!(plan.query, vec![(6, 2)]);
        assert_eq!(plan.total_gaps(), 5);
    }
}
