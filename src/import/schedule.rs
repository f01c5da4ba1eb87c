//! Interval scheduling over document positions.
//!
//! Every recognized construct is a closed interval of preorder positions with
//! a priority. Candidates are taken in priority order (then document order)
//! and accepted unless they overlap something already accepted; the winners
//! come back sorted by position.

use std::collections::BTreeMap;

use crate::dom::NodeId;

/// What a candidate interval would become if accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// A `<figure>` wrapping audio, video, a frame or images.
    Figure(NodeId),
    /// A `wp:embed` comment pair; holds the opening comment.
    Embed { open: NodeId },
    Image(NodeId),
    Audio(NodeId),
    Video(NodeId),
    Frame(NodeId),
    /// A paragraph, heading, list item or leaf blockquote.
    Text(NodeId),
    /// A `<br>` outside any text container.
    Break(NodeId),
}

impl CandidateKind {
    /// Lower wins. Wrappers beat the media inside them, media beats text.
    pub fn priority(self) -> u8 {
        match self {
            Self::Figure(_) => 0,
            Self::Embed { .. } => 1,
            Self::Image(_) => 2,
            Self::Audio(_) => 3,
            Self::Video(_) => 4,
            Self::Frame(_) => 5,
            Self::Text(_) => 6,
            Self::Break(_) => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub start: u32,
    pub end: u32,
    pub kind: CandidateKind,
}

impl Candidate {
    pub fn new(start: u32, end: u32, kind: CandidateKind) -> Self {
        debug_assert!(start <= end);
        Self { start, end, kind }
    }
}

/// Accepted, non-overlapping intervals keyed by start.
#[derive(Debug, Default)]
pub struct Accepted {
    by_start: BTreeMap<u32, u32>,
}

impl Accepted {
    /// Whether `[start, end]` intersects an accepted interval.
    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        // Accepted intervals are disjoint, so the one starting last at or
        // before `end` is the only one that can reach back to `start`.
        self.by_start
            .range(..=end)
            .next_back()
            .is_some_and(|(_, &e)| e >= start)
    }

    /// Whether a single position lies inside an accepted interval.
    pub fn covers(&self, pos: u32) -> bool {
        self.overlaps(pos, pos)
    }

    fn insert(&mut self, start: u32, end: u32) {
        self.by_start.insert(start, end);
    }
}

/// Greedily pick non-overlapping candidates.
///
/// Returns the accepted candidates in document order together with the
/// coverage set, which the caller uses to find text nothing claimed.
pub fn schedule(mut candidates: Vec<Candidate>) -> (Vec<Candidate>, Accepted) {
    candidates.sort_by_key(|c| (c.kind.priority(), c.start, c.end));

    let mut accepted = Accepted::default();
    let mut winners = Vec::new();
    for candidate in candidates {
        if accepted.overlaps(candidate.start, candidate.end) {
            continue;
        }
        accepted.insert(candidate.start, candidate.end);
        winners.push(candidate);
    }

    winners.sort_by_key(|c| c.start);
    (winners, accepted)
}
