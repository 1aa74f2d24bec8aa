//! Anchor resolution: where new material enters a ring
//!
//! Works on a ring's own edge sequence (indices local to the ring). The
//! split is `top = 0..top_end`, `replaced = top_end..bottom_start`,
//! `bottom = bottom_start..len`.

use std::ops::Range;

use super::chain::Edge;

/// Which anchors were found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorCase {
    /// Near and far anchors in order; the span between them is replaced
    Bracketed,
    /// Both found but reversed; positions swapped, then bracketed
    Swapped,
    /// Only the far-end anchor; insert before it
    FarOnly,
    /// Only the near-end anchor; insert after it
    NearOnly,
    /// No anchor; append to the ring
    Unanchored,
}

impl std::fmt::Display for AnchorCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnchorCase::Bracketed => write!(f, "bracketed"),
            AnchorCase::Swapped => write!(f, "bracketed (swapped)"),
            AnchorCase::FarOnly => write!(f, "far end only"),
            AnchorCase::NearOnly => write!(f, "near end only"),
            AnchorCase::Unanchored => write!(f, "no anchor"),
        }
    }
}

/// Split of a ring's edges around a splice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitPlan {
    pub case: AnchorCase,
    pub len: usize,
    pub top_end: usize,
    pub bottom_start: usize,
}

impl SplitPlan {
    pub fn top(&self) -> Range<usize> {
        0..self.top_end
    }

    pub fn replaced(&self) -> Range<usize> {
        self.top_end..self.bottom_start
    }

    pub fn bottom(&self) -> Range<usize> {
        self.bottom_start..self.len
    }

    /// Split that replaces the whole ring
    pub fn whole(len: usize) -> Self {
        SplitPlan {
            case: AnchorCase::Bracketed,
            len,
            top_end: 0,
            bottom_start: len,
        }
    }
}

/// Local indices of the near and far anchors.
///
/// `start` is the first edge whose origin is a near-end id; `end` is the last
/// edge whose destination is a far-end id.
pub fn find_anchors<S: AsRef<str>>(
    edges: &[Edge],
    near_ends: &[S],
    far_ends: &[S],
) -> (Option<usize>, Option<usize>) {
    let in_set = |id: &Option<String>, set: &[S]| {
        id.as_deref()
            .is_some_and(|id| set.iter().any(|s| s.as_ref() == id))
    };
    let start = edges.iter().position(|e| in_set(&e.origin, near_ends));
    let end = edges.iter().rposition(|e| in_set(&e.destination, far_ends));
    (start, end)
}

/// Split policy for a ring of `len` edges
pub fn plan_split(len: usize, start: Option<usize>, end: Option<usize>) -> SplitPlan {
    let (case, top_end, bottom_start) = match (start, end) {
        (Some(s), Some(e)) if s <= e => (AnchorCase::Bracketed, s, e + 1),
        (Some(s), Some(e)) => (AnchorCase::Swapped, e, s + 1),
        (None, Some(e)) => (AnchorCase::FarOnly, e, e),
        (Some(s), None) => (AnchorCase::NearOnly, s + 1, s + 1),
        (None, None) => (AnchorCase::Unanchored, len, len),
    };
    SplitPlan {
        case,
        len,
        top_end: top_end.min(len),
        bottom_start: bottom_start.min(len),
    }
}
