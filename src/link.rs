use std::fmt;

use serde::{Deserialize, Serialize};

use crate::evidence::{Evidence, EvidenceClass};
use crate::interval::GenomicInterval;

/// Total-order key of a link: left interval, right interval, then strands.
pub type LinkKey = (i32, i64, i64, i32, i64, i64, bool, bool);

/// Rearrangement pattern implied by a link's strand flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkKind {
    Deletion,
    TandemDuplication,
    Inversion,
    Interchromosomal,
}

/// A candidate breakpoint connection between two loci.
///
/// Always stored in canonical form: `left <= right` under interval ordering.
/// The counts follow evidence class and are never swapped with the sides.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawLink")]
pub struct TargetLink {
    left: GenomicInterval,
    left_forward: bool,
    right: GenomicInterval,
    right_forward: bool,
    split_count: u32,
    pair_count: u32,
}

#[derive(Deserialize)]
struct RawLink {
    left: GenomicInterval,
    left_forward: bool,
    right: GenomicInterval,
    right_forward: bool,
    split_count: u32,
    pair_count: u32,
}

impl From<RawLink> for TargetLink {
    fn from(raw: RawLink) -> Self {
        TargetLink::new(
            raw.left,
            raw.left_forward,
            raw.right,
            raw.right_forward,
            raw.split_count,
            raw.pair_count,
        )
    }
}

impl TargetLink {
    pub fn new(
        left: GenomicInterval,
        left_forward: bool,
        right: GenomicInterval,
        right_forward: bool,
        split_count: u32,
        pair_count: u32,
    ) -> Self {
        let ((left, left_forward), (right, right_forward)) = if right < left {
            ((right, right_forward), (left, left_forward))
        } else {
            ((left, left_forward), (right, right_forward))
        };
        Self {
            left,
            left_forward,
            right,
            right_forward,
            split_count,
            pair_count,
        }
    }

    /// A single-observation link seeded from one piece of evidence.
    pub fn from_evidence(evidence: &Evidence) -> Self {
        let (split_count, pair_count) = match evidence.class() {
            EvidenceClass::SplitRead => (1, 0),
            EvidenceClass::DiscordantPair => (0, 1),
        };
        Self::new(
            evidence.left(),
            evidence.left_forward(),
            evidence.right(),
            evidence.right_forward(),
            split_count,
            pair_count,
        )
    }

    pub fn left(&self) -> GenomicInterval {
        self.left
    }

    pub fn left_forward(&self) -> bool {
        self.left_forward
    }

    pub fn right(&self) -> GenomicInterval {
        self.right
    }

    pub fn right_forward(&self) -> bool {
        self.right_forward
    }

    pub fn split_count(&self) -> u32 {
        self.split_count
    }

    pub fn pair_count(&self) -> u32 {
        self.pair_count
    }

    pub fn total_support(&self) -> u32 {
        self.split_count.saturating_add(self.pair_count)
    }

    pub fn sort_key(&self) -> LinkKey {
        (
            self.left.contig(),
            self.left.start(),
            self.left.end(),
            self.right.contig(),
            self.right.start(),
            self.right.end(),
            self.left_forward,
            self.right_forward,
        )
    }

    pub fn kind(&self) -> LinkKind {
        if self.left.contig() != self.right.contig() {
            return LinkKind::Interchromosomal;
        }
        match (self.left_forward, self.right_forward) {
            (true, false) => LinkKind::Deletion,
            (false, true) => LinkKind::TandemDuplication,
            _ => LinkKind::Inversion,
        }
    }

    /// Both sides overlap and both strand flags agree.
    #[inline]
    pub fn is_mergeable_with(&self, other: &TargetLink) -> bool {
        self.left_forward == other.left_forward
            && self.right_forward == other.right_forward
            && self.left.overlaps(&other.left)
            && self.right.overlaps(&other.right)
    }

    /// Combine two overlapping links into the tightest link consistent with both.
    ///
    /// Split-read support is summed. Read-pair support is the maximum of the two,
    /// since nearby candidates share the same underlying fragments.
    pub fn merge(&self, other: &TargetLink) -> Option<TargetLink> {
        self.narrow(other, self.pair_count.max(other.pair_count))
    }

    /// Fold one more piece of evidence into a clustered link; counts are additive.
    pub(crate) fn absorb(&self, other: &TargetLink) -> Option<TargetLink> {
        self.narrow(other, self.pair_count.saturating_add(other.pair_count))
    }

    fn narrow(&self, other: &TargetLink, pair_count: u32) -> Option<TargetLink> {
        if !self.is_mergeable_with(other) {
            return None;
        }
        let left = self.left.intersect(&other.left)?;
        let right = self.right.intersect(&other.right)?;
        Some(TargetLink::new(
            left,
            self.left_forward,
            right,
            self.right_forward,
            self.split_count.saturating_add(other.split_count),
            pair_count,
        ))
    }
}

fn strand_char(forward: bool) -> char {
    if forward {
        '+'
    } else {
        '-'
    }
}

impl fmt::Display for TargetLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) -> {}({}) split={} pairs={}",
            self.left,
            strand_char(self.left_forward),
            self.right,
            strand_char(self.right_forward),
            self.split_count,
            self.pair_count
        )
    }
}
