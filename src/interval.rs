use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A 1-based, inclusive interval on a single contig.
///
/// Ordering is by contig, then start, then end. Intervals on different contigs
/// never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct GenomicInterval {
    contig: i32,
    start: i64,
    end: i64,
}

#[derive(Deserialize)]
struct RawInterval {
    contig: i32,
    start: i64,
    end: i64,
}

impl TryFrom<RawInterval> for GenomicInterval {
    type Error = Error;

    fn try_from(raw: RawInterval) -> Result<Self> {
        Self::try_new(raw.contig, raw.start, raw.end)
    }
}

impl GenomicInterval {
    /// # Panics
    ///
    /// Panics if `start > end`. Use [`GenomicInterval::try_new`] for untrusted input.
    pub fn new(contig: i32, start: i64, end: i64) -> Self {
        match Self::try_new(contig, start, end) {
            Ok(interval) => interval,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_new(contig: i32, start: i64, end: i64) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidInterval { contig, start, end });
        }
        Ok(Self { contig, start, end })
    }

    pub fn contig(&self) -> i32 {
        self.contig
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    /// Number of positions covered (both ends inclusive).
    pub fn width(&self) -> i64 {
        self.end - self.start + 1
    }

    #[inline]
    pub fn overlaps(&self, other: &GenomicInterval) -> bool {
        self.contig == other.contig && self.start <= other.end && other.start <= self.end
    }

    /// The shared part of two overlapping intervals, `None` if they are disjoint.
    pub fn intersect(&self, other: &GenomicInterval) -> Option<GenomicInterval> {
        if !self.overlaps(other) {
            return None;
        }
        Some(GenomicInterval {
            contig: self.contig,
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }

    pub fn contains(&self, other: &GenomicInterval) -> bool {
        self.contig == other.contig && self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for GenomicInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.contig, self.start, self.end)
    }
}
