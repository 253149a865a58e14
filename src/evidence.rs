use serde::{Deserialize, Serialize};

use crate::interval::GenomicInterval;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvidenceClass {
    /// A read whose alignment is split across both breakpoint loci.
    SplitRead,
    /// A read pair whose mates map too far apart or in an unexpected orientation.
    DiscordantPair,
}

/// One anomalous signal implying two approximate breakpoint loci.
///
/// `left` is the interval on the side where the signal was observed; evidence
/// streams are sorted by it. `right` is the distal target and may precede `left`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    left: GenomicInterval,
    left_forward: bool,
    right: GenomicInterval,
    right_forward: bool,
    class: EvidenceClass,
    mapping_quality: Option<u8>,
}

impl Evidence {
    pub fn new(
        left: GenomicInterval,
        left_forward: bool,
        right: GenomicInterval,
        right_forward: bool,
        class: EvidenceClass,
    ) -> Self {
        Self {
            left,
            left_forward,
            right,
            right_forward,
            class,
            mapping_quality: None,
        }
    }

    pub fn split_read(
        left: GenomicInterval,
        left_forward: bool,
        right: GenomicInterval,
        right_forward: bool,
    ) -> Self {
        Self::new(left, left_forward, right, right_forward, EvidenceClass::SplitRead)
    }

    pub fn discordant_pair(
        left: GenomicInterval,
        left_forward: bool,
        right: GenomicInterval,
        right_forward: bool,
    ) -> Self {
        Self::new(left, left_forward, right, right_forward, EvidenceClass::DiscordantPair)
    }

    /// Attach the mapping quality of the distal alignment.
    pub fn with_mapping_quality(mut self, mapq: u8) -> Self {
        self.mapping_quality = Some(mapq);
        self
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

    pub fn class(&self) -> EvidenceClass {
        self.class
    }

    pub fn mapping_quality(&self) -> Option<u8> {
        self.mapping_quality
    }

    /// Evidence without a recorded mapping quality always passes.
    pub fn passes_mapq(&self, min_mapq: u8) -> bool {
        self.mapping_quality.map_or(true, |q| q >= min_mapq)
    }
}
