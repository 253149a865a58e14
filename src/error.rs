use crate::interval::GenomicInterval;

/// Errors raised when callers hand the core malformed input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid interval on contig {contig}: start {start} > end {end}")]
    InvalidInterval { contig: i32, start: i64, end: i64 },

    #[error("evidence out of order: {current} follows {previous}")]
    UnsortedEvidence {
        previous: GenomicInterval,
        current: GenomicInterval,
    },

    #[error("closure slack must not be negative, got {0}")]
    NegativeSlack(i64),

    #[error("column '{column}' has {found} rows, expected {expected}")]
    ColumnLength {
        column: &'static str,
        expected: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
