//! Streaming clustering of structural-variant breakpoint evidence into
//! candidate links, and deduplication of overlapping links.
//!
//! Evidence sorted by its left interval goes through [`cluster`], which yields
//! [`TargetLink`]s lazily; [`deduplicate`] then merges whatever overlap remains.

pub mod cluster;
pub mod error;
pub mod evidence;
pub mod interval;
pub mod link;
pub mod merge;
pub mod settings;
pub mod sorts;

#[cfg(feature = "python")]
pub mod numpy_bindings;

pub use cluster::{check_sorted, cluster, cluster_with_settings, EvidenceClusters};
pub use error::{Error, Result};
pub use evidence::{Evidence, EvidenceClass};
pub use interval::GenomicInterval;
pub use link::{LinkKind, TargetLink};
pub use merge::{deduplicate, reconcile_partitions};
pub use settings::ClusterSettings;
