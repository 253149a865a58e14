use serde::Deserialize;

use crate::error::{Error, Result};

/// Tunables for the evidence clusterer.
///
/// Deserializable so an orchestrator can embed it in its own configuration;
/// missing fields fall back to the defaults and a negative slack is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSettings")]
pub struct ClusterSettings {
    /// Extra distance past a cluster's stream-side end before it is closed.
    /// Zero closes a cluster as soon as no later evidence can overlap it.
    /// The clusterer treats a negative value as zero.
    pub closure_slack: i64,
    /// Evidence with a recorded mapping quality below this is ignored.
    pub min_evidence_mapq: u8,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            closure_slack: 0,
            min_evidence_mapq: 0,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct RawSettings {
    closure_slack: i64,
    min_evidence_mapq: u8,
}

impl Default for RawSettings {
    fn default() -> Self {
        let defaults = ClusterSettings::default();
        Self {
            closure_slack: defaults.closure_slack,
            min_evidence_mapq: defaults.min_evidence_mapq,
        }
    }
}

impl TryFrom<RawSettings> for ClusterSettings {
    type Error = Error;

    fn try_from(raw: RawSettings) -> Result<Self> {
        if raw.closure_slack < 0 {
            return Err(Error::NegativeSlack(raw.closure_slack));
        }
        Ok(Self {
            closure_slack: raw.closure_slack,
            min_evidence_mapq: raw.min_evidence_mapq,
        })
    }
}
