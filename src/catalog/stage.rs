/// Record stage definitions for tracking pipeline progress
///
/// Every record moves forward through the pipeline stages and never
/// regresses. A record may skip a stage when the corresponding source never
/// supplied data (e.g. no repository link was ever found).
use serde::{Deserialize, Serialize};
use std::fmt;

/// The pipeline stage a component record has reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStage {
    /// Identity observed in some source, nothing resolved yet
    Discovered,

    /// Package-index data merged in
    Resolved,

    /// Repository metadata / readme enrichment done (or skipped)
    EnrichedRepo,

    /// Download metrics resolved
    EnrichedDownloads,

    /// Curated overrides applied and search index computed
    Finalized,
}

impl RecordStage {
    /// Position in the pipeline; later stages have higher ranks
    fn rank(&self) -> u8 {
        match self {
            Self::Discovered => 0,
            Self::Resolved => 1,
            Self::EnrichedRepo => 2,
            Self::EnrichedDownloads => 3,
            Self::Finalized => 4,
        }
    }

    /// Returns true if no further pipeline stage applies
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized)
    }

    /// Moves forward to `next` if it is a later stage; earlier stages are
    /// ignored so a record can never regress
    pub fn advance_to(&mut self, next: RecordStage) {
        if next.rank() > self.rank() {
            *self = next;
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Resolved => "resolved",
            Self::EnrichedRepo => "enriched_repo",
            Self::EnrichedDownloads => "enriched_downloads",
            Self::Finalized => "finalized",
        }
    }
}

impl Default for RecordStage {
    fn default() -> Self {
        Self::Discovered
    }
}

impl fmt::Display for RecordStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
