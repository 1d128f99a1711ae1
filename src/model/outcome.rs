//! Run outcome classification
//!
//! The orchestrator emits an explicit tier instead of a status string, so
//! callers never have to sniff message text to tell a partial success from
//! a failure.

use crate::model::ListingRecord;
use crate::SweepError;
use serde::Serialize;
use std::fmt;

/// Coarse classification of one scrape run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeTier {
    /// Records extracted and persisted
    Success,

    /// Records extracted but persistence failed
    PartialSuccess,

    /// No usable records
    Error,
}

impl OutcomeTier {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::PartialSuccess => "partial_success",
            Self::Error => "error",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "partial_success" => Some(Self::PartialSuccess),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for OutcomeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}

/// Tier plus a human-readable explanation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub tier: OutcomeTier,
    pub message: String,
}

/// Everything a run hands back to its caller
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub outcome: RunOutcome,
    pub records: Vec<ListingRecord>,
}

impl ScrapeReport {
    pub fn success(records: Vec<ListingRecord>, message: impl Into<String>) -> Self {
        Self {
            outcome: RunOutcome {
                tier: OutcomeTier::Success,
                message: message.into(),
            },
            records,
        }
    }

    pub fn partial(records: Vec<ListingRecord>, message: impl Into<String>) -> Self {
        Self {
            outcome: RunOutcome {
                tier: OutcomeTier::PartialSuccess,
                message: message.into(),
            },
            records,
        }
    }

    /// An error outcome never carries records
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            outcome: RunOutcome {
                tier: OutcomeTier::Error,
                message: message.into(),
            },
            records: Vec::new(),
        }
    }

    pub fn tier(&self) -> OutcomeTier {
        self.outcome.tier
    }

    pub fn message(&self) -> &str {
        &self.outcome.message
    }

    pub fn item_count(&self) -> usize {
        self.records.len()
    }

    /// Turns an error-tier report into [`SweepError::ScrapeFailed`]
    ///
    /// Partial successes pass; their records were still extracted.
    pub fn error_for_tier(&self) -> Result<(), SweepError> {
        match self.outcome.tier {
            OutcomeTier::Error => Err(SweepError::ScrapeFailed(self.outcome.message.clone())),
            OutcomeTier::Success | OutcomeTier::PartialSuccess => Ok(()),
        }
    }

    /// The status/message/count triple surfaced past the scraping core
    pub fn summary(&self) -> OutcomeSummary {
        OutcomeSummary {
            status: self.outcome.tier,
            message: self.outcome.message.clone(),
            ads_found: self.item_count(),
        }
    }
}

/// Serializable outcome triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeSummary {
    pub status: OutcomeTier,
    pub message: String,
    pub ads_found: usize,
}
