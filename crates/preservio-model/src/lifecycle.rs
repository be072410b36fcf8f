//! Entity lifecycle states

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse ingest-progress status of an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleState {
    /// The enumerated state
    pub state: State,
    /// Free-text detail, e.g. the ingest timestamp
    pub details: String,
}

impl LifecycleState {
    /// Create a lifecycle state with details
    pub fn new(state: State, details: impl Into<String>) -> Self {
        Self {
            state,
            details: details.into(),
        }
    }

    /// An `INGESTING` state with empty details, as reported for entities
    /// that are queued but not yet stored
    #[must_use]
    pub fn ingesting() -> Self {
        Self::new(State::Ingesting, "")
    }
}

/// Enumerated lifecycle states
///
/// Stored as the SCREAMING_SNAKE literal form; unknown literals parse
/// to [`State::Other`] so a store written by a newer version still
/// reads back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    New,
    Ingesting,
    Ingested,
    IngestFailed,
    Other,
}

impl State {
    /// The literal form recorded in the graph store
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Ingesting => "INGESTING",
            Self::Ingested => "INGESTED",
            Self::IngestFailed => "INGEST_FAILED",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for State {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "NEW" => Self::New,
            "INGESTING" => Self::Ingesting,
            "INGESTED" => Self::Ingested,
            "INGEST_FAILED" => Self::IngestFailed,
            _ => Self::Other,
        })
    }
}
