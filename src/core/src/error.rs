use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompetitionError {
    /// A transition was requested before its prerequisites were satisfied.
    #[error("sequence violation in {competition}: {detail}")]
    OutOfSequence { competition: String, detail: String },

    /// Two-legged (or single-match continental) tie level after every rule the engine applies.
    #[error("unresolved tie in {competition}: {team_a} vs {team_b} needs an explicit decider")]
    UnresolvedTie {
        competition: String,
        team_a: u32,
        team_b: u32,
    },

    #[error("{competition}: {home} vs {away} ended level without a penalty shootout")]
    MissingShootout {
        competition: String,
        home: u32,
        away: u32,
    },

    #[error("{competition}: {home} vs {away} ended level without extra time")]
    MissingExtraTime {
        competition: String,
        home: u32,
        away: u32,
    },

    #[error("unknown team: {0}")]
    UnknownTeam(u32),

    #[error("unknown match: {0}")]
    UnknownMatch(String),

    #[error("unknown matchday: {0}")]
    UnknownMatchday(u16),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl CompetitionError {
    pub fn out_of_sequence(competition: impl Into<String>, detail: impl Into<String>) -> Self {
        CompetitionError::OutOfSequence {
            competition: competition.into(),
            detail: detail.into(),
        }
    }

    pub fn invalid_configuration(detail: impl Into<String>) -> Self {
        CompetitionError::InvalidConfiguration(detail.into())
    }
}

pub type CompetitionResult<T> = Result<T, CompetitionError>;

/// Warning fact: a competition started with fewer entrants than its nominal capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradedFill {
    pub competition: String,
    pub expected: usize,
    pub actual: usize,
}

impl DegradedFill {
    pub fn new(competition: impl Into<String>, expected: usize, actual: usize) -> Self {
        DegradedFill {
            competition: competition.into(),
            expected,
            actual,
        }
    }

    pub fn missing(&self) -> usize {
        self.expected.saturating_sub(self.actual)
    }
}
