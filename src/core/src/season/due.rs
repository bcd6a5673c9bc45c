use crate::continent::ContinentalDue;
use crate::shared::CompetitionKind;

/// A match the human club has to play before the week can close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DueMatch {
    League {
        league_id: u32,
        fixture_id: String,
        home_team_id: u32,
        away_team_id: u32,
    },
    Cup {
        cup_id: u32,
        round: usize,
        index: usize,
        home_team_id: u32,
        away_team_id: u32,
    },
    Continental(ContinentalDue),
    SplitSeasonFinal {
        league_id: u32,
        leg: u8,
        home_team_id: u32,
        away_team_id: u32,
    },
}

impl DueMatch {
    pub fn home_team_id(&self) -> u32 {
        match self {
            DueMatch::League { home_team_id, .. }
            | DueMatch::Cup { home_team_id, .. }
            | DueMatch::SplitSeasonFinal { home_team_id, .. } => *home_team_id,
            DueMatch::Continental(due) => due.home_team_id,
        }
    }

    pub fn away_team_id(&self) -> u32 {
        match self {
            DueMatch::League { away_team_id, .. }
            | DueMatch::Cup { away_team_id, .. }
            | DueMatch::SplitSeasonFinal { away_team_id, .. } => *away_team_id,
            DueMatch::Continental(due) => due.away_team_id,
        }
    }

    pub fn competition(&self) -> CompetitionKind {
        match self {
            DueMatch::League { .. } => CompetitionKind::League,
            DueMatch::Cup { .. } => CompetitionKind::Cup,
            DueMatch::Continental(_) => CompetitionKind::Continental,
            DueMatch::SplitSeasonFinal { .. } => CompetitionKind::SplitSeasonFinal,
        }
    }

    pub fn involves(&self, team_id: u32) -> bool {
        self.home_team_id() == team_id || self.away_team_id() == team_id
    }
}

/// At most one due match per competition kind. The calendar gives a week to a
/// single competition, so in practice at most one field is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DueMatches {
    pub league: Option<DueMatch>,
    pub cup: Option<DueMatch>,
    pub continental: Option<DueMatch>,
}

impl DueMatches {
    pub fn is_empty(&self) -> bool {
        self.league.is_none() && self.cup.is_none() && self.continental.is_none()
    }

    pub fn first(&self) -> Option<&DueMatch> {
        self.league
            .as_ref()
            .or(self.cup.as_ref())
            .or(self.continental.as_ref())
    }
}
