use serde::{Deserialize, Serialize};

/// Score of one leg of a tie, keyed by who hosted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegResult {
    pub home_team_id: u32,
    pub away_team_id: u32,
    pub home_goals: u8,
    pub away_goals: u8,
}

impl LegResult {
    pub fn new(home_team_id: u32, away_team_id: u32, home_goals: u8, away_goals: u8) -> Self {
        LegResult {
            home_team_id,
            away_team_id,
            home_goals,
            away_goals,
        }
    }

    pub fn involves(&self, team_id: u32) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    pub fn goals_for(&self, team_id: u32) -> u32 {
        if self.home_team_id == team_id {
            self.home_goals as u32
        } else if self.away_team_id == team_id {
            self.away_goals as u32
        } else {
            0
        }
    }

    /// Goals the team scored while visiting.
    pub fn away_goals_for(&self, team_id: u32) -> u32 {
        if self.away_team_id == team_id {
            self.away_goals as u32
        } else {
            0
        }
    }

    pub fn winner(&self) -> Option<u32> {
        match self.home_goals.cmp(&self.away_goals) {
            std::cmp::Ordering::Greater => Some(self.home_team_id),
            std::cmp::Ordering::Less => Some(self.away_team_id),
            std::cmp::Ordering::Equal => None,
        }
    }
}
