use crate::r#match::{AttendancePrediction, MatchEvent, ShootoutResult, Side};
use crate::shared::CompetitionKind;
use serde::{Deserialize, Serialize};

/// Record of one match actually played this week, whatever competition it belonged to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayedMatch {
    pub competition: CompetitionKind,
    pub competition_id: u32,
    pub fixture_id: String,
    pub home_team_id: u32,
    pub away_team_id: u32,
    pub home_score: u8,
    pub away_score: u8,
    pub extra_time: bool,
    pub shootout: Option<ShootoutResult>,
    pub attendance: Option<AttendancePrediction>,
    pub events: Vec<MatchEvent>,
}

impl PlayedMatch {
    pub fn new(
        competition: CompetitionKind,
        competition_id: u32,
        fixture_id: String,
        home_team_id: u32,
        away_team_id: u32,
        home_score: u8,
        away_score: u8,
    ) -> Self {
        PlayedMatch {
            competition,
            competition_id,
            fixture_id,
            home_team_id,
            away_team_id,
            home_score,
            away_score,
            extra_time: false,
            shootout: None,
            attendance: None,
            events: Vec::new(),
        }
    }

    pub fn involves(&self, team_id: u32) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    /// Winner on the pitch, counting a shootout if one was taken.
    pub fn winner(&self) -> Option<u32> {
        if self.home_score > self.away_score {
            return Some(self.home_team_id);
        }
        if self.away_score > self.home_score {
            return Some(self.away_team_id);
        }

        match self.shootout.and_then(|s| s.winner()) {
            Some(Side::Home) => Some(self.home_team_id),
            Some(Side::Away) => Some(self.away_team_id),
            None => None,
        }
    }
}
