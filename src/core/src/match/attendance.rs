use crate::shared::CompetitionKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceContext {
    pub home_reputation: u16,
    pub away_reputation: u16,
    pub stadium_capacity: u32,
    pub competition: CompetitionKind,
}

impl AttendanceContext {
    pub fn new(home_reputation: u16, away_reputation: u16, competition: CompetitionKind) -> Self {
        AttendanceContext {
            home_reputation,
            away_reputation,
            stadium_capacity: Self::estimated_capacity(home_reputation),
            competition,
        }
    }

    /// Ground size guessed from club stature when no stadium record exists.
    pub fn estimated_capacity(reputation: u16) -> u32 {
        5_000 + reputation as u32 * 7
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttendancePrediction {
    pub attendance_count: u32,
    pub tickets_sold: u32,
    pub fill_rate: f32,
}

/// Gate-receipt forecaster. Nothing in scheduling reads its output.
pub trait AttendanceModel {
    fn predict_attendance(&self, ctx: &AttendanceContext) -> AttendancePrediction;
}

#[derive(Debug, Clone)]
pub struct CapacityAttendanceModel {
    pub season_ticket_share: f32,
}

impl CapacityAttendanceModel {
    pub fn new() -> Self {
        CapacityAttendanceModel {
            season_ticket_share: 0.35,
        }
    }

    fn competition_pull(competition: CompetitionKind) -> f32 {
        match competition {
            CompetitionKind::League => 0.0,
            CompetitionKind::Cup => -0.05,
            CompetitionKind::Continental => 0.15,
            CompetitionKind::SplitSeasonFinal | CompetitionKind::Playoff => 0.20,
            CompetitionKind::Friendly => -0.30,
        }
    }
}

impl Default for CapacityAttendanceModel {
    fn default() -> Self {
        CapacityAttendanceModel::new()
    }
}

impl AttendanceModel for CapacityAttendanceModel {
    fn predict_attendance(&self, ctx: &AttendanceContext) -> AttendancePrediction {
        let home_pull = ctx.home_reputation as f32 / 10_000.0;
        let away_pull = ctx.away_reputation as f32 / 10_000.0;

        let fill_rate = (0.35 + home_pull * 0.45 + away_pull * 0.15 + Self::competition_pull(ctx.competition))
            .clamp(0.15, 1.0);

        let attendance_count = (ctx.stadium_capacity as f32 * fill_rate) as u32;
        let tickets_sold = (attendance_count as f32 * (1.0 - self.season_ticket_share)) as u32;

        AttendancePrediction {
            attendance_count,
            tickets_sold,
            fill_rate,
        }
    }
}
