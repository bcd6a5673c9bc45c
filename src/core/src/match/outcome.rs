use crate::r#match::MatchSquad;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchEventKind {
    Goal,
    YellowCard,
    RedCard,
    Injury,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub minute: u8,
    pub kind: MatchEventKind,
    pub side: Side,
    pub player: u8,
}

impl MatchEvent {
    pub fn new(minute: u8, kind: MatchEventKind, side: Side, player: u8) -> Self {
        MatchEvent {
            minute,
            kind,
            side,
            player,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchStats {
    pub home_shots: u8,
    pub away_shots: u8,
    pub home_shots_on_target: u8,
    pub away_shots_on_target: u8,
    pub home_possession: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub home_score: u8,
    pub away_score: u8,
    pub timeline: Vec<MatchEvent>,
    pub stats: MatchStats,
}

impl MatchOutcome {
    pub fn new(home_score: u8, away_score: u8) -> Self {
        MatchOutcome {
            home_score,
            away_score,
            timeline: Vec::new(),
            stats: MatchStats::default(),
        }
    }

    pub fn is_draw(&self) -> bool {
        self.home_score == self.away_score
    }

    pub fn goals(&self, side: Side) -> u8 {
        match side {
            Side::Home => self.home_score,
            Side::Away => self.away_score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPeriod {
    Regulation,
    ExtraTime,
}

/// Everything besides the two squads that shapes a simulated match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchContext {
    pub formation: String,
    pub tactic: String,
    pub morale: f32,
    pub attendance_factor: f32,
    pub pitch_condition: f32,
    pub lineup_overrides: Vec<u8>,
    pub period: MatchPeriod,
    pub neutral_venue: bool,
}

impl MatchContext {
    pub fn regulation() -> Self {
        MatchContext {
            formation: String::from("4-4-2"),
            tactic: String::from("balanced"),
            morale: 1.0,
            attendance_factor: 1.0,
            pitch_condition: 1.0,
            lineup_overrides: Vec::new(),
            period: MatchPeriod::Regulation,
            neutral_venue: false,
        }
    }

    pub fn extra_time(&self) -> Self {
        MatchContext {
            period: MatchPeriod::ExtraTime,
            ..self.clone()
        }
    }

    pub fn neutral(mut self) -> Self {
        self.neutral_venue = true;
        self
    }

    pub fn with_tactics(mut self, formation: &str, tactic: &str) -> Self {
        self.formation = String::from(formation);
        self.tactic = String::from(tactic);
        self
    }
}

impl Default for MatchContext {
    fn default() -> Self {
        MatchContext::regulation()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShootoutResult {
    pub home: u8,
    pub away: u8,
}

impl ShootoutResult {
    pub fn new(home: u8, away: u8) -> Self {
        ShootoutResult { home, away }
    }

    pub fn winner(&self) -> Option<Side> {
        match self.home.cmp(&self.away) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Turns two line-ups plus context into a score and an event timeline.
///
/// Implementations must be deterministic for a given internal state so that
/// week-by-week and bulk simulation replay identically.
pub trait MatchOutcomeGenerator {
    fn simulate(&mut self, home: &MatchSquad, away: &MatchSquad, ctx: &MatchContext) -> MatchOutcome;

    /// Always produces a winner.
    fn penalty_shootout(&mut self, home: &MatchSquad, away: &MatchSquad) -> ShootoutResult;
}
