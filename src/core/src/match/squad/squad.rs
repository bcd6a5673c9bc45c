use crate::shared::TeamRef;

pub const SQUAD_SIZE: u8 = 11;

/// What the outcome generator sees of a side: identity, strength and shirt numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSquad {
    pub team_id: u32,
    pub team_name: String,
    pub overall: u8,
    pub shirt_numbers: Vec<u8>,
    pub synthetic: bool,
}

impl MatchSquad {
    pub fn from_team(team: &TeamRef) -> Self {
        MatchSquad {
            team_id: team.id,
            team_name: team.name.clone(),
            overall: team.overall,
            shirt_numbers: (1..=SQUAD_SIZE).collect(),
            synthetic: false,
        }
    }

    /// Stand-in opponent for fixtures where no roster exists, e.g. pre-season friendlies.
    pub fn synthetic(name: &str, overall: u8) -> Self {
        MatchSquad {
            team_id: 0,
            team_name: String::from(name),
            overall,
            shirt_numbers: (1..=SQUAD_SIZE).collect(),
            synthetic: true,
        }
    }

    pub fn with_lineup(mut self, shirt_numbers: Vec<u8>) -> Self {
        if !shirt_numbers.is_empty() {
            self.shirt_numbers = shirt_numbers;
        }
        self
    }
}
