use crate::shared::previous_power_of_two;
use serde::{Deserialize, Serialize};

pub const MAX_KNOCKOUT_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContinentalPhase {
    LeaguePhase,
    Playoff,
    RoundOf16,
    QuarterFinal,
    SemiFinal,
    Final,
    Completed,
}

impl ContinentalPhase {
    pub fn is_knockout(&self) -> bool {
        !matches!(self, ContinentalPhase::LeaguePhase | ContinentalPhase::Completed)
    }

    /// Weeks the stage occupies on the calendar.
    pub fn legs(&self) -> u8 {
        match self {
            ContinentalPhase::Playoff
            | ContinentalPhase::RoundOf16
            | ContinentalPhase::QuarterFinal
            | ContinentalPhase::SemiFinal => 2,
            ContinentalPhase::Final => 1,
            ContinentalPhase::LeaguePhase | ContinentalPhase::Completed => 0,
        }
    }

    /// First bracket stage for a knockout of `size` teams.
    pub fn first_bracket_stage(size: usize) -> ContinentalPhase {
        match size {
            s if s >= 16 => ContinentalPhase::RoundOf16,
            8 => ContinentalPhase::QuarterFinal,
            4 => ContinentalPhase::SemiFinal,
            _ => ContinentalPhase::Final,
        }
    }

    pub fn next(&self) -> ContinentalPhase {
        match self {
            ContinentalPhase::LeaguePhase => ContinentalPhase::Playoff,
            ContinentalPhase::Playoff => ContinentalPhase::RoundOf16,
            ContinentalPhase::RoundOf16 => ContinentalPhase::QuarterFinal,
            ContinentalPhase::QuarterFinal => ContinentalPhase::SemiFinal,
            ContinentalPhase::SemiFinal => ContinentalPhase::Final,
            ContinentalPhase::Final | ContinentalPhase::Completed => ContinentalPhase::Completed,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ContinentalPhase::LeaguePhase => "League phase",
            ContinentalPhase::Playoff => "Knockout playoff",
            ContinentalPhase::RoundOf16 => "Round of 16",
            ContinentalPhase::QuarterFinal => "Quarter-finals",
            ContinentalPhase::SemiFinal => "Semi-finals",
            ContinentalPhase::Final => "Final",
            ContinentalPhase::Completed => "Completed",
        }
    }
}

/// Shape of a continental competition derived from how many clubs actually entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinentalFormat {
    pub entrants: usize,
    pub league_phase_matchdays: u16,
    pub knockout_size: usize,
    pub direct_qualifiers: usize,
    pub playoff_entrants: usize,
}

impl ContinentalFormat {
    pub fn for_entrants(entrants: usize, preferred_matchdays: u16) -> Self {
        if entrants < 2 {
            return ContinentalFormat {
                entrants,
                league_phase_matchdays: 0,
                knockout_size: 0,
                direct_qualifiers: 0,
                playoff_entrants: 0,
            };
        }

        let knockout_size = previous_power_of_two(entrants).clamp(2, MAX_KNOCKOUT_SIZE);
        let direct_qualifiers = (knockout_size / 2).max((2 * knockout_size).saturating_sub(entrants));
        let playoff_entrants = 2 * (knockout_size - direct_qualifiers);

        let available_rounds = (entrants + entrants % 2 - 1) as u16;

        ContinentalFormat {
            entrants,
            league_phase_matchdays: preferred_matchdays.clamp(1, available_rounds),
            knockout_size,
            direct_qualifiers,
            playoff_entrants,
        }
    }

    pub fn has_playoff(&self) -> bool {
        self.playoff_entrants > 0
    }

    /// Knockout stages in play order, playoff first when present.
    pub fn knockout_phases(&self) -> Vec<ContinentalPhase> {
        if self.knockout_size < 2 {
            return Vec::new();
        }

        let mut phases = Vec::new();
        if self.has_playoff() {
            phases.push(ContinentalPhase::Playoff);
        }

        let mut phase = ContinentalPhase::first_bracket_stage(self.knockout_size);
        while phase != ContinentalPhase::Completed {
            phases.push(phase);
            phase = phase.next();
        }

        phases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_field_format() {
        let format = ContinentalFormat::for_entrants(36, 8);
        assert_eq!(format.knockout_size, 16);
        assert_eq!(format.direct_qualifiers, 8);
        assert_eq!(format.playoff_entrants, 16);
        assert_eq!(format.league_phase_matchdays, 8);
        assert_eq!(
            format.knockout_phases(),
            vec![
                ContinentalPhase::Playoff,
                ContinentalPhase::RoundOf16,
                ContinentalPhase::QuarterFinal,
                ContinentalPhase::SemiFinal,
                ContinentalPhase::Final
            ]
        );
    }

    #[test]
    fn test_degraded_field_stays_playable() {
        for entrants in 2..=40 {
            let format = ContinentalFormat::for_entrants(entrants, 8);
            assert_eq!(format.direct_qualifiers + format.playoff_entrants / 2, format.knockout_size);
            assert!(format.direct_qualifiers + format.playoff_entrants <= entrants);
            assert!(format.league_phase_matchdays as usize <= entrants);
        }
    }

    #[test]
    fn test_sixteen_entrants_format() {
        let format = ContinentalFormat::for_entrants(16, 6);
        assert_eq!(format.knockout_size, 8);
        assert_eq!(format.direct_qualifiers, 4);
        assert_eq!(format.playoff_entrants, 8);
        assert_eq!(format.knockout_phases()[1], ContinentalPhase::QuarterFinal);
    }

    #[test]
    fn test_two_entrants_play_a_final() {
        let format = ContinentalFormat::for_entrants(2, 8);
        assert_eq!(format.league_phase_matchdays, 1);
        assert!(!format.has_playoff());
        assert_eq!(format.knockout_phases(), vec![ContinentalPhase::Final]);
    }

    #[test]
    fn test_phase_order() {
        assert!(ContinentalPhase::LeaguePhase < ContinentalPhase::Playoff);
        assert!(ContinentalPhase::SemiFinal < ContinentalPhase::Final);
        assert_eq!(ContinentalPhase::Final.next(), ContinentalPhase::Completed);
        assert_eq!(ContinentalPhase::Final.legs(), 1);
    }
}
