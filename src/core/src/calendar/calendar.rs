use crate::continent::ContinentalPhase;
use crate::error::{CompetitionError, CompetitionResult};
use crate::league::Fixture;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Week = u16;

/// What a single global week is reserved for. A week holds exactly one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeekSlot {
    League { matchday: u16 },
    Cup { round: u8 },
    Continental { phase: ContinentalPhase, index: u8 },
    SplitSeasonFinal { leg: u8 },
}

impl WeekSlot {
    pub fn is_continental(&self) -> bool {
        matches!(self, WeekSlot::Continental { .. })
    }
}

/// Season timeline. Stored as one slot per week, so league, cup and continental
/// weeks are disjoint by construction; the per-competition maps are derived views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    slots: Vec<WeekSlot>,
}

impl Calendar {
    /// Rejects a slot list whose league matchdays are not exactly 0..L in order.
    pub fn new(slots: Vec<WeekSlot>) -> CompetitionResult<Self> {
        let mut expected = 0u16;
        for slot in &slots {
            if let WeekSlot::League { matchday } = slot {
                if *matchday != expected {
                    return Err(CompetitionError::invalid_configuration(format!(
                        "league matchday {} scheduled where {} was expected",
                        matchday, expected
                    )));
                }
                expected += 1;
            }
        }

        Ok(Calendar { slots })
    }

    pub fn empty() -> Self {
        Calendar { slots: Vec::new() }
    }

    pub fn total_weeks(&self) -> Week {
        self.slots.len() as Week
    }

    pub fn slot(&self, week: Week) -> Option<WeekSlot> {
        self.slots.get(week as usize).copied()
    }

    pub fn slots(&self) -> &[WeekSlot] {
        &self.slots
    }

    fn weeks_where(&self, predicate: impl Fn(&WeekSlot) -> bool) -> Vec<Week> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| predicate(slot))
            .map(|(week, _)| week as Week)
            .collect()
    }

    // ========== DERIVED VIEWS ==========

    /// Index is the matchday, value the global week. Strictly increasing.
    pub fn league_week_map(&self) -> Vec<Week> {
        self.weeks_where(|slot| matches!(slot, WeekSlot::League { .. }))
    }

    pub fn league_week(&self, matchday: u16) -> Option<Week> {
        self.slots
            .iter()
            .position(|slot| *slot == WeekSlot::League { matchday })
            .map(|week| week as Week)
    }

    pub fn league_matchdays(&self) -> u16 {
        self.league_week_map().len() as u16
    }

    pub fn continental_weeks_by_phase(&self) -> BTreeMap<ContinentalPhase, Vec<Week>> {
        let mut weeks: BTreeMap<ContinentalPhase, Vec<Week>> = BTreeMap::new();
        for (week, slot) in self.slots.iter().enumerate() {
            if let WeekSlot::Continental { phase, .. } = slot {
                weeks.entry(*phase).or_default().push(week as Week);
            }
        }
        weeks
    }

    pub fn cup_weeks(&self) -> Vec<Week> {
        self.weeks_where(|slot| matches!(slot, WeekSlot::Cup { .. }))
    }

    pub fn split_final_weeks(&self) -> Vec<Week> {
        self.weeks_where(|slot| matches!(slot, WeekSlot::SplitSeasonFinal { .. }))
    }
}

/// Rewrites each fixture's `week` from matchday-index space into global-week space.
pub fn remap_fixtures(fixtures: &mut [Fixture], calendar: &Calendar) -> CompetitionResult<()> {
    let week_map = calendar.league_week_map();

    for fixture in fixtures.iter_mut() {
        fixture.week = *week_map
            .get(fixture.matchday as usize)
            .ok_or(CompetitionError::UnknownMatchday(fixture.matchday))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Calendar {
        Calendar::new(vec![
            WeekSlot::League { matchday: 0 },
            WeekSlot::Continental {
                phase: ContinentalPhase::LeaguePhase,
                index: 0,
            },
            WeekSlot::League { matchday: 1 },
            WeekSlot::Cup { round: 0 },
            WeekSlot::League { matchday: 2 },
            WeekSlot::SplitSeasonFinal { leg: 1 },
        ])
        .unwrap()
    }

    #[test]
    fn test_derived_views() {
        let calendar = sample();
        assert_eq!(calendar.total_weeks(), 6);
        assert_eq!(calendar.league_week_map(), vec![0, 2, 4]);
        assert_eq!(calendar.cup_weeks(), vec![3]);
        assert_eq!(calendar.split_final_weeks(), vec![5]);
        assert_eq!(
            calendar.continental_weeks_by_phase()[&ContinentalPhase::LeaguePhase],
            vec![1]
        );
        assert_eq!(calendar.league_week(2), Some(4));
        assert_eq!(calendar.league_week(3), None);
    }

    #[test]
    fn test_out_of_order_matchdays_rejected() {
        let result = Calendar::new(vec![
            WeekSlot::League { matchday: 1 },
            WeekSlot::League { matchday: 0 },
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_remap_fixtures() {
        let calendar = sample();
        let mut fixtures = vec![
            Fixture::new(String::from("a"), 0, 1, 2),
            Fixture::new(String::from("b"), 2, 3, 4),
        ];

        remap_fixtures(&mut fixtures, &calendar).unwrap();
        assert_eq!(fixtures[0].week, 0);
        assert_eq!(fixtures[1].week, 4);

        let mut beyond = vec![Fixture::new(String::from("c"), 7, 1, 2)];
        assert_eq!(
            remap_fixtures(&mut beyond, &calendar),
            Err(CompetitionError::UnknownMatchday(7))
        );
    }
}
