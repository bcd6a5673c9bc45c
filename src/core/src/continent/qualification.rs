use crate::continent::PrizeTable;
use crate::error::DegradedFill;
use crate::shared::TeamRegistry;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Static slot table row: `places` entries for `competition_id` from `league_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAllocation {
    pub league_id: u32,
    pub competition_id: u32,
    pub places: u8,
}

/// The domestic cup winner earns a place in `competition_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CupWinnerSlot {
    pub competition_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinentalSettings {
    pub id: u32,
    pub name: String,
    pub capacity: usize,
    #[serde(default = "default_matchdays")]
    pub league_phase_matchdays: u16,
    #[serde(default)]
    pub prizes: PrizeTable,
}

fn default_matchdays() -> u16 {
    8
}

/// Final domestic facts qualification reads.
#[derive(Debug, Clone, Default)]
pub struct QualificationInput {
    /// League id to its final order, best first.
    pub league_orders: BTreeMap<u32, Vec<u32>>,
    /// Winning team and the league it plays in.
    pub cup_winner: Option<(u32, u32)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualificationOutcome {
    /// Competition id to entrants in seed order.
    pub entrants: BTreeMap<u32, Vec<u32>>,
    pub warnings: Vec<DegradedFill>,
}

impl QualificationOutcome {
    pub fn qualified_for(&self, team_id: u32) -> Vec<u32> {
        self.entrants
            .iter()
            .filter(|(_, teams)| teams.contains(&team_id))
            .map(|(&id, _)| id)
            .collect()
    }
}

pub struct Qualification;

impl Qualification {
    /// Competitions are filled in the order given, so the elite one is served first
    /// and later ones skip clubs that already have a place. Per competition: league
    /// places by final order, then the cup winner place, then any shortfall from the
    /// highest-reputation clubs left. A competition that still falls short is
    /// reported as a degraded fill.
    pub fn allocate(
        competitions: &[ContinentalSettings],
        slots: &[SlotAllocation],
        cup_winner_slot: Option<CupWinnerSlot>,
        input: &QualificationInput,
        teams: &TeamRegistry,
    ) -> QualificationOutcome {
        let mut outcome = QualificationOutcome::default();
        let mut qualified: BTreeSet<u32> = BTreeSet::new();

        let pool: Vec<u32> = teams.by_reputation(&input.league_orders.values().flatten().copied().collect::<Vec<_>>());

        for competition in competitions {
            let mut entrants: Vec<u32> = Vec::new();

            for slot in slots.iter().filter(|s| s.competition_id == competition.id) {
                let Some(order) = input.league_orders.get(&slot.league_id) else {
                    continue;
                };

                let picks: Vec<u32> = order
                    .iter()
                    .copied()
                    .filter(|team| !qualified.contains(team))
                    .take(slot.places as usize)
                    .collect();

                for team in picks {
                    qualified.insert(team);
                    entrants.push(team);
                }
            }

            if let (Some(cup_slot), Some((winner, league_id))) = (cup_winner_slot, input.cup_winner) {
                if cup_slot.competition_id == competition.id {
                    let pick = if !qualified.contains(&winner) {
                        Some(winner)
                    } else {
                        input
                            .league_orders
                            .get(&league_id)
                            .and_then(|order| order.iter().copied().find(|team| !qualified.contains(team)))
                    };

                    if let Some(team) = pick {
                        if team != winner {
                            info!("🎟️ cup winner {} already qualified, place passes to {}", winner, team);
                        }
                        qualified.insert(team);
                        entrants.push(team);
                    }
                }
            }

            if entrants.len() < competition.capacity {
                let shortfall = competition.capacity - entrants.len();
                let fillers: Vec<u32> = pool
                    .iter()
                    .copied()
                    .filter(|team| !qualified.contains(team))
                    .take(shortfall)
                    .collect();

                for team in fillers {
                    qualified.insert(team);
                    entrants.push(team);
                }
            }

            entrants.truncate(competition.capacity);

            if entrants.len() < competition.capacity {
                let fill = DegradedFill::new(&competition.name, competition.capacity, entrants.len());
                warn!(
                    "⚠️ {} degraded fill: {} of {} places",
                    competition.name, fill.actual, fill.expected
                );
                outcome.warnings.push(fill);
            }

            outcome.entrants.insert(competition.id, teams.by_reputation(&entrants));
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::TeamRef;

    fn registry(count: u32) -> TeamRegistry {
        TeamRegistry::new(
            (1..=count)
                .map(|id| TeamRef::new(id, &format!("Team {}", id), "T", (1000 - id * 10) as u16, 60))
                .collect(),
        )
    }

    fn settings(id: u32, capacity: usize) -> ContinentalSettings {
        ContinentalSettings {
            id,
            name: format!("Competition {}", id),
            capacity,
            league_phase_matchdays: 6,
            prizes: PrizeTable::default(),
        }
    }

    #[test]
    fn test_league_places_by_final_order() {
        let teams = registry(10);
        let mut input = QualificationInput::default();
        input.league_orders.insert(1, vec![5, 3, 1, 2, 4]);
        input.league_orders.insert(2, vec![6, 7, 8, 9, 10]);

        let slots = [
            SlotAllocation { league_id: 1, competition_id: 100, places: 2 },
            SlotAllocation { league_id: 2, competition_id: 100, places: 2 },
            SlotAllocation { league_id: 1, competition_id: 200, places: 1 },
        ];

        let outcome = Qualification::allocate(&[settings(100, 4), settings(200, 1)], &slots, None, &input, &teams);

        let mut elite = outcome.entrants[&100].clone();
        elite.sort();
        assert_eq!(elite, vec![3, 5, 6, 7]);
        assert_eq!(outcome.entrants[&200], vec![1]);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_cup_winner_place_passes_down_when_already_qualified() {
        let teams = registry(6);
        let mut input = QualificationInput::default();
        input.league_orders.insert(1, vec![1, 2, 3, 4, 5, 6]);
        input.cup_winner = Some((1, 1));

        let slots = [
            SlotAllocation { league_id: 1, competition_id: 100, places: 1 },
            SlotAllocation { league_id: 1, competition_id: 200, places: 1 },
        ];

        let outcome = Qualification::allocate(
            &[settings(100, 1), settings(200, 2)],
            &slots,
            Some(CupWinnerSlot { competition_id: 200 }),
            &input,
            &teams,
        );

        assert_eq!(outcome.entrants[&100], vec![1]);
        assert_eq!(outcome.entrants[&200], vec![2, 3]);
        assert_eq!(outcome.qualified_for(3), vec![200]);
    }

    #[test]
    fn test_shortfall_filled_by_reputation_then_degraded() {
        let teams = registry(5);
        let mut input = QualificationInput::default();
        input.league_orders.insert(1, vec![5, 4, 3, 2, 1]);

        let slots = [SlotAllocation { league_id: 1, competition_id: 100, places: 1 }];

        let outcome = Qualification::allocate(&[settings(100, 3), settings(200, 4)], &slots, None, &input, &teams);

        // Team 5 by league place, then 1 and 2 by reputation.
        assert_eq!(outcome.entrants[&100], vec![1, 2, 5]);
        assert_eq!(outcome.entrants[&200], vec![3, 4]);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].missing(), 2);
    }
}
