//! Property-based tests for the competition engines.

use proptest::prelude::*;
use season_core::calendar::{CalendarBuilder, CompetitionFootprint, ContinentalFootprint};
use season_core::continent::{resolve_two_legged, ContinentalFormat};
use season_core::cup::{CupBracket, CupScore};
use season_core::league::LeagueTable;
use season_core::shared::LegResult;
use std::collections::BTreeSet;

// ===========================================================================
// Generators
// ===========================================================================

/// Results between six teams, never a team against itself.
fn arb_results(max: usize) -> impl Strategy<Value = Vec<(u32, u32, u8, u8)>> {
    proptest::collection::vec((1..=6u32, 1..=5u32, 0..6u8, 0..6u8), 0..max).prop_map(|results| {
        results
            .into_iter()
            .map(|(home, offset, hg, ag)| (home, (home + offset - 1) % 6 + 1, hg, ag))
            .collect()
    })
}

fn arb_footprint() -> impl Strategy<Value = CompetitionFootprint> {
    (
        proptest::option::of((2..40usize, 0..9u16)),
        0..8u8,
        any::<bool>(),
    )
        .prop_map(|(continental, cup_round_count, split_season_final)| CompetitionFootprint {
            continental: continental.map(|(entrants, matchdays)| {
                let format = ContinentalFormat::for_entrants(entrants, matchdays);
                ContinentalFootprint {
                    league_phase_matchdays: format.league_phase_matchdays,
                    knockout_phases: format.knockout_phases(),
                }
            }),
            cup_round_count,
            split_season_final,
        })
}

fn play_out(bracket: &mut CupBracket) {
    while let Some(round) = bracket.active_round() {
        let pending: Vec<usize> = bracket.rounds[round]
            .matches
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.played)
            .map(|(i, _)| i)
            .collect();

        for index in pending {
            bracket.play_match(round, index, CupScore::new(2, 1)).unwrap();
        }
    }
}

// ===========================================================================
// League table
// ===========================================================================

proptest! {
    #[test]
    fn table_arithmetic_holds(results in arb_results(60)) {
        let teams: Vec<u32> = (1..=6).collect();
        let mut table = LeagueTable::new(&teams);

        for (home, away, hg, ag) in &results {
            table.apply_result(*home, *away, *hg, *ag);
        }

        let mut won = 0u32;
        let mut lost = 0u32;
        let mut goals_for = 0u32;
        let mut goals_against = 0u32;

        for row in &table.rows {
            prop_assert_eq!(row.points as u32, 3 * row.won as u32 + row.drawn as u32);
            prop_assert_eq!(row.goal_difference as i32, row.goals_for as i32 - row.goals_against as i32);
            prop_assert_eq!(row.played as u32, row.won as u32 + row.drawn as u32 + row.lost as u32);
            prop_assert!(row.form.len() <= 5);

            won += row.won as u32;
            lost += row.lost as u32;
            goals_for += row.goals_for as u32;
            goals_against += row.goals_against as u32;
        }

        prop_assert_eq!(won, lost);
        prop_assert_eq!(goals_for, goals_against);
        prop_assert_eq!(table.matches_played(), results.len() as u32);
    }

    #[test]
    fn ranking_is_total_and_stable(results in arb_results(30)) {
        let teams: Vec<u32> = (1..=6).collect();
        let mut table = LeagueTable::new(&teams);
        for (home, away, hg, ag) in &results {
            table.apply_result(*home, *away, *hg, *ag);
        }

        let ranked = table.ranked_team_ids();
        prop_assert_eq!(ranked.len(), 6);
        prop_assert_eq!(ranked.iter().copied().collect::<BTreeSet<_>>().len(), 6);
        prop_assert_eq!(ranked, table.clone().ranked_team_ids());
    }
}

// ===========================================================================
// Calendar
// ===========================================================================

proptest! {
    #[test]
    fn league_weeks_increase_and_never_collide(league_matchdays in 0..46u16, footprint in arb_footprint()) {
        let calendar = CalendarBuilder::build(league_matchdays, &footprint).unwrap();
        let league_weeks = calendar.league_week_map();

        prop_assert_eq!(league_weeks.len(), league_matchdays as usize);
        prop_assert!(league_weeks.windows(2).all(|w| w[0] < w[1]));

        let league: BTreeSet<u16> = league_weeks.iter().copied().collect();
        let continental: Vec<u16> = calendar.continental_weeks_by_phase().into_values().flatten().collect();
        let cup = calendar.cup_weeks();

        prop_assert!(continental.iter().all(|w| !league.contains(w)));
        prop_assert!(cup.iter().all(|w| !league.contains(w)));
        prop_assert!(cup.iter().all(|w| !continental.contains(w)));
        prop_assert_eq!(cup.len(), footprint.cup_round_count as usize);

        let expected_continental = footprint
            .continental
            .as_ref()
            .map(|c| c.league_phase_matchdays as usize + c.knockout_phases.iter().map(|p| p.legs() as usize).sum::<usize>())
            .unwrap_or(0);
        prop_assert_eq!(continental.len(), expected_continental);
    }
}

// ===========================================================================
// Cup bracket
// ===========================================================================

proptest! {
    #[test]
    fn bracket_shape_and_single_champion(entrants in 2..80u32) {
        let teams: Vec<u32> = (1..=entrants).collect();
        let mut bracket = CupBracket::new(1, "National Cup", &teams);

        let size = (entrants as usize).next_power_of_two();
        prop_assert_eq!(bracket.rounds[0].byes(), size - entrants as usize);
        prop_assert_eq!(bracket.total_rounds, size.trailing_zeros() as usize);

        play_out(&mut bracket);

        prop_assert!(bracket.is_completed());
        prop_assert_eq!(bracket.rounds.len(), bracket.total_rounds);
        prop_assert!(bracket.champion().is_some());

        let eliminated: BTreeSet<u32> = bracket
            .rounds
            .iter()
            .flat_map(|r| r.matches.iter())
            .filter_map(|m| m.loser_id())
            .collect();
        prop_assert_eq!(eliminated.len(), entrants as usize - 1);
        prop_assert!(!eliminated.contains(&bracket.champion().unwrap()));
    }
}

// ===========================================================================
// Two-legged ties
// ===========================================================================

proptest! {
    #[test]
    fn two_legged_resolution_is_symmetric(a in 0..6u8, b in 0..6u8, c in 0..6u8, d in 0..6u8) {
        let leg1 = LegResult::new(10, 20, a, b);
        let leg2 = LegResult::new(20, 10, c, d);

        let forward = resolve_two_legged(&leg1, &leg2).map(|r| r.winner);
        let swapped = resolve_two_legged(&leg2, &leg1).map(|r| r.winner);

        prop_assert_eq!(forward, swapped);
    }
}
