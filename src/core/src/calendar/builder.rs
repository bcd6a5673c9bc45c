use crate::calendar::{Calendar, WeekSlot};
use crate::continent::ContinentalPhase;
use crate::error::CompetitionResult;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinentalFootprint {
    pub league_phase_matchdays: u16,
    /// Knockout stages in play order.
    pub knockout_phases: Vec<ContinentalPhase>,
}

/// Everything besides the domestic league that needs weeks this season.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionFootprint {
    pub continental: Option<ContinentalFootprint>,
    pub cup_round_count: u8,
    pub split_season_final: bool,
}

impl CompetitionFootprint {
    pub fn has_continental(&self) -> bool {
        self.continental.is_some()
    }
}

pub struct CalendarBuilder;

impl CalendarBuilder {
    /// Walks the week counter forward. Each continental phase gets a contiguous block
    /// released once league progress passes its anchor; cup rounds sit at their own
    /// anchors but never directly after a continental week; every other week goes to
    /// the next league matchday. Once the league matchdays are used up there is no
    /// league week left to put between them, so a cup round may then follow a
    /// continental week. A split-season final takes two weeks at the end.
    pub fn build(league_matchdays: u16, footprint: &CompetitionFootprint) -> CompetitionResult<Calendar> {
        let blocks = Self::continental_blocks(footprint);
        let cup_rounds = footprint.cup_round_count as usize;

        let mut slots: Vec<WeekSlot> = Vec::new();
        let mut next_matchday: u16 = 0;
        let mut next_block = 0usize;
        let mut next_cup = 0usize;
        let mut split_final_pending = footprint.split_season_final;

        loop {
            let progress = next_matchday as usize;
            let league_done = next_matchday >= league_matchdays;

            if next_block < blocks.len() && progress >= Self::anchor(next_block, blocks.len(), league_matchdays) {
                slots.extend(blocks[next_block].iter().copied());
                next_block += 1;
                continue;
            }

            let after_continental = slots.last().is_some_and(|slot| slot.is_continental());

            // A cup round may follow a continental week only once the league is exhausted.
            if next_cup < cup_rounds
                && progress >= Self::anchor(next_cup, cup_rounds, league_matchdays)
                && (!after_continental || league_done)
            {
                slots.push(WeekSlot::Cup { round: next_cup as u8 });
                next_cup += 1;
                continue;
            }

            if !league_done {
                slots.push(WeekSlot::League { matchday: next_matchday });
                next_matchday += 1;
                continue;
            }

            if split_final_pending {
                slots.push(WeekSlot::SplitSeasonFinal { leg: 1 });
                slots.push(WeekSlot::SplitSeasonFinal { leg: 2 });
                split_final_pending = false;
                continue;
            }

            break;
        }

        debug!(
            "calendar built: {} weeks, {} league matchdays, {} continental blocks, {} cup rounds",
            slots.len(),
            league_matchdays,
            blocks.len(),
            cup_rounds
        );

        Calendar::new(slots)
    }

    /// League progress (matchdays played) after which item `index` of `count` is due.
    fn anchor(index: usize, count: usize, league_matchdays: u16) -> usize {
        (index + 1) * league_matchdays as usize / (count + 1)
    }

    fn continental_blocks(footprint: &CompetitionFootprint) -> Vec<Vec<WeekSlot>> {
        let Some(continental) = &footprint.continental else {
            return Vec::new();
        };

        let mut blocks = Vec::new();

        if continental.league_phase_matchdays > 0 {
            blocks.push(
                (0..continental.league_phase_matchdays)
                    .map(|index| WeekSlot::Continental {
                        phase: ContinentalPhase::LeaguePhase,
                        index: index as u8,
                    })
                    .collect(),
            );
        }

        for phase in &continental.knockout_phases {
            blocks.push(
                (0..phase.legs())
                    .map(|index| WeekSlot::Continental { phase: *phase, index })
                    .collect(),
            );
        }

        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_footprint() -> CompetitionFootprint {
        CompetitionFootprint {
            continental: Some(ContinentalFootprint {
                league_phase_matchdays: 6,
                knockout_phases: vec![
                    ContinentalPhase::Playoff,
                    ContinentalPhase::QuarterFinal,
                    ContinentalPhase::SemiFinal,
                    ContinentalPhase::Final,
                ],
            }),
            cup_round_count: 5,
            split_season_final: true,
        }
    }

    #[test]
    fn test_league_only() {
        let calendar = CalendarBuilder::build(34, &CompetitionFootprint::default()).unwrap();
        assert_eq!(calendar.total_weeks(), 34);
        assert_eq!(calendar.league_week_map(), (0..34).collect::<Vec<_>>());
    }

    #[test]
    fn test_every_item_gets_a_week() {
        let calendar = CalendarBuilder::build(34, &full_footprint()).unwrap();

        assert_eq!(calendar.league_matchdays(), 34);
        assert_eq!(calendar.cup_weeks().len(), 5);
        assert_eq!(calendar.split_final_weeks().len(), 2);

        let continental = calendar.continental_weeks_by_phase();
        assert_eq!(continental[&ContinentalPhase::LeaguePhase].len(), 6);
        assert_eq!(continental[&ContinentalPhase::Playoff].len(), 2);
        assert_eq!(continental[&ContinentalPhase::Final].len(), 1);

        assert_eq!(calendar.total_weeks(), 34 + 5 + 2 + 6 + 2 + 2 + 2 + 1);
    }

    #[test]
    fn test_phases_in_order_and_contiguous() {
        let calendar = CalendarBuilder::build(30, &full_footprint()).unwrap();
        let by_phase = calendar.continental_weeks_by_phase();

        let mut last_week = None;
        for weeks in by_phase.values() {
            assert!(weeks.windows(2).all(|w| w[1] == w[0] + 1));
            if let Some(last) = last_week {
                assert!(weeks[0] > last);
            }
            last_week = weeks.last().copied();
        }
    }

    #[test]
    fn test_cup_never_follows_continental_week() {
        let calendar = CalendarBuilder::build(38, &full_footprint()).unwrap();

        for week in calendar.cup_weeks() {
            if week > 0 {
                let previous = calendar.slot(week - 1).unwrap();
                assert!(!previous.is_continental());
            }
        }
    }

    #[test]
    fn test_split_final_after_last_matchday() {
        let calendar = CalendarBuilder::build(22, &full_footprint()).unwrap();
        let last_league_week = *calendar.league_week_map().last().unwrap();
        let finals = calendar.split_final_weeks();

        assert_eq!(finals.len(), 2);
        assert!(finals[0] > last_league_week);
        assert_eq!(finals[1], finals[0] + 1);
    }

    #[test]
    fn test_no_league_still_places_everything() {
        let calendar = CalendarBuilder::build(0, &full_footprint()).unwrap();
        assert_eq!(calendar.league_matchdays(), 0);
        assert_eq!(calendar.cup_weeks().len(), 5);
    }

    #[test]
    fn test_exhausted_league_lets_cup_follow_continental_week() {
        let calendar = CalendarBuilder::build(0, &full_footprint()).unwrap();
        let first_cup = calendar.cup_weeks()[0];

        assert!(first_cup > 0);
        assert!(calendar.slot(first_cup - 1).unwrap().is_continental());
    }
}
