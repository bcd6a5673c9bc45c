use crate::error::{CompetitionError, CompetitionResult};
use crate::shared::LegResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieMethod {
    Aggregate,
    AwayGoals,
    SingleMatch,
    /// Settled outside the rules of the tie, by whoever supplied the decider.
    Decider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieResolution {
    pub winner: u32,
    pub method: TieMethod,
}

/// Aggregate, then away goals. `None` when both are level: continental ties never
/// invent a shootout, the caller has to supply a decider.
pub fn resolve_two_legged(leg1: &LegResult, leg2: &LegResult) -> Option<TieResolution> {
    let team_a = leg1.home_team_id;
    let team_b = leg1.away_team_id;

    let aggregate_a = leg1.goals_for(team_a) + leg2.goals_for(team_a);
    let aggregate_b = leg1.goals_for(team_b) + leg2.goals_for(team_b);

    if aggregate_a != aggregate_b {
        return Some(TieResolution {
            winner: if aggregate_a > aggregate_b { team_a } else { team_b },
            method: TieMethod::Aggregate,
        });
    }

    let away_a = leg1.away_goals_for(team_a) + leg2.away_goals_for(team_a);
    let away_b = leg1.away_goals_for(team_b) + leg2.away_goals_for(team_b);

    if away_a != away_b {
        return Some(TieResolution {
            winner: if away_a > away_b { team_a } else { team_b },
            method: TieMethod::AwayGoals,
        });
    }

    None
}

/// A knockout pairing. `team_a` is the better seed and hosts the first leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnockoutTie {
    pub team_a: u32,
    pub team_b: u32,
    pub leg1: Option<LegResult>,
    pub leg2: Option<LegResult>,
    pub single_match: bool,
    pub resolved: Option<TieResolution>,
    pub awaiting_decider: bool,
}

impl KnockoutTie {
    pub fn two_legged(team_a: u32, team_b: u32) -> Self {
        KnockoutTie {
            team_a,
            team_b,
            leg1: None,
            leg2: None,
            single_match: false,
            resolved: None,
            awaiting_decider: false,
        }
    }

    pub fn single(team_a: u32, team_b: u32) -> Self {
        KnockoutTie {
            single_match: true,
            ..KnockoutTie::two_legged(team_a, team_b)
        }
    }

    pub fn involves(&self, team_id: u32) -> bool {
        self.team_a == team_id || self.team_b == team_id
    }

    /// (leg number, home, away) of the next leg still to be played.
    pub fn next_leg(&self) -> Option<(u8, u32, u32)> {
        if self.resolved.is_some() || self.awaiting_decider {
            return None;
        }

        match (self.leg1, self.leg2) {
            (None, _) => Some((1, self.team_a, self.team_b)),
            (Some(_), None) if !self.single_match => Some((2, self.team_b, self.team_a)),
            _ => None,
        }
    }

    pub fn is_decided(&self) -> bool {
        self.resolved.is_some()
    }

    pub fn winner(&self) -> Option<u32> {
        self.resolved.map(|r| r.winner)
    }

    pub fn loser(&self) -> Option<u32> {
        self.winner()
            .map(|w| if w == self.team_a { self.team_b } else { self.team_a })
    }

    pub fn record_leg(&mut self, competition: &str, leg: u8, home_goals: u8, away_goals: u8) -> CompetitionResult<Option<TieResolution>> {
        let Some((expected_leg, home, away)) = self.next_leg() else {
            return Err(CompetitionError::out_of_sequence(
                competition,
                format!("tie {} vs {} has no leg left to play", self.team_a, self.team_b),
            ));
        };

        if expected_leg != leg {
            return Err(CompetitionError::out_of_sequence(
                competition,
                format!("leg {} requested, leg {} is next", leg, expected_leg),
            ));
        }

        let result = LegResult::new(home, away, home_goals, away_goals);

        if leg == 1 {
            self.leg1 = Some(result);
            if !self.single_match {
                return Ok(None);
            }
            self.resolved = result.winner().map(|winner| TieResolution {
                winner,
                method: TieMethod::SingleMatch,
            });
        } else {
            self.leg2 = Some(result);
            self.resolved = match self.leg1 {
                Some(first) => resolve_two_legged(&first, &result),
                None => None,
            };
        }

        self.awaiting_decider = self.resolved.is_none();
        Ok(self.resolved)
    }

    pub fn supply_decider(&mut self, competition: &str, winner: u32) -> CompetitionResult<()> {
        if !self.awaiting_decider {
            return Err(CompetitionError::out_of_sequence(
                competition,
                format!("tie {} vs {} is not waiting for a decider", self.team_a, self.team_b),
            ));
        }

        if !self.involves(winner) {
            return Err(CompetitionError::UnknownTeam(winner));
        }

        self.resolved = Some(TieResolution {
            winner,
            method: TieMethod::Decider,
        });
        self.awaiting_decider = false;
        Ok(())
    }

    pub fn unresolved_error(&self, competition: &str) -> CompetitionError {
        CompetitionError::UnresolvedTie {
            competition: String::from(competition),
            team_a: self.team_a,
            team_b: self.team_b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_decides() {
        let leg1 = LegResult::new(1, 2, 3, 1);
        let leg2 = LegResult::new(2, 1, 1, 0);
        let resolution = resolve_two_legged(&leg1, &leg2).unwrap();

        assert_eq!(resolution.winner, 1);
        assert_eq!(resolution.method, TieMethod::Aggregate);
    }

    #[test]
    fn test_away_goals_decide_level_aggregate() {
        // A hosts 2-1, then B hosts 1-0: 2-2 on aggregate, B scored once away.
        let leg1 = LegResult::new(10, 20, 2, 1);
        let leg2 = LegResult::new(20, 10, 1, 0);
        let resolution = resolve_two_legged(&leg1, &leg2).unwrap();

        assert_eq!(resolution.winner, 20);
        assert_eq!(resolution.method, TieMethod::AwayGoals);
    }

    #[test]
    fn test_mirror_level_tie_is_unresolved() {
        let leg1 = LegResult::new(1, 2, 1, 1);
        let leg2 = LegResult::new(2, 1, 1, 1);
        assert!(resolve_two_legged(&leg1, &leg2).is_none());
    }

    #[test]
    fn test_tie_waits_for_decider() {
        let mut tie = KnockoutTie::two_legged(1, 2);
        assert_eq!(tie.next_leg(), Some((1, 1, 2)));
        assert_eq!(tie.record_leg("Elite Cup", 1, 0, 0).unwrap(), None);
        assert_eq!(tie.next_leg(), Some((2, 2, 1)));
        assert_eq!(tie.record_leg("Elite Cup", 2, 0, 0).unwrap(), None);

        assert!(tie.awaiting_decider);
        assert_eq!(tie.next_leg(), None);

        assert!(tie.supply_decider("Elite Cup", 3).is_err());
        tie.supply_decider("Elite Cup", 2).unwrap();
        assert_eq!(tie.winner(), Some(2));
        assert_eq!(tie.loser(), Some(1));
    }

    #[test]
    fn test_single_match_final() {
        let mut tie = KnockoutTie::single(1, 2);
        let resolution = tie.record_leg("Elite Cup", 1, 0, 2).unwrap().unwrap();
        assert_eq!(resolution.winner, 2);
        assert_eq!(resolution.method, TieMethod::SingleMatch);
        assert!(tie.record_leg("Elite Cup", 2, 0, 0).is_err());

        let mut level = KnockoutTie::single(1, 2);
        assert_eq!(level.record_leg("Elite Cup", 1, 1, 1).unwrap(), None);
        assert!(level.awaiting_decider);
    }

    #[test]
    fn test_legs_must_be_played_in_order() {
        let mut tie = KnockoutTie::two_legged(1, 2);
        assert!(matches!(
            tie.record_leg("Elite Cup", 2, 1, 0),
            Err(CompetitionError::OutOfSequence { .. })
        ));
    }
}
