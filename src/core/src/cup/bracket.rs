use crate::context::SeasonContext;
use crate::cup::CupResult;
use crate::error::{CompetitionError, CompetitionResult};
use crate::r#match::Side;
use crate::season::{MatchRequest, MatchRunner};
use crate::shared::{bracket_order, CompetitionKind, TeamRegistry};
use log::{debug, info};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CupMatch {
    pub home_team_id: Option<u32>,
    pub away_team_id: Option<u32>,
    pub bye: bool,
    pub played: bool,
    pub home_score: Option<u8>,
    pub away_score: Option<u8>,
    pub went_to_penalties: bool,
    pub winner_id: Option<u32>,
}

impl CupMatch {
    pub fn new(home_team_id: u32, away_team_id: u32) -> Self {
        CupMatch {
            home_team_id: Some(home_team_id),
            away_team_id: Some(away_team_id),
            bye: false,
            played: false,
            home_score: None,
            away_score: None,
            went_to_penalties: false,
            winner_id: None,
        }
    }

    /// A walkover: one side present, already played, that side through.
    pub fn bye(team_id: u32) -> Self {
        CupMatch {
            home_team_id: Some(team_id),
            away_team_id: None,
            bye: true,
            played: true,
            home_score: None,
            away_score: None,
            went_to_penalties: false,
            winner_id: Some(team_id),
        }
    }

    pub fn involves(&self, team_id: u32) -> bool {
        self.home_team_id == Some(team_id) || self.away_team_id == Some(team_id)
    }

    pub fn loser_id(&self) -> Option<u32> {
        if self.bye {
            return None;
        }
        let winner = self.winner_id?;
        if self.home_team_id == Some(winner) {
            self.away_team_id
        } else {
            self.home_team_id
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CupRound {
    pub name: String,
    pub matches: Vec<CupMatch>,
}

impl CupRound {
    pub fn is_decided(&self) -> bool {
        self.matches.iter().all(|m| m.played && m.winner_id.is_some())
    }

    pub fn byes(&self) -> usize {
        self.matches.iter().filter(|m| m.bye).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CupRoundState {
    InProgress { round: usize },
    Completed { champion: Option<u32> },
}

/// Score of a cup match. A level score must carry the shootout winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CupScore {
    pub home_goals: u8,
    pub away_goals: u8,
    pub shootout_winner: Option<Side>,
}

impl CupScore {
    pub fn new(home_goals: u8, away_goals: u8) -> Self {
        CupScore {
            home_goals,
            away_goals,
            shootout_winner: None,
        }
    }

    pub fn with_shootout(mut self, winner: Side) -> Self {
        self.shootout_winner = Some(winner);
        self
    }
}

/// Single-elimination knockout. Byes fill round one so every later round is a power of two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CupBracket {
    pub id: u32,
    pub name: String,
    pub rounds: Vec<CupRound>,
    pub state: CupRoundState,
    pub total_rounds: usize,
}

impl CupBracket {
    /// `entrants` are in seed order, best first. Byes go to the top seeds.
    pub fn new(id: u32, name: &str, entrants: &[u32]) -> Self {
        let mut bracket = CupBracket {
            id,
            name: String::from(name),
            rounds: Vec::new(),
            state: CupRoundState::Completed { champion: None },
            total_rounds: 0,
        };

        match entrants.len() {
            0 => {
                info!("🏆 {}: no entrants, cup void", name);
            }
            1 => {
                info!("🏆 {}: single entrant {} wins by default", name, entrants[0]);
                bracket.state = CupRoundState::Completed {
                    champion: Some(entrants[0]),
                };
            }
            count => {
                let size = count.next_power_of_two();
                bracket.total_rounds = size.trailing_zeros() as usize;

                let slots: Vec<Option<u32>> = bracket_order(size)
                    .into_iter()
                    .map(|seed| entrants.get(seed - 1).copied())
                    .collect();

                let matches: Vec<CupMatch> = slots
                    .chunks(2)
                    .filter_map(|pair| match (pair[0], pair[1]) {
                        (Some(home), Some(away)) => Some(CupMatch::new(home, away)),
                        (Some(team), None) | (None, Some(team)) => Some(CupMatch::bye(team)),
                        (None, None) => None,
                    })
                    .collect();

                let round = CupRound {
                    name: Self::round_name(matches.len() * 2),
                    matches,
                };

                info!(
                    "🏆 {} draw: {} entrants, {} byes, {} rounds",
                    name,
                    count,
                    round.byes(),
                    bracket.total_rounds
                );

                bracket.rounds.push(round);
                bracket.state = CupRoundState::InProgress { round: 0 };
            }
        }

        bracket
    }

    pub fn round_name(teams_in_round: usize) -> String {
        match teams_in_round {
            2 => String::from("Final"),
            4 => String::from("Semi-finals"),
            8 => String::from("Quarter-finals"),
            n => format!("Round of {}", n),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, CupRoundState::Completed { .. })
    }

    pub fn champion(&self) -> Option<u32> {
        match self.state {
            CupRoundState::Completed { champion } => champion,
            CupRoundState::InProgress { .. } => None,
        }
    }

    pub fn active_round(&self) -> Option<usize> {
        match self.state {
            CupRoundState::InProgress { round } => Some(round),
            CupRoundState::Completed { .. } => None,
        }
    }

    /// Unplayed match of the active round for the team, with its index.
    pub fn pending_match_for(&self, team_id: u32) -> Option<(usize, &CupMatch)> {
        let round = self.active_round()?;
        self.rounds[round]
            .matches
            .iter()
            .enumerate()
            .find(|(_, m)| !m.played && m.involves(team_id))
    }

    pub fn play_match(&mut self, round: usize, index: usize, score: CupScore) -> CompetitionResult<Option<u32>> {
        if self.active_round() != Some(round) {
            return Err(CompetitionError::out_of_sequence(
                &self.name,
                format!("round {} is not the active round", round + 1),
            ));
        }

        let cup_match = self.rounds[round]
            .matches
            .get_mut(index)
            .ok_or_else(|| CompetitionError::UnknownMatch(format!("round {} match {}", round + 1, index + 1)))?;

        if cup_match.played {
            return Err(CompetitionError::out_of_sequence(
                &self.name,
                format!("round {} match {} already played", round + 1, index + 1),
            ));
        }

        let (Some(home), Some(away)) = (cup_match.home_team_id, cup_match.away_team_id) else {
            return Err(CompetitionError::out_of_sequence(&self.name, "match has no opponents yet"));
        };

        let winner = match score.home_goals.cmp(&score.away_goals) {
            std::cmp::Ordering::Greater => home,
            std::cmp::Ordering::Less => away,
            std::cmp::Ordering::Equal => match score.shootout_winner {
                Some(Side::Home) => home,
                Some(Side::Away) => away,
                None => {
                    return Err(CompetitionError::MissingShootout {
                        competition: self.name.clone(),
                        home,
                        away,
                    });
                }
            },
        };

        cup_match.played = true;
        cup_match.home_score = Some(score.home_goals);
        cup_match.away_score = Some(score.away_goals);
        cup_match.went_to_penalties = score.home_goals == score.away_goals;
        cup_match.winner_id = Some(winner);

        self.advance_if_decided();

        Ok(Some(winner))
    }

    fn advance_if_decided(&mut self) {
        let Some(round) = self.active_round() else {
            return;
        };

        if !self.rounds[round].is_decided() {
            return;
        }

        let winners: Vec<u32> = self.rounds[round]
            .matches
            .iter()
            .filter_map(|m| m.winner_id)
            .collect();

        if winners.len() == 1 {
            info!("🏆 {} won by team {}", self.name, winners[0]);
            self.state = CupRoundState::Completed {
                champion: Some(winners[0]),
            };
            return;
        }

        let matches: Vec<CupMatch> = winners
            .chunks(2)
            .map(|pair| match *pair {
                [home, away] => CupMatch::new(home, away),
                _ => CupMatch::bye(pair[0]),
            })
            .collect();

        let next = CupRound {
            name: Self::round_name(matches.len() * 2),
            matches,
        };

        debug!("{}: {} drawn", self.name, next.name);

        self.rounds.push(next);
        self.state = CupRoundState::InProgress { round: round + 1 };
        self.advance_if_decided();
    }

    /// Plays the AI matches of `round` if it is the active one. Level matches go
    /// straight to penalties.
    pub fn simulate_round(
        &mut self,
        ctx: &SeasonContext,
        round: usize,
        teams: &TeamRegistry,
        runner: &mut MatchRunner<'_>,
    ) -> CompetitionResult<CupResult> {
        let mut result = CupResult::new(self.id);

        if self.active_round() != Some(round) {
            return Ok(result);
        }

        let pending: Vec<(usize, u32, u32)> = self.rounds[round]
            .matches
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.played)
            .filter_map(|(index, m)| Some((index, m.home_team_id?, m.away_team_id?)))
            .filter(|(_, home, away)| !ctx.involves_human(*home, *away))
            .collect();

        for (index, home, away) in pending {
            let request = MatchRequest::new(
                CompetitionKind::Cup,
                self.id,
                format!("cup-{}-r{}-m{}", self.id, round + 1, index + 1),
                home,
                away,
            );

            let mut played = runner.play(teams, &request)?;
            let mut score = CupScore::new(played.home_score, played.away_score);

            if played.home_score == played.away_score {
                let shootout = runner.shootout(teams, home, away)?;
                played.shootout = Some(shootout);
                score.shootout_winner = shootout.winner();
            }

            self.play_match(round, index, score)?;
            result.matches.push(played);
        }

        result.champion = self.champion();
        Ok(result)
    }

    /// Name of the round a team went out in, "Winner" for the champion.
    pub fn finish_for(&self, team_id: u32) -> Option<String> {
        if self.champion() == Some(team_id) {
            return Some(String::from("Winner"));
        }

        self.rounds
            .iter()
            .find(|r| r.matches.iter().any(|m| m.loser_id() == Some(team_id)))
            .map(|r| r.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entrants(count: u32) -> Vec<u32> {
        (1..=count).collect()
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
                bracket.play_match(round, index, CupScore::new(1, 0)).unwrap();
            }
        }
    }

    #[test]
    fn test_thirteen_entrants() {
        let bracket = CupBracket::new(1, "National Cup", &entrants(13));
        let first = &bracket.rounds[0];

        assert_eq!(first.matches.len(), 8);
        assert_eq!(first.byes(), 3);
        assert_eq!(bracket.total_rounds, 4);
        assert_eq!(first.name, "Round of 16");
    }

    #[test]
    fn test_byes_go_to_top_seeds() {
        let bracket = CupBracket::new(1, "National Cup", &entrants(13));
        let mut bye_teams: Vec<u32> = bracket.rounds[0]
            .matches
            .iter()
            .filter(|m| m.bye)
            .filter_map(|m| m.winner_id)
            .collect();
        bye_teams.sort();

        assert_eq!(bye_teams, vec![1, 2, 3]);
    }

    #[test]
    fn test_full_run_has_one_champion() {
        let mut bracket = CupBracket::new(1, "National Cup", &entrants(13));
        play_out(&mut bracket);

        assert_eq!(bracket.rounds.len(), 4);
        assert_eq!(bracket.rounds.last().unwrap().name, "Final");
        // Home side always wins, so seed 1 survives.
        assert_eq!(bracket.champion(), Some(1));
        assert_eq!(bracket.finish_for(1).as_deref(), Some("Winner"));
    }

    #[test]
    fn test_out_of_sequence_round_rejected() {
        let mut bracket = CupBracket::new(1, "National Cup", &entrants(8));

        let result = bracket.play_match(1, 0, CupScore::new(1, 0));
        assert!(matches!(result, Err(CompetitionError::OutOfSequence { .. })));
    }

    #[test]
    fn test_replayed_match_rejected() {
        let mut bracket = CupBracket::new(1, "National Cup", &entrants(8));
        bracket.play_match(0, 0, CupScore::new(2, 0)).unwrap();

        assert!(bracket.play_match(0, 0, CupScore::new(2, 0)).is_err());
    }

    #[test]
    fn test_draw_needs_shootout() {
        let mut bracket = CupBracket::new(1, "National Cup", &entrants(4));

        assert!(matches!(
            bracket.play_match(0, 0, CupScore::new(1, 1)),
            Err(CompetitionError::MissingShootout { .. })
        ));

        let winner = bracket
            .play_match(0, 0, CupScore::new(1, 1).with_shootout(Side::Away))
            .unwrap();
        assert_eq!(winner, bracket.rounds[0].matches[0].away_team_id);
        assert!(bracket.rounds[0].matches[0].went_to_penalties);
    }

    #[test]
    fn test_next_round_waits_for_whole_round() {
        let mut bracket = CupBracket::new(1, "National Cup", &entrants(4));
        bracket.play_match(0, 0, CupScore::new(1, 0)).unwrap();
        assert_eq!(bracket.rounds.len(), 1);

        bracket.play_match(0, 1, CupScore::new(0, 1)).unwrap();
        assert_eq!(bracket.rounds.len(), 2);
        assert_eq!(bracket.active_round(), Some(1));
    }

    #[test]
    fn test_degenerate_entrant_counts() {
        let empty = CupBracket::new(1, "Empty Cup", &[]);
        assert!(empty.is_completed());
        assert_eq!(empty.champion(), None);

        let single = CupBracket::new(1, "Solo Cup", &[42]);
        assert_eq!(single.champion(), Some(42));
        assert!(single.rounds.is_empty());
    }
}
