use crate::error::{CompetitionError, CompetitionResult};
use crate::r#match::{PlayedMatch, Side};
use crate::season::{MatchRequest, MatchRunner};
use crate::shared::{CompetitionKind, TeamRegistry};
use log::{debug, info};
use serde::{Deserialize, Serialize};

const COMPETITION: &str = "Promotion playoff";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayoffPhase {
    SemiFinals,
    Final,
    Completed,
}

/// Regulation score plus the escalation data a level match needs. Extra-time
/// goals are the ones scored in the extra thirty minutes only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffMatchScore {
    pub regulation: (u8, u8),
    pub extra_time: Option<(u8, u8)>,
    pub penalties: Option<(u8, u8)>,
}

impl PlayoffMatchScore {
    pub fn regulation(home_goals: u8, away_goals: u8) -> Self {
        PlayoffMatchScore {
            regulation: (home_goals, away_goals),
            extra_time: None,
            penalties: None,
        }
    }

    pub fn with_extra_time(mut self, home_goals: u8, away_goals: u8) -> Self {
        self.extra_time = Some((home_goals, away_goals));
        self
    }

    pub fn with_penalties(mut self, home: u8, away: u8) -> Self {
        self.penalties = Some((home, away));
        self
    }

    /// Regulation, then extra time, then penalties. Each stage is only valid when
    /// the previous one ended level.
    pub fn winning_side(&self, home: u32, away: u32) -> CompetitionResult<Side> {
        let (home_goals, away_goals) = self.regulation;

        if home_goals != away_goals {
            if self.extra_time.is_some() || self.penalties.is_some() {
                return Err(CompetitionError::out_of_sequence(
                    COMPETITION,
                    "extra time recorded after a decided match",
                ));
            }
            return Ok(if home_goals > away_goals { Side::Home } else { Side::Away });
        }

        let Some((home_extra, away_extra)) = self.extra_time else {
            return Err(CompetitionError::MissingExtraTime {
                competition: String::from(COMPETITION),
                home,
                away,
            });
        };

        if home_extra != away_extra {
            if self.penalties.is_some() {
                return Err(CompetitionError::out_of_sequence(
                    COMPETITION,
                    "penalties recorded after extra time decided the match",
                ));
            }
            return Ok(if home_extra > away_extra { Side::Home } else { Side::Away });
        }

        match self.penalties {
            Some((home_pens, away_pens)) if home_pens != away_pens => {
                Ok(if home_pens > away_pens { Side::Home } else { Side::Away })
            }
            _ => Err(CompetitionError::MissingShootout {
                competition: String::from(COMPETITION),
                home,
                away,
            }),
        }
    }
}

/// A single-match tie hosted by the better seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffTie {
    pub home_team_id: u32,
    pub away_team_id: u32,
    pub score: Option<PlayoffMatchScore>,
    pub winner: Option<u32>,
}

impl PlayoffTie {
    pub fn new(home_team_id: u32, away_team_id: u32) -> Self {
        PlayoffTie {
            home_team_id,
            away_team_id,
            score: None,
            winner: None,
        }
    }

    pub fn involves(&self, team_id: u32) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    fn record(&mut self, score: PlayoffMatchScore) -> CompetitionResult<u32> {
        if self.winner.is_some() {
            return Err(CompetitionError::out_of_sequence(
                COMPETITION,
                format!("{} vs {} already played", self.home_team_id, self.away_team_id),
            ));
        }

        let winner = match score.winning_side(self.home_team_id, self.away_team_id)? {
            Side::Home => self.home_team_id,
            Side::Away => self.away_team_id,
        };

        self.score = Some(score);
        self.winner = Some(winner);
        Ok(winner)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayoffMatchRef {
    pub phase: PlayoffPhase,
    pub index: usize,
    pub home_team_id: u32,
    pub away_team_id: u32,
}

impl PlayoffMatchRef {
    pub fn involves(&self, team_id: u32) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }
}

/// Semi-finals and a final for contested promotion places. One instance per
/// league, or per group in group-organized divisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionPlayoffBracket {
    pub league_id: u32,
    pub group_id: Option<u8>,
    pub phase: PlayoffPhase,
    pub seeds: Vec<u32>,
    pub semi_finals: Vec<PlayoffTie>,
    pub final_tie: Option<PlayoffTie>,
    pub winner: Option<u32>,
}

impl PromotionPlayoffBracket {
    /// `seeds` in table order. Width 4 plays 1v4 and 2v3 semis; width 2 goes
    /// straight to the final.
    pub fn new(league_id: u32, group_id: Option<u8>, seeds: &[u32]) -> CompetitionResult<Self> {
        let mut bracket = PromotionPlayoffBracket {
            league_id,
            group_id,
            phase: PlayoffPhase::Completed,
            seeds: seeds.to_vec(),
            semi_finals: Vec::new(),
            final_tie: None,
            winner: None,
        };

        match seeds.len() {
            0 => {}
            1 => bracket.winner = Some(seeds[0]),
            2 => {
                bracket.final_tie = Some(PlayoffTie::new(seeds[0], seeds[1]));
                bracket.phase = PlayoffPhase::Final;
            }
            4 => {
                bracket.semi_finals = vec![
                    PlayoffTie::new(seeds[0], seeds[3]),
                    PlayoffTie::new(seeds[1], seeds[2]),
                ];
                bracket.phase = PlayoffPhase::SemiFinals;
            }
            width => {
                return Err(CompetitionError::invalid_configuration(format!(
                    "playoff width {} is not supported",
                    width
                )));
            }
        }

        debug!(
            "promotion playoff for league {} group {:?}: {:?}",
            league_id, group_id, bracket.seeds
        );

        Ok(bracket)
    }

    pub fn contains(&self, team_id: u32) -> bool {
        self.seeds.contains(&team_id)
    }

    pub fn is_completed(&self) -> bool {
        self.phase == PlayoffPhase::Completed
    }

    pub fn next_match(&self) -> Option<PlayoffMatchRef> {
        match self.phase {
            PlayoffPhase::SemiFinals => self
                .semi_finals
                .iter()
                .enumerate()
                .find(|(_, tie)| tie.winner.is_none())
                .map(|(index, tie)| PlayoffMatchRef {
                    phase: PlayoffPhase::SemiFinals,
                    index,
                    home_team_id: tie.home_team_id,
                    away_team_id: tie.away_team_id,
                }),
            PlayoffPhase::Final => self.final_tie.as_ref().map(|tie| PlayoffMatchRef {
                phase: PlayoffPhase::Final,
                index: 0,
                home_team_id: tie.home_team_id,
                away_team_id: tie.away_team_id,
            }),
            PlayoffPhase::Completed => None,
        }
    }

    pub fn play(&mut self, phase: PlayoffPhase, index: usize, score: PlayoffMatchScore) -> CompetitionResult<u32> {
        if phase != self.phase {
            return Err(CompetitionError::out_of_sequence(
                COMPETITION,
                format!("{:?} match requested during {:?}", phase, self.phase),
            ));
        }

        match phase {
            PlayoffPhase::SemiFinals => {
                let tie = self
                    .semi_finals
                    .get_mut(index)
                    .ok_or_else(|| CompetitionError::UnknownMatch(format!("semi-final {}", index + 1)))?;
                let winner = tie.record(score)?;

                let winners: Vec<u32> = self.semi_finals.iter().filter_map(|t| t.winner).collect();
                if winners.len() == self.semi_finals.len() {
                    let (home, away) = self.by_seed(winners[0], winners[1]);
                    self.final_tie = Some(PlayoffTie::new(home, away));
                    self.phase = PlayoffPhase::Final;
                }

                Ok(winner)
            }
            PlayoffPhase::Final => {
                let tie = self
                    .final_tie
                    .as_mut()
                    .ok_or_else(|| CompetitionError::UnknownMatch(String::from("playoff final")))?;
                let winner = tie.record(score)?;

                info!("⬆️ Playoff winner for league {}: team {}", self.league_id, winner);

                self.winner = Some(winner);
                self.phase = PlayoffPhase::Completed;
                Ok(winner)
            }
            PlayoffPhase::Completed => Err(CompetitionError::out_of_sequence(
                COMPETITION,
                "bracket already completed",
            )),
        }
    }

    fn by_seed(&self, a: u32, b: u32) -> (u32, u32) {
        let seed = |team: u32| self.seeds.iter().position(|&t| t == team).unwrap_or(usize::MAX);
        if seed(a) <= seed(b) { (a, b) } else { (b, a) }
    }

    /// Plays one match with the generator, escalating to extra time and penalties.
    pub fn simulate_match(
        &mut self,
        match_ref: PlayoffMatchRef,
        teams: &TeamRegistry,
        runner: &mut MatchRunner<'_>,
    ) -> CompetitionResult<PlayedMatch> {
        let request = MatchRequest::new(
            CompetitionKind::Playoff,
            self.league_id,
            format!(
                "playoff-{}-{}-{:?}-{}",
                self.league_id,
                self.group_id.unwrap_or(0),
                match_ref.phase,
                match_ref.index + 1
            ),
            match_ref.home_team_id,
            match_ref.away_team_id,
        );

        let mut played = runner.play(teams, &request)?;
        let mut score = PlayoffMatchScore::regulation(played.home_score, played.away_score);

        if played.home_score == played.away_score {
            let (regulation_home, regulation_away) = (played.home_score, played.away_score);
            runner.extra_time(teams, &request, &mut played)?;
            score = score.with_extra_time(played.home_score - regulation_home, played.away_score - regulation_away);

            if played.home_score == played.away_score {
                let shootout = runner.shootout(teams, match_ref.home_team_id, match_ref.away_team_id)?;
                played.shootout = Some(shootout);
                score = score.with_penalties(shootout.home, shootout.away);
            }
        }

        self.play(match_ref.phase, match_ref.index, score)?;
        Ok(played)
    }

    /// Plays every remaining match with the generator.
    pub fn auto_resolve(&mut self, teams: &TeamRegistry, runner: &mut MatchRunner<'_>) -> CompetitionResult<Vec<PlayedMatch>> {
        let mut played = Vec::new();
        while let Some(next) = self.next_match() {
            played.push(self.simulate_match(next, teams, runner)?);
        }
        Ok(played)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_four_seeding() {
        let bracket = PromotionPlayoffBracket::new(2, None, &[3, 4, 5, 6]).unwrap();
        assert_eq!(bracket.phase, PlayoffPhase::SemiFinals);
        assert_eq!(bracket.semi_finals[0].home_team_id, 3);
        assert_eq!(bracket.semi_finals[0].away_team_id, 6);
        assert_eq!(bracket.semi_finals[1].home_team_id, 4);
        assert_eq!(bracket.semi_finals[1].away_team_id, 5);
    }

    #[test]
    fn test_width_two_is_final_only() {
        let bracket = PromotionPlayoffBracket::new(2, Some(1), &[8, 9]).unwrap();
        assert_eq!(bracket.phase, PlayoffPhase::Final);
        assert!(bracket.semi_finals.is_empty());
        assert!(PromotionPlayoffBracket::new(2, None, &[1, 2, 3]).is_err());
    }

    #[test]
    fn test_final_before_semis_rejected() {
        let mut bracket = PromotionPlayoffBracket::new(2, None, &[3, 4, 5, 6]).unwrap();
        assert!(matches!(
            bracket.play(PlayoffPhase::Final, 0, PlayoffMatchScore::regulation(1, 0)),
            Err(CompetitionError::OutOfSequence { .. })
        ));
    }

    #[test]
    fn test_escalation_requires_extra_time_then_penalties() {
        let mut bracket = PromotionPlayoffBracket::new(2, None, &[3, 4, 5, 6]).unwrap();

        assert!(matches!(
            bracket.play(PlayoffPhase::SemiFinals, 0, PlayoffMatchScore::regulation(1, 1)),
            Err(CompetitionError::MissingExtraTime { .. })
        ));
        assert!(matches!(
            bracket.play(
                PlayoffPhase::SemiFinals,
                0,
                PlayoffMatchScore::regulation(1, 1).with_extra_time(0, 0)
            ),
            Err(CompetitionError::MissingShootout { .. })
        ));
        assert!(bracket
            .play(
                PlayoffPhase::SemiFinals,
                0,
                PlayoffMatchScore::regulation(1, 1).with_extra_time(0, 0).with_penalties(3, 3)
            )
            .is_err());
        assert!(bracket
            .play(PlayoffPhase::SemiFinals, 0, PlayoffMatchScore::regulation(2, 1).with_extra_time(0, 0))
            .is_err());

        let winner = bracket
            .play(
                PlayoffPhase::SemiFinals,
                0,
                PlayoffMatchScore::regulation(1, 1).with_extra_time(0, 0).with_penalties(4, 5),
            )
            .unwrap();
        assert_eq!(winner, 6);
    }

    #[test]
    fn test_better_seed_hosts_final() {
        let mut bracket = PromotionPlayoffBracket::new(2, None, &[3, 4, 5, 6]).unwrap();
        bracket
            .play(PlayoffPhase::SemiFinals, 0, PlayoffMatchScore::regulation(0, 1))
            .unwrap();
        bracket
            .play(PlayoffPhase::SemiFinals, 1, PlayoffMatchScore::regulation(2, 0))
            .unwrap();

        let next = bracket.next_match().unwrap();
        assert_eq!(next.phase, PlayoffPhase::Final);
        assert_eq!(next.home_team_id, 4);
        assert_eq!(next.away_team_id, 6);

        bracket
            .play(PlayoffPhase::Final, 0, PlayoffMatchScore::regulation(1, 1).with_extra_time(1, 0))
            .unwrap();
        assert_eq!(bracket.winner, Some(4));
        assert!(bracket.is_completed());
        assert!(bracket.next_match().is_none());
    }
}
