use crate::error::{CompetitionError, CompetitionResult};
use crate::league::LeagueTable;
use crate::shared::LegResult;
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeasonHalf {
    Apertura,
    Clausura,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeciderWinReason {
    SameChampion,
    Aggregate,
    AwayGoals,
    /// House rule: a decider level on aggregate and away goals goes to the clausura champion.
    ClausuraAdvantage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSeasonOutcome {
    pub winner: u32,
    pub had_final: bool,
    pub win_reason: DeciderWinReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalDecider {
    pub apertura_champion: u32,
    pub clausura_champion: u32,
    pub leg1: Option<LegResult>,
    pub leg2: Option<LegResult>,
    pub aggregate: Option<(u32, u32)>,
    pub away_goals: Option<(u32, u32)>,
    pub winner: Option<u32>,
    pub method: Option<DeciderWinReason>,
}

impl FinalDecider {
    pub fn new(apertura_champion: u32, clausura_champion: u32) -> Self {
        FinalDecider {
            apertura_champion,
            clausura_champion,
            leg1: None,
            leg2: None,
            aggregate: None,
            away_goals: None,
            winner: None,
            method: None,
        }
    }

    /// (home, away) for leg 1 or 2. The apertura champion hosts the first leg.
    pub fn pairing(&self, leg: u8) -> (u32, u32) {
        if leg == 1 {
            (self.apertura_champion, self.clausura_champion)
        } else {
            (self.clausura_champion, self.apertura_champion)
        }
    }

    pub fn next_leg(&self) -> Option<u8> {
        match (self.leg1, self.leg2) {
            (None, _) => Some(1),
            (Some(_), None) => Some(2),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.winner.is_some()
    }
}

/// Aggregate, then away goals, then the clausura champion. Always yields a winner.
pub fn resolve_split_decider(
    apertura_champion: u32,
    clausura_champion: u32,
    leg1: &LegResult,
    leg2: &LegResult,
) -> (u32, DeciderWinReason) {
    let apertura_total = leg1.goals_for(apertura_champion) + leg2.goals_for(apertura_champion);
    let clausura_total = leg1.goals_for(clausura_champion) + leg2.goals_for(clausura_champion);

    if apertura_total != clausura_total {
        let winner = if apertura_total > clausura_total {
            apertura_champion
        } else {
            clausura_champion
        };
        return (winner, DeciderWinReason::Aggregate);
    }

    let apertura_away = leg1.away_goals_for(apertura_champion) + leg2.away_goals_for(apertura_champion);
    let clausura_away = leg1.away_goals_for(clausura_champion) + leg2.away_goals_for(clausura_champion);

    if apertura_away != clausura_away {
        let winner = if apertura_away > clausura_away {
            apertura_champion
        } else {
            clausura_champion
        };
        return (winner, DeciderWinReason::AwayGoals);
    }

    (clausura_champion, DeciderWinReason::ClausuraAdvantage)
}

/// Two single round-robin championships in one season, settled by a decider when
/// their winners differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AperturaClausuraSeason {
    pub teams: Vec<u32>,
    pub apertura_matchdays: u16,
    pub apertura_table: LeagueTable,
    pub clausura_table: Option<LeagueTable>,
    pub current_half: SeasonHalf,
    pub decider: Option<FinalDecider>,
    pub outcome: Option<SplitSeasonOutcome>,
}

impl AperturaClausuraSeason {
    pub fn new(teams: &[u32], apertura_matchdays: u16) -> Self {
        AperturaClausuraSeason {
            teams: teams.to_vec(),
            apertura_matchdays,
            apertura_table: LeagueTable::new(teams),
            clausura_table: None,
            current_half: SeasonHalf::Apertura,
            decider: None,
            outcome: None,
        }
    }

    pub fn half_for_matchday(&self, matchday: u16) -> SeasonHalf {
        if matchday < self.apertura_matchdays {
            SeasonHalf::Apertura
        } else {
            SeasonHalf::Clausura
        }
    }

    pub fn begin_clausura(&mut self) -> CompetitionResult<()> {
        if self.current_half == SeasonHalf::Clausura {
            return Err(CompetitionError::out_of_sequence(
                "Apertura/Clausura",
                "clausura already started",
            ));
        }

        info!(
            "🔄 Apertura closed, champion: {:?}; clausura begins",
            self.apertura_table.leader()
        );

        self.current_half = SeasonHalf::Clausura;
        self.clausura_table = Some(LeagueTable::new(&self.teams));
        Ok(())
    }

    pub fn apply_result(
        &mut self,
        half: SeasonHalf,
        home_team_id: u32,
        away_team_id: u32,
        home_goals: u8,
        away_goals: u8,
    ) -> CompetitionResult<()> {
        let table = match (half, self.current_half) {
            (SeasonHalf::Apertura, SeasonHalf::Apertura) => &mut self.apertura_table,
            (SeasonHalf::Clausura, SeasonHalf::Clausura) => match self.clausura_table.as_mut() {
                Some(table) => table,
                None => {
                    return Err(CompetitionError::out_of_sequence(
                        "Apertura/Clausura",
                        "clausura table missing",
                    ));
                }
            },
            (requested, current) => {
                return Err(CompetitionError::out_of_sequence(
                    "Apertura/Clausura",
                    format!("{:?} result while {:?} is in progress", requested, current),
                ));
            }
        };

        table.apply_result(home_team_id, away_team_id, home_goals, away_goals);
        Ok(())
    }

    /// Called once every league fixture is played. Declares the champion outright
    /// when one club won both halves, otherwise opens the decider.
    pub fn conclude_halves(&mut self) -> CompetitionResult<Option<SplitSeasonOutcome>> {
        if self.decider.is_some() || self.outcome.is_some() {
            return Err(CompetitionError::out_of_sequence(
                "Apertura/Clausura",
                "halves already concluded",
            ));
        }

        let clausura = self.clausura_table.as_ref().ok_or_else(|| {
            CompetitionError::out_of_sequence("Apertura/Clausura", "clausura not played")
        })?;

        let (apertura_champion, clausura_champion) = match (self.apertura_table.leader(), clausura.leader()) {
            (Some(a), Some(c)) => (a, c),
            _ => {
                return Err(CompetitionError::invalid_configuration(
                    "split season without teams",
                ));
            }
        };

        if apertura_champion == clausura_champion {
            info!("🏆 Team {} won both halves, no final needed", apertura_champion);

            let outcome = SplitSeasonOutcome {
                winner: apertura_champion,
                had_final: false,
                win_reason: DeciderWinReason::SameChampion,
            };
            self.outcome = Some(outcome);
            return Ok(Some(outcome));
        }

        info!(
            "⚔️ Grand final: {} (apertura) vs {} (clausura)",
            apertura_champion, clausura_champion
        );

        self.decider = Some(FinalDecider::new(apertura_champion, clausura_champion));
        Ok(None)
    }

    pub fn pending_leg(&self) -> Option<(u8, u32, u32)> {
        let decider = self.decider.as_ref()?;
        if decider.is_resolved() {
            return None;
        }

        decider.next_leg().map(|leg| {
            let (home, away) = decider.pairing(leg);
            (leg, home, away)
        })
    }

    pub fn play_decider_leg(&mut self, leg: u8, home_goals: u8, away_goals: u8) -> CompetitionResult<Option<SplitSeasonOutcome>> {
        let decider = self.decider.as_mut().ok_or_else(|| {
            CompetitionError::out_of_sequence("Apertura/Clausura", "no decider scheduled")
        })?;

        if decider.next_leg() != Some(leg) {
            return Err(CompetitionError::out_of_sequence(
                "Apertura/Clausura",
                format!("leg {} is not the next decider leg", leg),
            ));
        }

        let (home, away) = decider.pairing(leg);
        let result = LegResult::new(home, away, home_goals, away_goals);

        if leg == 1 {
            decider.leg1 = Some(result);
            return Ok(None);
        }
        decider.leg2 = Some(result);

        let (a, c) = (decider.apertura_champion, decider.clausura_champion);
        let Some(leg1) = decider.leg1 else {
            return Err(CompetitionError::out_of_sequence("Apertura/Clausura", "first leg missing"));
        };

        decider.aggregate = Some((
            leg1.goals_for(a) + result.goals_for(a),
            leg1.goals_for(c) + result.goals_for(c),
        ));
        decider.away_goals = Some((
            leg1.away_goals_for(a) + result.away_goals_for(a),
            leg1.away_goals_for(c) + result.away_goals_for(c),
        ));

        let (winner, reason) = resolve_split_decider(a, c, &leg1, &result);
        decider.winner = Some(winner);
        decider.method = Some(reason);

        info!("🏆 Split-season champion: team {} ({:?})", winner, reason);

        let outcome = SplitSeasonOutcome {
            winner,
            had_final: true,
            win_reason: reason,
        };
        self.outcome = Some(outcome);
        Ok(Some(outcome))
    }

    pub fn combined_table(&self) -> LeagueTable {
        match &self.clausura_table {
            Some(clausura) => self.apertura_table.combined(clausura),
            None => self.apertura_table.clone(),
        }
    }

    /// Season champion first, then everyone else by the combined table.
    pub fn season_order(&self) -> Vec<u32> {
        let combined = self.combined_table().ranked_team_ids();

        match self.outcome {
            Some(outcome) => std::iter::once(outcome.winner)
                .chain(combined.into_iter().filter(|&id| id != outcome.winner))
                .collect(),
            None => combined,
        }
    }
}
