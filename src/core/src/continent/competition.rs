use crate::context::SeasonContext;
use crate::continent::{ContinentalFormat, ContinentalPhase, ContinentalResult, KnockoutTie, TieResolution};
use crate::error::{CompetitionError, CompetitionResult};
use crate::league::{Fixture, FixtureResult, LeagueTable, RoundRobin};
use crate::r#match::Side;
use crate::season::{MatchRequest, MatchRunner};
use crate::shared::{bracket_order, CompetitionKind, Currency, CurrencyValue, TeamRegistry};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeTable {
    pub participation: f64,
    pub league_phase_win: f64,
    pub league_phase_draw: f64,
    pub stage_bonus: f64,
    pub title_bonus: f64,
}

impl Default for PrizeTable {
    fn default() -> Self {
        PrizeTable {
            participation: 18_000_000.0,
            league_phase_win: 2_100_000.0,
            league_phase_draw: 700_000.0,
            stage_bonus: 9_000_000.0,
            title_bonus: 20_000_000.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationSnapshot {
    pub direct_qualifiers: Vec<u32>,
    pub playoff_entrants: Vec<u32>,
    pub eliminated: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContinentalFixtureRef {
    LeaguePhase { fixture_id: String },
    Knockout { phase: ContinentalPhase, tie_index: usize, leg: u8 },
}

/// A continental match due in a given week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinentalDue {
    pub competition_id: u32,
    pub fixture: ContinentalFixtureRef,
    pub home_team_id: u32,
    pub away_team_id: u32,
}

impl ContinentalDue {
    pub fn involves(&self, team_id: u32) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    pub fn is_final(&self) -> bool {
        matches!(
            self.fixture,
            ContinentalFixtureRef::Knockout {
                phase: ContinentalPhase::Final,
                ..
            }
        )
    }

    pub fn fixture_id(&self) -> String {
        match &self.fixture {
            ContinentalFixtureRef::LeaguePhase { fixture_id } => fixture_id.clone(),
            ContinentalFixtureRef::Knockout { phase, tie_index, leg } => {
                format!("c{}-{:?}-{}-leg{}", self.competition_id, phase, tie_index + 1, leg)
            }
        }
    }
}

/// Swiss-style league phase, qualification cut, two-legged knockout, one-match final.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinentalCompetition {
    pub id: u32,
    pub name: String,
    pub phase: ContinentalPhase,
    pub format: ContinentalFormat,
    pub teams: Vec<u32>,
    pub league_phase: Vec<Vec<Fixture>>,
    pub table: LeagueTable,
    pub qualification: Option<QualificationSnapshot>,
    pub knockout: BTreeMap<ContinentalPhase, Vec<KnockoutTie>>,
    /// League-phase finishing order, used for knockout seeding.
    pub seeds: Vec<u32>,
    /// Furthest knockout stage each team reached.
    pub reached: BTreeMap<u32, ContinentalPhase>,
    pub champion: Option<u32>,
    pub prizes: PrizeTable,
    pub prize_money: BTreeMap<u32, CurrencyValue>,
}

impl ContinentalCompetition {
    /// `teams` in seed order. The league-phase pairing table is the first
    /// `league_phase_matchdays` rounds of a circle-method schedule.
    pub fn new(id: u32, name: &str, teams: Vec<u32>, preferred_matchdays: u16, prizes: PrizeTable) -> Self {
        let format = ContinentalFormat::for_entrants(teams.len(), preferred_matchdays);

        let league_phase: Vec<Vec<Fixture>> = RoundRobin::rounds(&teams)
            .into_iter()
            .take(format.league_phase_matchdays as usize)
            .enumerate()
            .map(|(matchday, pairs)| {
                pairs
                    .into_iter()
                    .enumerate()
                    .map(|(index, (home, away))| {
                        Fixture::new(
                            format!("c{}-md{:02}-{:02}", id, matchday + 1, index + 1),
                            matchday as u16,
                            home,
                            away,
                        )
                    })
                    .collect()
            })
            .collect();

        let prize_money = teams
            .iter()
            .map(|&team| (team, CurrencyValue::new(prizes.participation, Currency::Usd)))
            .collect();

        let mut competition = ContinentalCompetition {
            id,
            name: String::from(name),
            phase: ContinentalPhase::LeaguePhase,
            format,
            table: LeagueTable::new(&teams),
            teams,
            league_phase,
            qualification: None,
            knockout: BTreeMap::new(),
            seeds: Vec::new(),
            reached: BTreeMap::new(),
            champion: None,
            prizes,
            prize_money,
        };

        if competition.teams.len() < 2 {
            competition.phase = ContinentalPhase::Completed;
            competition.champion = competition.teams.first().copied();
        }

        info!(
            "🌍 {} draw: {} teams, {} league-phase matchdays, {} direct / {} playoff places",
            competition.name,
            competition.teams.len(),
            format.league_phase_matchdays,
            format.direct_qualifiers,
            format.playoff_entrants
        );

        competition
    }

    pub fn is_completed(&self) -> bool {
        self.phase == ContinentalPhase::Completed
    }

    pub fn contains(&self, team_id: u32) -> bool {
        self.teams.contains(&team_id)
    }

    fn award(&mut self, team_id: u32, amount: f64) {
        *self
            .prize_money
            .entry(team_id)
            .or_insert_with(CurrencyValue::zero) += amount;
    }

    fn seed_of(&self, team_id: u32) -> usize {
        self.seeds
            .iter()
            .position(|&t| t == team_id)
            .unwrap_or(usize::MAX)
    }

    // ========== LEAGUE PHASE ==========

    pub fn play_league_fixture(&mut self, fixture_id: &str, home_goals: u8, away_goals: u8) -> CompetitionResult<()> {
        if self.phase != ContinentalPhase::LeaguePhase {
            return Err(CompetitionError::out_of_sequence(
                &self.name,
                format!("league-phase result during {}", self.phase.name()),
            ));
        }

        let (matchday, index) = self
            .league_phase
            .iter()
            .enumerate()
            .find_map(|(md, fixtures)| fixtures.iter().position(|f| f.id == fixture_id).map(|i| (md, i)))
            .ok_or_else(|| CompetitionError::UnknownMatch(String::from(fixture_id)))?;

        let earlier_open = self.league_phase[..matchday]
            .iter()
            .flatten()
            .any(|f| !f.is_played());
        if earlier_open {
            return Err(CompetitionError::out_of_sequence(
                &self.name,
                format!("matchday {} released before earlier matchdays finished", matchday + 1),
            ));
        }

        let fixture = &mut self.league_phase[matchday][index];
        if fixture.is_played() {
            return Err(CompetitionError::out_of_sequence(
                &self.name,
                format!("fixture {} already played", fixture_id),
            ));
        }
        fixture.result = Some(FixtureResult::new(home_goals, away_goals));
        let (home, away) = (fixture.home_team_id, fixture.away_team_id);

        self.table.apply_result(home, away, home_goals, away_goals);

        match home_goals.cmp(&away_goals) {
            std::cmp::Ordering::Greater => self.award(home, self.prizes.league_phase_win),
            std::cmp::Ordering::Less => self.award(away, self.prizes.league_phase_win),
            std::cmp::Ordering::Equal => {
                self.award(home, self.prizes.league_phase_draw);
                self.award(away, self.prizes.league_phase_draw);
            }
        }

        if self.league_phase.iter().flatten().all(|f| f.is_played()) {
            self.close_league_phase();
        }

        Ok(())
    }

    fn close_league_phase(&mut self) {
        let ranked = self.table.ranked_team_ids();
        let direct_count = self.format.direct_qualifiers.min(ranked.len());
        let playoff_end = (direct_count + self.format.playoff_entrants).min(ranked.len());

        let snapshot = QualificationSnapshot {
            direct_qualifiers: ranked[..direct_count].to_vec(),
            playoff_entrants: ranked[direct_count..playoff_end].to_vec(),
            eliminated: ranked[playoff_end..].to_vec(),
        };

        info!(
            "📋 {} league phase over: {} through, {} to the playoff, {} out",
            self.name,
            snapshot.direct_qualifiers.len(),
            snapshot.playoff_entrants.len(),
            snapshot.eliminated.len()
        );

        self.seeds = ranked;

        if snapshot.playoff_entrants.is_empty() {
            let entrants = snapshot.direct_qualifiers.clone();
            self.qualification = Some(snapshot);
            self.open_bracket(entrants);
            return;
        }

        // K+1 v K+M, K+2 v K+M-1, ...
        let playoff = &snapshot.playoff_entrants;
        let ties = (0..playoff.len() / 2)
            .map(|i| KnockoutTie::two_legged(playoff[i], playoff[playoff.len() - 1 - i]))
            .collect();

        self.qualification = Some(snapshot);
        self.enter_stage(ContinentalPhase::Playoff, ties);
    }

    // ========== KNOCKOUT ==========

    fn enter_stage(&mut self, phase: ContinentalPhase, ties: Vec<KnockoutTie>) {
        let bonus = self.prizes.stage_bonus;
        for tie in &ties {
            for team in [tie.team_a, tie.team_b] {
                self.reached.insert(team, phase);
                self.award(team, bonus);
            }
        }

        debug!("{}: {} with {} ties", self.name, phase.name(), ties.len());

        self.knockout.insert(phase, ties);
        self.phase = phase;
    }

    /// Seeds 1 v N, 2 v N-1, ... laid out in bracket order so the top seeds
    /// can only meet late.
    fn open_bracket(&mut self, entrants: Vec<u32>) {
        let size = entrants.len();
        let stage = ContinentalPhase::first_bracket_stage(size);

        let ties: Vec<KnockoutTie> = if size == 2 {
            vec![KnockoutTie::single(entrants[0], entrants[1])]
        } else {
            bracket_order(size)
                .chunks(2)
                .map(|pair| KnockoutTie::two_legged(entrants[pair[0] - 1], entrants[pair[1] - 1]))
                .collect()
        };

        self.enter_stage(stage, ties);
    }

    pub fn current_ties(&self) -> &[KnockoutTie] {
        self.knockout.get(&self.phase).map(|t| t.as_slice()).unwrap_or(&[])
    }

    pub fn play_knockout_leg(
        &mut self,
        phase: ContinentalPhase,
        tie_index: usize,
        leg: u8,
        home_goals: u8,
        away_goals: u8,
    ) -> CompetitionResult<Option<TieResolution>> {
        if phase != self.phase {
            return Err(CompetitionError::out_of_sequence(
                &self.name,
                format!("{} leg requested during {}", phase.name(), self.phase.name()),
            ));
        }

        let tie = self
            .knockout
            .get_mut(&phase)
            .and_then(|ties| ties.get_mut(tie_index))
            .ok_or_else(|| CompetitionError::UnknownMatch(format!("{} tie {}", phase.name(), tie_index + 1)))?;

        let resolution = tie.record_leg(&self.name, leg, home_goals, away_goals)?;

        self.advance_if_decided()?;
        Ok(resolution)
    }

    pub fn supply_decider(&mut self, phase: ContinentalPhase, tie_index: usize, winner: u32) -> CompetitionResult<()> {
        if phase != self.phase {
            return Err(CompetitionError::out_of_sequence(
                &self.name,
                format!("decider for {} during {}", phase.name(), self.phase.name()),
            ));
        }

        let tie = self
            .knockout
            .get_mut(&phase)
            .and_then(|ties| ties.get_mut(tie_index))
            .ok_or_else(|| CompetitionError::UnknownMatch(format!("{} tie {}", phase.name(), tie_index + 1)))?;

        tie.supply_decider(&self.name, winner)?;

        info!("⚖️ {}: decider awarded to team {}", self.name, winner);

        self.advance_if_decided()
    }

    /// Ties of the current stage level after every rule, waiting for a decider.
    pub fn awaiting_deciders(&self) -> Vec<(usize, &KnockoutTie)> {
        self.current_ties()
            .iter()
            .enumerate()
            .filter(|(_, tie)| tie.awaiting_decider)
            .collect()
    }

    fn advance_if_decided(&mut self) -> CompetitionResult<()> {
        let decided = !self.current_ties().is_empty() && self.current_ties().iter().all(|t| t.is_decided());
        if decided { self.advance_stage() } else { Ok(()) }
    }

    /// Moves every winner of the current stage into the next one. Partial
    /// advancement is refused.
    pub fn advance_stage(&mut self) -> CompetitionResult<()> {
        if !self.phase.is_knockout() {
            return Err(CompetitionError::out_of_sequence(
                &self.name,
                format!("cannot advance from {}", self.phase.name()),
            ));
        }

        let ties = self.current_ties();

        if let Some(tie) = ties.iter().find(|t| t.awaiting_decider) {
            return Err(tie.unresolved_error(&self.name));
        }

        if ties.iter().any(|t| !t.is_decided()) {
            return Err(CompetitionError::out_of_sequence(
                &self.name,
                format!("{} still has legs to play", self.phase.name()),
            ));
        }

        let winners: Vec<u32> = ties.iter().filter_map(|t| t.winner()).collect();

        match self.phase {
            ContinentalPhase::Playoff => {
                let mut playoff_winners = winners;
                playoff_winners.sort_by_key(|&team| self.seed_of(team));

                let mut entrants = self
                    .qualification
                    .as_ref()
                    .map(|q| q.direct_qualifiers.clone())
                    .unwrap_or_default();
                entrants.extend(playoff_winners);

                self.open_bracket(entrants);
            }
            ContinentalPhase::Final => {
                let champion = winners.first().copied();
                self.champion = champion;
                self.phase = ContinentalPhase::Completed;

                if let Some(champion) = champion {
                    let bonus = self.prizes.title_bonus;
                    self.award(champion, bonus);
                    info!("🏆 {} won by team {}", self.name, champion);
                }
            }
            stage => {
                let next = stage.next();
                let ties = winners
                    .chunks(2)
                    .filter_map(|pair| match *pair {
                        [a, b] => {
                            let (better, worse) = if self.seed_of(a) <= self.seed_of(b) { (a, b) } else { (b, a) };
                            Some(if next == ContinentalPhase::Final {
                                KnockoutTie::single(better, worse)
                            } else {
                                KnockoutTie::two_legged(better, worse)
                            })
                        }
                        _ => None,
                    })
                    .collect();

                self.enter_stage(next, ties);
            }
        }

        Ok(())
    }

    // ========== WEEKLY PLAY ==========

    /// Matches due in the calendar slot (`phase`, `index`).
    pub fn due_in_slot(&self, phase: ContinentalPhase, index: u8) -> Vec<ContinentalDue> {
        if phase != self.phase {
            return Vec::new();
        }

        match phase {
            ContinentalPhase::LeaguePhase => self
                .league_phase
                .get(index as usize)
                .map(|fixtures| {
                    fixtures
                        .iter()
                        .filter(|f| !f.is_played())
                        .map(|f| ContinentalDue {
                            competition_id: self.id,
                            fixture: ContinentalFixtureRef::LeaguePhase {
                                fixture_id: f.id.clone(),
                            },
                            home_team_id: f.home_team_id,
                            away_team_id: f.away_team_id,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            ContinentalPhase::Completed => Vec::new(),
            knockout => self
                .current_ties()
                .iter()
                .enumerate()
                .filter_map(|(tie_index, tie)| {
                    let (leg, home, away) = tie.next_leg()?;
                    (leg == index + 1).then(|| ContinentalDue {
                        competition_id: self.id,
                        fixture: ContinentalFixtureRef::Knockout {
                            phase: knockout,
                            tie_index,
                            leg,
                        },
                        home_team_id: home,
                        away_team_id: away,
                    })
                })
                .collect(),
        }
    }

    pub fn play_due(&mut self, due: &ContinentalDue, home_goals: u8, away_goals: u8) -> CompetitionResult<()> {
        match &due.fixture {
            ContinentalFixtureRef::LeaguePhase { fixture_id } => {
                self.play_league_fixture(fixture_id, home_goals, away_goals)
            }
            ContinentalFixtureRef::Knockout { phase, tie_index, leg } => self
                .play_knockout_leg(*phase, *tie_index, *leg, home_goals, away_goals)
                .map(|_| ()),
        }
    }

    /// Plays the AI matches of the slot. AI ties still level afterwards are
    /// settled with a shootout from the outcome generator; ties involving the
    /// human club are left waiting for `supply_decider`.
    pub fn simulate_week(
        &mut self,
        ctx: &SeasonContext,
        phase: ContinentalPhase,
        index: u8,
        teams: &TeamRegistry,
        runner: &mut MatchRunner<'_>,
    ) -> CompetitionResult<ContinentalResult> {
        let mut result = ContinentalResult::new(self.id);

        let due: Vec<ContinentalDue> = self
            .due_in_slot(phase, index)
            .into_iter()
            .filter(|d| !ctx.involves_human(d.home_team_id, d.away_team_id))
            .collect();

        for item in due {
            let mut request = MatchRequest::new(
                CompetitionKind::Continental,
                self.id,
                item.fixture_id(),
                item.home_team_id,
                item.away_team_id,
            );
            if item.is_final() {
                request = request.neutral();
            }

            let mut played = runner.play(teams, &request)?;
            self.play_due(&item, played.home_score, played.away_score)?;

            if let ContinentalFixtureRef::Knockout { phase, tie_index, .. } = item.fixture {
                let awaiting = self
                    .knockout
                    .get(&phase)
                    .and_then(|ties| ties.get(tie_index))
                    .is_some_and(|tie| tie.awaiting_decider);

                if awaiting {
                    let shootout = runner.shootout(teams, item.home_team_id, item.away_team_id)?;
                    played.shootout = Some(shootout);

                    let winner = match shootout.winner() {
                        Some(Side::Away) => item.away_team_id,
                        _ => item.home_team_id,
                    };
                    self.supply_decider(phase, tie_index, winner)?;
                }
            }

            result.matches.push(played);
        }

        if !result.matches.is_empty() {
            result.champion = self.champion;
        }
        Ok(result)
    }

    // ========== SEASON END ==========

    pub fn finish_for(&self, team_id: u32) -> Option<String> {
        if !self.contains(team_id) {
            return None;
        }

        if self.champion == Some(team_id) {
            return Some(String::from("Winner"));
        }

        match self.reached.get(&team_id) {
            Some(phase) => Some(String::from(phase.name())),
            None => Some(String::from(ContinentalPhase::LeaguePhase.name())),
        }
    }

    pub fn prize_for(&self, team_id: u32) -> Option<&CurrencyValue> {
        self.prize_money.get(&team_id)
    }
}
