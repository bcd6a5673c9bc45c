use crate::calendar::{Calendar, CalendarBuilder, CompetitionFootprint, ContinentalFootprint, WeekSlot};
use crate::context::SeasonContext;
use crate::continent::{ContinentalCompetition, ContinentalPhase};
use crate::cup::{CupBracket, CupScore};
use crate::error::{CompetitionError, CompetitionResult};
use crate::league::{FixtureResult, League};
use crate::r#match::{MatchOutcome, MatchSquad, PlayedMatch, ShootoutResult};
use crate::season::{DueMatch, DueMatches, MatchRequest, MatchRunner, WeekReport, WeekStep};
use crate::shared::{CompetitionKind, TeamRegistry};
use log::{debug, info};
use std::collections::BTreeSet;

/// A level continental tie of the human club, waiting for `supply_continental_decider`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDecider {
    pub competition_id: u32,
    pub phase: ContinentalPhase,
    pub tie_index: usize,
    pub team_a: u32,
    pub team_b: u32,
}

/// Every engine of one season plus the calendar that interleaves them.
#[derive(Debug, Clone)]
pub struct Season {
    pub year: u16,
    pub calendar: Calendar,
    pub teams: TeamRegistry,
    pub leagues: Vec<League>,
    pub cup: Option<CupBracket>,
    pub continental: Vec<ContinentalCompetition>,
    pub friendlies: Vec<PlayedMatch>,
    open_report: Option<WeekReport>,
    reported_champions: BTreeSet<(CompetitionKind, u32)>,
}

impl Season {
    pub fn new(
        year: u16,
        teams: TeamRegistry,
        mut leagues: Vec<League>,
        cup: Option<CupBracket>,
        continental: Vec<ContinentalCompetition>,
    ) -> CompetitionResult<Self> {
        let footprint = Self::footprint(&leagues, cup.as_ref(), &continental);
        let league_matchdays = leagues.iter().map(|l| l.matchday_count()).max().unwrap_or(0);

        let calendar = CalendarBuilder::build(league_matchdays, &footprint)?;

        for league in &mut leagues {
            league.apply_calendar(&calendar)?;
        }

        info!(
            "📅 season {}: {} weeks, {} leagues, {} continental competitions",
            year,
            calendar.total_weeks(),
            leagues.len(),
            continental.len()
        );

        Ok(Season {
            year,
            calendar,
            teams,
            leagues,
            cup,
            continental,
            friendlies: Vec::new(),
            open_report: None,
            reported_champions: BTreeSet::new(),
        })
    }

    /// What besides the league needs weeks: the union of every continental
    /// competition's stages, the cup's rounds and a split-season final.
    pub fn footprint(
        leagues: &[League],
        cup: Option<&CupBracket>,
        continental: &[ContinentalCompetition],
    ) -> CompetitionFootprint {
        let active: Vec<&ContinentalCompetition> = continental.iter().filter(|c| !c.is_completed()).collect();

        let continental = if active.is_empty() {
            None
        } else {
            let knockout_phases: BTreeSet<ContinentalPhase> = active
                .iter()
                .flat_map(|c| c.format.knockout_phases())
                .collect();

            Some(ContinentalFootprint {
                league_phase_matchdays: active
                    .iter()
                    .map(|c| c.format.league_phase_matchdays)
                    .max()
                    .unwrap_or(0),
                knockout_phases: knockout_phases.into_iter().collect(),
            })
        };

        CompetitionFootprint {
            continental,
            cup_round_count: cup.filter(|c| !c.is_completed()).map(|c| c.total_rounds as u8).unwrap_or(0),
            split_season_final: leagues.iter().any(|l| l.split_season.is_some()),
        }
    }

    // ========== LOOKUP ==========

    pub fn league(&self, league_id: u32) -> CompetitionResult<&League> {
        self.leagues
            .iter()
            .find(|l| l.id == league_id)
            .ok_or_else(|| CompetitionError::invalid_configuration(format!("unknown league {}", league_id)))
    }

    fn league_mut(&mut self, league_id: u32) -> CompetitionResult<&mut League> {
        self.leagues
            .iter_mut()
            .find(|l| l.id == league_id)
            .ok_or_else(|| CompetitionError::invalid_configuration(format!("unknown league {}", league_id)))
    }

    pub fn league_of(&self, team_id: u32) -> Option<&League> {
        self.leagues.iter().find(|l| l.contains(team_id))
    }

    pub fn continental_competition(&self, competition_id: u32) -> CompetitionResult<&ContinentalCompetition> {
        self.continental
            .iter()
            .find(|c| c.id == competition_id)
            .ok_or_else(|| CompetitionError::invalid_configuration(format!("unknown competition {}", competition_id)))
    }

    fn continental_mut(&mut self, competition_id: u32) -> CompetitionResult<&mut ContinentalCompetition> {
        self.continental
            .iter_mut()
            .find(|c| c.id == competition_id)
            .ok_or_else(|| CompetitionError::invalid_configuration(format!("unknown competition {}", competition_id)))
    }

    fn cup_mut(&mut self, cup_id: u32) -> CompetitionResult<&mut CupBracket> {
        self.cup
            .as_mut()
            .filter(|c| c.id == cup_id)
            .ok_or_else(|| CompetitionError::invalid_configuration(format!("unknown cup {}", cup_id)))
    }

    pub fn is_finished(&self, ctx: &SeasonContext) -> bool {
        ctx.week >= self.calendar.total_weeks()
    }

    // ========== WEEKLY PLAY ==========

    /// Plays every AI match of the current week. The week only closes once the
    /// human club's due match has been applied; calling again before that plays
    /// nothing twice.
    pub fn advance_week(&mut self, ctx: &mut SeasonContext, runner: &mut MatchRunner<'_>) -> CompetitionResult<WeekStep> {
        if self.is_finished(ctx) {
            return Ok(WeekStep::SeasonFinished);
        }

        let week = ctx.week;
        let mut report = self.take_report(ctx);

        let played = self.play_week(ctx, runner, &mut report);
        self.report_champions(&mut report);

        if let Err(error) = played {
            self.open_report = Some(report);
            return Err(error);
        }

        if let Some(team_id) = ctx.human_team_id {
            if let Some(due) = self.due_matches(week, team_id).first().cloned() {
                debug!("week {} waits for the human club: {:?}", week, due);
                self.open_report = Some(report);
                return Ok(WeekStep::AwaitingHumanMatch(due));
            }

            if let Some(pending) = self.pending_human_decider(team_id) {
                self.open_report = Some(report);
                return Err(CompetitionError::UnresolvedTie {
                    competition: self.continental_competition(pending.competition_id)?.name.clone(),
                    team_a: pending.team_a,
                    team_b: pending.team_b,
                });
            }
        }

        debug!("week {} closed with {} matches", week, report.matches.len());

        ctx.next_week();
        Ok(WeekStep::Advanced(report))
    }

    /// Bounded loop over `advance_week`; stops early when the human club is needed
    /// or the season ends.
    pub fn simulate_weeks(
        &mut self,
        ctx: &mut SeasonContext,
        runner: &mut MatchRunner<'_>,
        weeks: u16,
    ) -> CompetitionResult<Vec<WeekStep>> {
        let mut steps = Vec::new();

        for _ in 0..weeks {
            let step = self.advance_week(ctx, runner)?;
            let advanced = matches!(step, WeekStep::Advanced(_));
            steps.push(step);

            if !advanced {
                break;
            }
        }

        Ok(steps)
    }

    fn take_report(&mut self, ctx: &SeasonContext) -> WeekReport {
        self.open_report
            .take()
            .filter(|r| r.week == ctx.week)
            .unwrap_or_else(|| WeekReport::new(ctx.week, ctx.date()))
    }

    fn play_week(&mut self, ctx: &SeasonContext, runner: &mut MatchRunner<'_>, report: &mut WeekReport) -> CompetitionResult<()> {
        let Some(slot) = self.calendar.slot(ctx.week) else {
            return Ok(());
        };

        match slot {
            WeekSlot::League { .. } => {
                for league in &mut self.leagues {
                    let result = league.simulate_week(ctx, &self.teams, runner)?;
                    report.matches.extend(result.matches);
                }
            }
            WeekSlot::Cup { round } => {
                if let Some(cup) = self.cup.as_mut() {
                    let result = cup.simulate_round(ctx, round as usize, &self.teams, runner)?;
                    report.matches.extend(result.matches);
                }
            }
            WeekSlot::Continental { phase, index } => {
                for competition in &mut self.continental {
                    let result = competition.simulate_week(ctx, phase, index, &self.teams, runner)?;
                    report.matches.extend(result.matches);
                }
            }
            WeekSlot::SplitSeasonFinal { leg } => {
                for league in &mut self.leagues {
                    let result = league.simulate_split_final(ctx, leg, &self.teams, runner)?;
                    report.matches.extend(result.matches);
                }
            }
        }

        Ok(())
    }

    /// Adds each champion decided since the last report, once.
    fn report_champions(&mut self, report: &mut WeekReport) {
        let mut decided: Vec<(CompetitionKind, u32, u32)> = Vec::new();

        for league in &self.leagues {
            if let Some(team_id) = league.champion() {
                decided.push((CompetitionKind::League, league.id, team_id));
            }
        }
        if let Some(cup) = &self.cup {
            if let Some(team_id) = cup.champion() {
                decided.push((CompetitionKind::Cup, cup.id, team_id));
            }
        }
        for competition in &self.continental {
            if let Some(team_id) = competition.champion {
                decided.push((CompetitionKind::Continental, competition.id, team_id));
            }
        }

        for (kind, competition_id, team_id) in decided {
            if self.reported_champions.insert((kind, competition_id)) {
                info!("🏆 {} {} won by team {}", kind, competition_id, team_id);
                report.champion(kind, competition_id, Some(team_id));
            }
        }
    }

    // ========== HUMAN CLUB ==========

    /// The team's unplayed matches scheduled in `week`.
    pub fn due_matches(&self, week: u16, team_id: u32) -> DueMatches {
        let mut due = DueMatches::default();

        let Some(slot) = self.calendar.slot(week) else {
            return due;
        };

        match slot {
            WeekSlot::League { .. } => {
                due.league = self.league_of(team_id).and_then(|league| {
                    league.due_fixture(week, team_id).map(|f| DueMatch::League {
                        league_id: league.id,
                        fixture_id: f.id.clone(),
                        home_team_id: f.home_team_id,
                        away_team_id: f.away_team_id,
                    })
                });
            }
            WeekSlot::Cup { round } => {
                due.cup = self.cup.as_ref().and_then(|cup| {
                    if cup.active_round() != Some(round as usize) {
                        return None;
                    }
                    let (index, cup_match) = cup.pending_match_for(team_id)?;
                    Some(DueMatch::Cup {
                        cup_id: cup.id,
                        round: round as usize,
                        index,
                        home_team_id: cup_match.home_team_id?,
                        away_team_id: cup_match.away_team_id?,
                    })
                });
            }
            WeekSlot::Continental { phase, index } => {
                due.continental = self
                    .continental
                    .iter()
                    .flat_map(|c| c.due_in_slot(phase, index))
                    .find(|d| d.involves(team_id))
                    .map(DueMatch::Continental);
            }
            WeekSlot::SplitSeasonFinal { leg } => {
                due.league = self.league_of(team_id).and_then(|league| {
                    let (next_leg, home, away) = league.pending_split_final()?;
                    (next_leg == leg && (home == team_id || away == team_id)).then_some(DueMatch::SplitSeasonFinal {
                        league_id: league.id,
                        leg,
                        home_team_id: home,
                        away_team_id: away,
                    })
                });
            }
        }

        due
    }

    /// Records the outcome of the human club's due match. Cup matches that end
    /// level need the shootout.
    pub fn apply_human_result(
        &mut self,
        ctx: &SeasonContext,
        due: &DueMatch,
        outcome: &MatchOutcome,
        shootout: Option<ShootoutResult>,
        runner: &MatchRunner<'_>,
    ) -> CompetitionResult<PlayedMatch> {
        let current = self.due_matches(ctx.week, due.home_team_id());
        let is_due = [&current.league, &current.cup, &current.continental]
            .into_iter()
            .any(|m| m.as_ref() == Some(due));

        if !is_due {
            return Err(CompetitionError::out_of_sequence(
                due.competition().to_string(),
                format!("match {} v {} is not due in week {}", due.home_team_id(), due.away_team_id(), ctx.week),
            ));
        }

        let (hg, ag) = (outcome.home_score, outcome.away_score);

        let request = match due {
            DueMatch::League { league_id, fixture_id, home_team_id, away_team_id } => {
                let mut result = FixtureResult::new(hg, ag);
                result.events = outcome.timeline.clone();
                self.league_mut(*league_id)?.play_fixture(fixture_id, result)?;

                MatchRequest::new(CompetitionKind::League, *league_id, fixture_id.clone(), *home_team_id, *away_team_id)
            }
            DueMatch::Cup { cup_id, round, index, home_team_id, away_team_id } => {
                let mut score = CupScore::new(hg, ag);
                score.shootout_winner = shootout.and_then(|s| s.winner());
                self.cup_mut(*cup_id)?.play_match(*round, *index, score)?;

                MatchRequest::new(
                    CompetitionKind::Cup,
                    *cup_id,
                    format!("cup-{}-r{}-m{}", cup_id, round + 1, index + 1),
                    *home_team_id,
                    *away_team_id,
                )
            }
            DueMatch::Continental(continental) => {
                self.continental_mut(continental.competition_id)?.play_due(continental, hg, ag)?;

                let request = MatchRequest::new(
                    CompetitionKind::Continental,
                    continental.competition_id,
                    continental.fixture_id(),
                    continental.home_team_id,
                    continental.away_team_id,
                );
                if continental.is_final() { request.neutral() } else { request }
            }
            DueMatch::SplitSeasonFinal { league_id, leg, home_team_id, away_team_id } => {
                let league = self.league_mut(*league_id)?;
                league.play_split_final_leg(*leg, hg, ag)?;

                MatchRequest::new(
                    CompetitionKind::SplitSeasonFinal,
                    *league_id,
                    format!("{}-final-{}", league.slug, leg),
                    *home_team_id,
                    *away_team_id,
                )
            }
        };

        let mut played = PlayedMatch::new(
            request.competition,
            request.competition_id,
            request.fixture_id.clone(),
            request.home_team_id,
            request.away_team_id,
            hg,
            ag,
        );
        played.events = outcome.timeline.clone();
        played.shootout = shootout.filter(|_| matches!(due, DueMatch::Cup { .. }));
        played.attendance = runner.attendance_for(&self.teams, &request)?;

        info!("🎮 human match: {} {}-{} {}", self.teams.name(played.home_team_id), hg, ag, self.teams.name(played.away_team_id));

        let mut report = self.take_report(ctx);
        report.matches.push(played.clone());
        self.report_champions(&mut report);
        self.open_report = Some(report);

        Ok(played)
    }

    pub fn pending_human_decider(&self, team_id: u32) -> Option<PendingDecider> {
        self.continental.iter().find_map(|competition| {
            competition
                .awaiting_deciders()
                .into_iter()
                .find(|(_, tie)| tie.involves(team_id))
                .map(|(tie_index, tie)| PendingDecider {
                    competition_id: competition.id,
                    phase: competition.phase,
                    tie_index,
                    team_a: tie.team_a,
                    team_b: tie.team_b,
                })
        })
    }

    /// Settles a level continental tie with an externally chosen winner.
    pub fn supply_continental_decider(&mut self, competition_id: u32, phase: ContinentalPhase, tie_index: usize, winner: u32) -> CompetitionResult<()> {
        self.continental_mut(competition_id)?.supply_decider(phase, tie_index, winner)?;

        if let Some(mut report) = self.open_report.take() {
            self.report_champions(&mut report);
            self.open_report = Some(report);
        }

        Ok(())
    }

    // ========== FRIENDLIES ==========

    /// Friendly against an opponent without a registered roster. No table is touched.
    pub fn play_friendly(&mut self, team_id: u32, opponent: &MatchSquad, runner: &mut MatchRunner<'_>) -> CompetitionResult<PlayedMatch> {
        let home = MatchSquad::from_team(self.teams.get(team_id)?);
        let played = runner.play_synthetic(&home, opponent);

        debug!("friendly: {} {}-{} {}", home.team_name, played.home_score, played.away_score, opponent.team_name);

        self.friendlies.push(played.clone());
        Ok(played)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continent::PrizeTable;
    use crate::league::LeagueSettings;
    use crate::r#match::{CapacityAttendanceModel, RatingMatchEngine};
    use crate::shared::TeamRef;
    use chrono::NaiveDate;

    fn registry(count: u32) -> TeamRegistry {
        TeamRegistry::new(
            (1..=count)
                .map(|id| TeamRef::new(id, &format!("Team {}", id), &format!("T{}", id), 1000 + id as u16 * 10, 60 + (id % 20) as u8))
                .collect(),
        )
    }

    fn league(teams: Vec<u32>) -> League {
        League::new(1, String::from("Premier"), String::from("premier"), 1, 1, 5000, LeagueSettings::standard(2), vec![teams])
    }

    fn ctx() -> SeasonContext {
        SeasonContext::new(2025, NaiveDate::from_ymd_opt(2025, 8, 2).unwrap())
    }

    fn full_season() -> Season {
        let teams: Vec<u32> = (1..=8).collect();
        let cup = CupBracket::new(10, "National Cup", &teams);
        let continental = ContinentalCompetition::new(20, "Elite Cup", (1..=6).collect(), 4, PrizeTable::default());
        Season::new(2025, registry(8), vec![league(teams)], Some(cup), vec![continental]).unwrap()
    }

    #[test]
    fn test_footprint_collects_every_competition() {
        let season = full_season();
        let footprint = Season::footprint(&season.leagues, season.cup.as_ref(), &season.continental);

        assert_eq!(footprint.cup_round_count, 3);
        assert!(!footprint.split_season_final);
        let continental = footprint.continental.unwrap();
        assert_eq!(continental.league_phase_matchdays, 4);
        assert!(continental.knockout_phases.contains(&ContinentalPhase::Final));
    }

    #[test]
    fn test_whole_season_completes_without_human() {
        let mut season = full_season();
        let mut ctx = ctx();
        let mut engine = RatingMatchEngine::new(7);
        let attendance = CapacityAttendanceModel::new();
        let mut runner = MatchRunner::new(&mut engine, &attendance);

        let weeks = season.calendar.total_weeks();
        let steps = season.simulate_weeks(&mut ctx, &mut runner, weeks + 5).unwrap();

        assert!(matches!(steps.last(), Some(WeekStep::SeasonFinished)));
        assert!(season.leagues[0].is_finished());
        assert!(season.cup.as_ref().unwrap().is_completed());
        assert!(season.continental[0].is_completed());

        let champions: usize = steps
            .iter()
            .filter_map(|s| match s {
                WeekStep::Advanced(report) => Some(report.champions.len()),
                _ => None,
            })
            .sum();
        assert_eq!(champions, 3);
    }

    #[test]
    fn test_human_match_blocks_week_until_applied() {
        let mut season = full_season();
        let mut ctx = ctx().with_human_team(1);
        let mut engine = RatingMatchEngine::new(3);
        let attendance = CapacityAttendanceModel::new();
        let mut runner = MatchRunner::new(&mut engine, &attendance);

        assert!(matches!(season.calendar.slot(0), Some(WeekSlot::League { matchday: 0 })));
        let week = ctx.week;

        let due = match season.advance_week(&mut ctx, &mut runner).unwrap() {
            WeekStep::AwaitingHumanMatch(due) => due,
            other => panic!("expected the human match, got {:?}", other),
        };
        assert_eq!(ctx.week, week);

        let played_before = season.leagues[0].fixtures_in_week(week).filter(|f| f.is_played()).count();
        assert!(matches!(season.advance_week(&mut ctx, &mut runner).unwrap(), WeekStep::AwaitingHumanMatch(_)));
        let played_again = season.leagues[0].fixtures_in_week(week).filter(|f| f.is_played()).count();
        assert_eq!(played_before, played_again);

        let outcome = MatchOutcome::new(2, 0);
        let played = season.apply_human_result(&ctx, &due, &outcome, None, &runner).unwrap();
        assert!(played.involves(1));

        assert!(matches!(
            season.apply_human_result(&ctx, &due, &outcome, None, &runner),
            Err(CompetitionError::OutOfSequence { .. })
        ));

        match season.advance_week(&mut ctx, &mut runner).unwrap() {
            WeekStep::Advanced(report) => {
                assert_eq!(report.week, week);
                assert!(report.matches.iter().any(|m| m.involves(1)));
                assert_eq!(report.matches.len(), 4);
            }
            other => panic!("expected the week to close, got {:?}", other),
        }
        assert_eq!(ctx.week, week + 1);
    }

    #[test]
    fn test_friendly_does_not_touch_tables() {
        let mut season = full_season();
        let mut engine = RatingMatchEngine::new(1);
        let attendance = CapacityAttendanceModel::new();
        let mut runner = MatchRunner::new(&mut engine, &attendance);

        let opponent = MatchSquad::synthetic("Touring XI", 55);
        let played = season.play_friendly(3, &opponent, &mut runner).unwrap();

        assert_eq!(played.competition, CompetitionKind::Friendly);
        assert_eq!(season.friendlies.len(), 1);
        assert_eq!(season.leagues[0].groups[0].table.matches_played(), 0);
    }

    #[test]
    fn test_unknown_team_friendly_is_rejected() {
        let mut season = full_season();
        let mut engine = RatingMatchEngine::new(1);
        let attendance = CapacityAttendanceModel::new();
        let mut runner = MatchRunner::new(&mut engine, &attendance);

        let opponent = MatchSquad::synthetic("Touring XI", 55);
        assert_eq!(
            season.play_friendly(99, &opponent, &mut runner),
            Err(CompetitionError::UnknownTeam(99))
        );
    }
}
