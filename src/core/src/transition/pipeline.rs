use crate::context::SeasonContext;
use crate::continent::{Qualification, QualificationInput};
use crate::error::{CompetitionError, CompetitionResult};
use crate::playoff::{PlayoffMatchRef, PlayoffMatchScore, PromotionPlayoffBracket};
use crate::r#match::{PlayedMatch, ShootoutResult};
use crate::season::{MatchRequest, MatchRunner, Season};
use crate::shared::{CompetitionKind, TeamRegistry};
use crate::transition::{Membership, PlayoffWinners, SeasonSetup, SeasonSummary};
use chrono::Duration;
use log::{debug, info};

const COMPETITION: &str = "Season transition";

/// Next season, ready to play, and the recap of the one that ended.
#[derive(Debug, Clone)]
pub struct TransitionOutput {
    pub season: Season,
    pub setup: SeasonSetup,
    pub summary: SeasonSummary,
}

#[derive(Debug, Clone)]
pub enum TransitionStep {
    /// The human club's playoff match must be applied before `resume` can go on.
    AwaitingHumanMatch(PlayoffMatchRef),
    Completed(Box<TransitionOutput>),
}

/// End-of-season reconciliation. Pauses whenever the human club has a
/// promotion-playoff match to play and picks up where it stopped on `resume`.
#[derive(Debug)]
pub struct SeasonTransition {
    setup: SeasonSetup,
    season: Season,
    ctx: SeasonContext,
    playoffs: Vec<PromotionPlayoffBracket>,
    playoff_matches: Vec<PlayedMatch>,
    completed: bool,
}

impl SeasonTransition {
    /// Seeds a playoff bracket for every table that has contested promotion
    /// places. Every league table, the cup and every continental competition
    /// must be complete; only split-season deciders may still be open.
    pub fn begin(setup: SeasonSetup, season: Season, ctx: &SeasonContext) -> CompetitionResult<Self> {
        if let Some(league) = season.leagues.iter().find(|l| !l.groups.iter().all(|g| g.is_finished())) {
            return Err(CompetitionError::out_of_sequence(
                COMPETITION,
                format!("{} has fixtures left", league.name),
            ));
        }

        if let Some(cup) = season.cup.as_ref().filter(|c| !c.is_completed()) {
            return Err(CompetitionError::out_of_sequence(
                COMPETITION,
                format!("{} has rounds left", cup.name),
            ));
        }

        if let Some(competition) = season.continental.iter().find(|c| !c.is_completed()) {
            return Err(CompetitionError::out_of_sequence(
                COMPETITION,
                format!("{} is still being played", competition.name),
            ));
        }

        let mut playoffs = Vec::new();

        for definition in &setup.leagues {
            let Some(playoff) = definition.settings.playoff else {
                continue;
            };
            if setup.league_above(definition).is_none() {
                continue;
            }

            let league = season.league(definition.id)?;
            let multi_group = league.groups.len() > 1;

            for group_index in 0..league.groups.len() {
                let order = league.final_order(group_index);
                let seeds: Vec<u32> = playoff
                    .positions()
                    .filter_map(|position| order.get(position).copied())
                    .collect();

                let group_id = multi_group.then_some(group_index as u8);
                playoffs.push(PromotionPlayoffBracket::new(definition.id, group_id, &seeds)?);
            }
        }

        info!("🔁 season {} transition: {} promotion playoffs", season.year, playoffs.len());

        Ok(SeasonTransition {
            setup,
            season,
            ctx: *ctx,
            playoffs,
            playoff_matches: Vec::new(),
            completed: false,
        })
    }

    pub fn playoffs(&self) -> &[PromotionPlayoffBracket] {
        &self.playoffs
    }

    pub fn teams(&self) -> &TeamRegistry {
        &self.season.teams
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Runs every step that does not need the human club, then either stops at
    /// its next playoff match or completes the transition.
    pub fn resume(&mut self, runner: &mut MatchRunner<'_>) -> CompetitionResult<TransitionStep> {
        if self.completed {
            return Err(CompetitionError::out_of_sequence(COMPETITION, "transition already completed"));
        }

        self.resolve_split_finals(runner)?;

        if let Some(match_ref) = self.resolve_playoffs(runner)? {
            debug!("transition waits for the human club: {:?}", match_ref);
            return Ok(TransitionStep::AwaitingHumanMatch(match_ref));
        }

        let output = self.complete()?;
        self.completed = true;

        Ok(TransitionStep::Completed(Box::new(output)))
    }

    /// Records the human club's playoff match. It must be the next match of its bracket.
    pub fn apply_human_result(&mut self, match_ref: &PlayoffMatchRef, score: PlayoffMatchScore) -> CompetitionResult<u32> {
        if self.completed {
            return Err(CompetitionError::out_of_sequence(COMPETITION, "transition already completed"));
        }

        let bracket = self
            .playoffs
            .iter_mut()
            .find(|b| b.next_match().as_ref() == Some(match_ref))
            .ok_or_else(|| CompetitionError::out_of_sequence(COMPETITION, "playoff match is not due"))?;

        let winner = bracket.play(match_ref.phase, match_ref.index, score)?;

        let (home_extra, away_extra) = score.extra_time.unwrap_or((0, 0));
        let mut played = PlayedMatch::new(
            CompetitionKind::Playoff,
            bracket.league_id,
            format!("playoff-{}-{}-{:?}-{}", bracket.league_id, bracket.group_id.unwrap_or(0), match_ref.phase, match_ref.index + 1),
            match_ref.home_team_id,
            match_ref.away_team_id,
            score.regulation.0 + home_extra,
            score.regulation.1 + away_extra,
        );
        played.extra_time = score.extra_time.is_some();
        played.shootout = score.penalties.map(|(home, away)| ShootoutResult::new(home, away));
        self.playoff_matches.push(played);

        Ok(winner)
    }

    // ========== STEPS ==========

    /// A split-season decider left open is played out with the generator.
    fn resolve_split_finals(&mut self, runner: &mut MatchRunner<'_>) -> CompetitionResult<()> {
        for league in &mut self.season.leagues {
            while let Some((leg, home, away)) = league.pending_split_final() {
                let request = MatchRequest::new(
                    CompetitionKind::SplitSeasonFinal,
                    league.id,
                    format!("{}-final-{}", league.slug, leg),
                    home,
                    away,
                );
                let played = runner.play(&self.season.teams, &request)?;
                league.play_split_final_leg(leg, played.home_score, played.away_score)?;
                self.playoff_matches.push(played);
            }
        }

        Ok(())
    }

    /// Plays every AI playoff match it can, in all brackets, then returns the
    /// human club's next match if one is due.
    fn resolve_playoffs(&mut self, runner: &mut MatchRunner<'_>) -> CompetitionResult<Option<PlayoffMatchRef>> {
        let human = self.ctx.human_team_id;
        let mut human_match = None;

        for bracket in &mut self.playoffs {
            let human_bracket = human.is_some_and(|team| bracket.contains(team));

            if !human_bracket {
                let played = bracket.auto_resolve(&self.season.teams, runner)?;
                self.playoff_matches.extend(played);
                continue;
            }

            while let Some(next) = bracket.next_match() {
                if human.is_some_and(|team| next.involves(team)) {
                    human_match = human_match.or(Some(next));
                    break;
                }
                let played = bracket.simulate_match(next, &self.season.teams, runner)?;
                self.playoff_matches.push(played);
            }
        }

        Ok(human_match)
    }

    fn playoff_winners(&self) -> PlayoffWinners {
        self.playoffs
            .iter()
            .filter_map(|b| {
                let group_index = b.group_id.map(|g| g as usize).unwrap_or(0);
                b.winner.map(|winner| ((b.league_id, group_index), winner))
            })
            .collect()
    }

    /// Membership deltas, new groups, qualification, then the next season's engines.
    fn complete(&self) -> CompetitionResult<TransitionOutput> {
        let deltas = Membership::deltas(&self.setup, &self.season, &self.playoff_winners())?;
        let memberships = Membership::apply(&self.setup, &self.season, &deltas)?;

        let cup_winner = self.season.cup.as_ref().and_then(|c| c.champion()).and_then(|team| {
            self.season.league_of(team).map(|league| (team, league.id))
        });

        let input = QualificationInput {
            league_orders: self
                .season
                .leagues
                .iter()
                .map(|l| (l.id, l.overall_order()))
                .collect(),
            cup_winner,
        };

        let qualification = Qualification::allocate(
            &self.setup.continental,
            &self.setup.slots,
            self.setup.cup_winner_slot,
            &input,
            &self.setup.teams,
        );

        let summary = SeasonSummary::build(&self.season, &deltas, &qualification, self.playoff_matches.clone());

        let mut setup = self.setup.clone();
        setup.year = self.setup.year + 1;
        setup.season_start = self.setup.season_start + Duration::weeks(52);
        setup.memberships = memberships;
        setup.continental_entrants = qualification.entrants;

        let season = setup.build_season()?;

        info!(
            "✅ season {} closed: {} promoted, {} relegated, {} warnings",
            self.season.year,
            summary.promoted.len(),
            summary.relegated.len(),
            summary.warnings.len()
        );

        Ok(TransitionOutput { season, setup, summary })
    }
}
