use chrono::NaiveDate;
use database::{DatabaseGenerator, DatabaseLoader};
use env_logger::Env;
use log::{info, warn};
use season_core::{
    CapacityAttendanceModel, CompetitionError, DueMatch, MatchContext, MatchRunner, PlayoffMatchRef,
    PlayoffMatchScore, RatingMatchEngine, Season, SeasonContext, SeasonSummary, SeasonTransition, Side,
    TransitionOutput, TransitionStep, WeekStep,
};
use std::env;
use std::time::Instant;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    env_logger::Builder::from_env(Env::default()
        .default_filter_or("info")
    ).init();

    let seasons: u16 = env::var("SEASONS").ok().and_then(|v| v.parse().ok()).unwrap_or(3);
    let human_team: Option<u32> = env::var("HUMAN_TEAM").ok().and_then(|v| v.parse().ok());
    let seed: u64 = env::var("SEED").ok().and_then(|v| v.parse().ok()).unwrap_or(42);

    let started = Instant::now();
    let database = DatabaseLoader::load()?;
    info!("database loaded: {} ms", started.elapsed().as_millis());

    let season_start = NaiveDate::from_ymd_opt(2025, 8, 2).unwrap_or_default();
    let mut setup = DatabaseGenerator::generate(&database, 2025, season_start)?;
    let mut season = setup.build_season()?;

    let mut ctx = SeasonContext::new(setup.year, setup.season_start);
    if let Some(team_id) = human_team {
        ctx = ctx.with_human_team(team_id);
        info!("🎮 managing {}", setup.teams.name(team_id));
    }

    let mut engine = RatingMatchEngine::new(seed);
    let attendance = CapacityAttendanceModel::new();
    let mut runner = MatchRunner::new(&mut engine, &attendance);

    for _ in 0..seasons {
        let started = Instant::now();

        play_season(&mut season, &mut ctx, &mut runner)?;

        let mut transition = SeasonTransition::begin(setup, season, &ctx)?;
        let output = run_transition(&mut transition, &mut runner)?;

        log_summary(&output.summary, &output.setup.teams);
        info!("season simulated: {} ms", started.elapsed().as_millis());

        let TransitionOutput { season: next_season, setup: next_setup, .. } = output;
        season = next_season;
        setup = next_setup;
        ctx = ctx.for_next_season();
    }

    Ok(())
}

/// Week loop. The human club's matches are played with a fixed attacking
/// set-up so the binary can run unattended.
fn play_season(season: &mut Season, ctx: &mut SeasonContext, runner: &mut MatchRunner<'_>) -> color_eyre::Result<()> {
    loop {
        match season.advance_week(ctx, runner) {
            Ok(WeekStep::Advanced(report)) => {
                for champion in &report.champions {
                    info!(
                        "🏆 {} {}: {}",
                        champion.competition,
                        champion.competition_id,
                        season.teams.name(champion.team_id)
                    );
                }
            }
            Ok(WeekStep::AwaitingHumanMatch(due)) => {
                let mut tactics = MatchContext::regulation().with_tactics("4-3-3", "attacking");
                if let DueMatch::Continental(continental) = &due {
                    if continental.is_final() {
                        tactics = tactics.neutral();
                    }
                }

                let outcome = runner.outcome(&season.teams, due.home_team_id(), due.away_team_id(), &tactics)?;
                let shootout = if matches!(due, DueMatch::Cup { .. }) && outcome.is_draw() {
                    Some(runner.shootout(&season.teams, due.home_team_id(), due.away_team_id())?)
                } else {
                    None
                };

                season.apply_human_result(ctx, &due, &outcome, shootout, runner)?;
            }
            Ok(WeekStep::SeasonFinished) => return Ok(()),
            Err(CompetitionError::UnresolvedTie { competition, team_a, team_b }) => {
                let team_id = ctx.human_team_id.unwrap_or(team_a);
                let Some(pending) = season.pending_human_decider(team_id) else {
                    return Err(CompetitionError::UnresolvedTie { competition, team_a, team_b }.into());
                };

                let shootout = runner.shootout(&season.teams, pending.team_a, pending.team_b)?;
                let winner = match shootout.winner() {
                    Some(Side::Away) => pending.team_b,
                    _ => pending.team_a,
                };

                warn!("⚖️ {}: decider taken on penalties, {} goes through", competition, season.teams.name(winner));
                season.supply_continental_decider(pending.competition_id, pending.phase, pending.tie_index, winner)?;
            }
            Err(error) => return Err(error.into()),
        }
    }
}

fn run_transition(transition: &mut SeasonTransition, runner: &mut MatchRunner<'_>) -> color_eyre::Result<TransitionOutput> {
    loop {
        match transition.resume(runner)? {
            TransitionStep::AwaitingHumanMatch(next) => {
                let score = play_human_playoff(transition, runner, &next)?;
                transition.apply_human_result(&next, score)?;
            }
            TransitionStep::Completed(output) => return Ok(*output),
        }
    }
}

fn play_human_playoff(
    transition: &SeasonTransition,
    runner: &mut MatchRunner<'_>,
    next: &PlayoffMatchRef,
) -> color_eyre::Result<PlayoffMatchScore> {
    let teams = transition.teams();
    let tactics = MatchContext::regulation().with_tactics("4-2-3-1", "balanced");

    let regulation = runner.outcome(teams, next.home_team_id, next.away_team_id, &tactics)?;
    let mut score = PlayoffMatchScore::regulation(regulation.home_score, regulation.away_score);

    if regulation.is_draw() {
        let extra = runner.outcome(teams, next.home_team_id, next.away_team_id, &tactics.extra_time())?;
        score = score.with_extra_time(extra.home_score, extra.away_score);

        if extra.is_draw() {
            let shootout = runner.shootout(teams, next.home_team_id, next.away_team_id)?;
            score = score.with_penalties(shootout.home, shootout.away);
        }
    }

    Ok(score)
}

fn log_summary(summary: &SeasonSummary, teams: &season_core::TeamRegistry) {
    for (league_id, team_id) in &summary.league_champions {
        info!("🏆 league {} champion: {}", league_id, teams.name(*team_id));
    }

    if let Some(team_id) = summary.cup_winner {
        info!("🏆 cup winner: {}", teams.name(team_id));
    }

    for (competition_id, team_id) in &summary.continental_winners {
        info!("🏆 continental {} winner: {}", competition_id, teams.name(*team_id));
    }

    info!(
        "season {}: promoted {:?}, relegated {:?}",
        summary.year,
        summary.promoted.iter().map(|id| teams.name(*id)).collect::<Vec<_>>(),
        summary.relegated.iter().map(|id| teams.name(*id)).collect::<Vec<_>>()
    );

    for warning in &summary.warnings {
        warn!("⚠️ {} filled {} of {} places", warning.competition, warning.actual, warning.expected);
    }
}
