use chrono::NaiveDate;
use season_core::continent::{ContinentalCompetition, KnockoutTie, PrizeTable, TieMethod};
use season_core::cup::{CupBracket, CupScore};
use season_core::league::{League, LeagueSettings, RoundRobin};
use season_core::{
    CapacityAttendanceModel, CompetitionError, ContinentalPhase, LeagueDefinition, MatchContext, MatchOutcome,
    MatchOutcomeGenerator, MatchRunner, MatchSquad, RatingMatchEngine, Season, SeasonContext, SeasonSetup,
    SeasonTransition, ShootoutResult, TeamRef, TeamRegistry, TransitionStep, WeekStep,
};
use std::collections::BTreeMap;

fn registry(count: u32) -> TeamRegistry {
    TeamRegistry::new(
        (1..=count)
            .map(|id| TeamRef::new(id, &format!("Team {}", id), &format!("T{}", id), 3000 - id as u16 * 20, 85 - id as u8))
            .collect(),
    )
}

fn season_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 2).unwrap()
}

/// Every match ends 1-1; shootouts go to the home side.
struct LevelEngine;

impl MatchOutcomeGenerator for LevelEngine {
    fn simulate(&mut self, _: &MatchSquad, _: &MatchSquad, _: &MatchContext) -> MatchOutcome {
        MatchOutcome::new(1, 1)
    }

    fn penalty_shootout(&mut self, _: &MatchSquad, _: &MatchSquad) -> ShootoutResult {
        ShootoutResult::new(5, 4)
    }
}

fn play_to_end(season: &mut Season, ctx: &mut SeasonContext, runner: &mut MatchRunner<'_>) -> Vec<WeekStep> {
    let weeks = season.calendar.total_weeks() + 1;
    season.simulate_weeks(ctx, runner, weeks).unwrap()
}

#[test]
fn scenario_a_single_round_robin_of_eighteen() {
    let teams: Vec<u32> = (1..=18).collect();
    let fixtures = RoundRobin::generate("premier", &teams, 1);

    assert_eq!(RoundRobin::matchday_count(18, 1), 17);
    for matchday in 0..17 {
        let count = fixtures.iter().filter(|f| f.matchday == matchday).count();
        assert_eq!(count, 9, "matchday {}", matchday);
    }

    let league = League::new(
        1,
        String::from("Premier"),
        String::from("premier"),
        1,
        1,
        5000,
        LeagueSettings::standard(1),
        vec![teams],
    );
    let mut season = Season::new(2025, registry(18), vec![league], None, Vec::new()).unwrap();

    let mut engine = RatingMatchEngine::new(2025);
    let attendance = CapacityAttendanceModel::new();
    let mut runner = MatchRunner::new(&mut engine, &attendance);
    let mut ctx = SeasonContext::new(2025, season_start());

    play_to_end(&mut season, &mut ctx, &mut runner);

    let table = &season.leagues[0].groups[0].table;
    let scored: u32 = table.rows.iter().map(|r| r.goals_for as u32).sum();
    let conceded: u32 = table.rows.iter().map(|r| r.goals_against as u32).sum();

    assert_eq!(scored, conceded);
    assert_eq!(table.matches_played(), 17 * 9);
    assert!(season.leagues[0].champion().is_some());
}

#[test]
fn scenario_b_cup_of_thirteen() {
    let entrants: Vec<u32> = (1..=13).collect();
    let mut bracket = CupBracket::new(7, "National Cup", &entrants);

    let first = &bracket.rounds[0];
    assert_eq!(first.byes(), 3);
    assert_eq!(first.matches.iter().filter(|m| !m.bye).count(), 5);

    // Away sides win every match.
    while let Some(round) = bracket.active_round() {
        let pending: Vec<usize> = bracket.rounds[round]
            .matches
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.played)
            .map(|(i, _)| i)
            .collect();
        for index in pending {
            bracket.play_match(round, index, CupScore::new(0, 1)).unwrap();
        }
    }

    let champion = bracket.champion().unwrap();
    let unbeaten: Vec<u32> = entrants
        .iter()
        .copied()
        .filter(|&team| {
            !bracket
                .rounds
                .iter()
                .flat_map(|r| r.matches.iter())
                .any(|m| m.loser_id() == Some(team))
        })
        .collect();

    assert_eq!(unbeaten, vec![champion]);
    assert_eq!(bracket.rounds.len(), 4);
}

#[test]
fn scenario_c_away_goal_decides_level_aggregate() {
    let mut tie = KnockoutTie::two_legged(1, 2);

    // team 1 hosts leg 1 and wins 2-1, team 2 hosts leg 2 and wins 1-0
    assert_eq!(tie.record_leg("Elite Cup", 1, 2, 1).unwrap(), None);
    let resolution = tie.record_leg("Elite Cup", 2, 1, 0).unwrap().unwrap();

    assert_eq!(resolution.winner, 2);
    assert_eq!(resolution.method, TieMethod::AwayGoals);
    assert_eq!(tie.loser(), Some(1));
}

#[test]
fn scenario_d_three_way_relegation_with_playoff() {
    let leagues = vec![
        LeagueDefinition {
            id: 1,
            name: String::from("Premier"),
            slug: String::from("premier"),
            country_id: 1,
            tier: 1,
            reputation: 7000,
            settings: LeagueSettings::standard(2).with_relegation(3),
        },
        LeagueDefinition {
            id: 2,
            name: String::from("Championship"),
            slug: String::from("championship"),
            country_id: 1,
            tier: 2,
            reputation: 4000,
            settings: LeagueSettings::standard(2).with_promotion(2).with_playoff(3, 4),
        },
    ];

    let mut memberships = BTreeMap::new();
    memberships.insert(1, vec![(1..=8).collect::<Vec<u32>>()]);
    memberships.insert(2, vec![(9..=18).collect::<Vec<u32>>()]);

    let setup = SeasonSetup::new(2025, season_start(), registry(18), leagues, memberships);
    setup.validate().unwrap();

    let mut season = setup.build_season().unwrap();
    let mut engine = RatingMatchEngine::new(99);
    let attendance = CapacityAttendanceModel::new();
    let mut runner = MatchRunner::new(&mut engine, &attendance);
    let mut ctx = SeasonContext::new(2025, season_start());

    play_to_end(&mut season, &mut ctx, &mut runner);

    let premier_bottom: Vec<u32> = season.leagues[0].overall_order()[5..].to_vec();
    let championship_top: Vec<u32> = season.leagues[1].overall_order()[..2].to_vec();
    let playoff_pool: Vec<u32> = season.leagues[1].overall_order()[2..6].to_vec();

    let mut transition = SeasonTransition::begin(setup, season, &ctx).unwrap();
    let output = match transition.resume(&mut runner).unwrap() {
        TransitionStep::Completed(output) => output,
        other => panic!("expected completion, got {:?}", other),
    };

    let summary = &output.summary;
    assert_eq!(summary.relegated, premier_bottom);
    assert_eq!(summary.promoted.len(), 3);
    assert_eq!(&summary.promoted[..2], &championship_top[..]);
    assert!(playoff_pool.contains(&summary.promoted[2]));

    let premier: Vec<u32> = output.setup.memberships[&1].concat();
    let championship: Vec<u32> = output.setup.memberships[&2].concat();

    assert_eq!(premier.len(), 8);
    assert_eq!(championship.len(), 10);
    for team in &summary.promoted {
        assert!(premier.contains(team));
    }
    for team in &summary.relegated {
        assert!(championship.contains(team));
        assert!(!premier.contains(team));
    }
}

#[test]
fn bulk_and_single_step_simulation_replay_identically() {
    let build = || {
        let teams: Vec<u32> = (1..=10).collect();
        let league = League::new(
            1,
            String::from("Premier"),
            String::from("premier"),
            1,
            1,
            5000,
            LeagueSettings::standard(2),
            vec![teams.clone()],
        );
        let cup = CupBracket::new(2, "National Cup", &teams);
        Season::new(2025, registry(10), vec![league], Some(cup), Vec::new()).unwrap()
    };

    let mut bulk = build();
    let mut engine = RatingMatchEngine::new(17);
    let attendance = CapacityAttendanceModel::new();
    let mut runner = MatchRunner::new(&mut engine, &attendance);
    let mut ctx = SeasonContext::new(2025, season_start());
    play_to_end(&mut bulk, &mut ctx, &mut runner);

    let mut stepped = build();
    let mut engine = RatingMatchEngine::new(17);
    let mut runner = MatchRunner::new(&mut engine, &attendance);
    let mut ctx = SeasonContext::new(2025, season_start());
    while !matches!(stepped.advance_week(&mut ctx, &mut runner).unwrap(), WeekStep::SeasonFinished) {}

    assert_eq!(bulk.leagues, stepped.leagues);
    assert_eq!(bulk.cup, stepped.cup);
}

#[test]
fn split_season_league_produces_a_champion() {
    let teams: Vec<u32> = (1..=8).collect();
    let league = League::new(
        1,
        String::from("Primera"),
        String::from("primera"),
        2,
        1,
        5000,
        LeagueSettings::apertura_clausura(),
        vec![teams],
    );
    let mut season = Season::new(2025, registry(8), vec![league], None, Vec::new()).unwrap();
    assert_eq!(season.calendar.split_final_weeks().len(), 2);

    let mut engine = RatingMatchEngine::new(4);
    let attendance = CapacityAttendanceModel::new();
    let mut runner = MatchRunner::new(&mut engine, &attendance);
    let mut ctx = SeasonContext::new(2025, season_start());

    play_to_end(&mut season, &mut ctx, &mut runner);

    let league = &season.leagues[0];
    assert!(league.is_finished());
    let outcome = league.split_season.as_ref().and_then(|s| s.outcome).unwrap();
    assert_eq!(league.champion(), Some(outcome.winner));
    assert_eq!(league.final_order(0)[0], outcome.winner);
}

#[test]
fn human_level_continental_tie_blocks_until_decider() {
    // four entrants: one direct place, a two-legged playoff between seeds 2 and 3, then the final
    let continental = ContinentalCompetition::new(30, "Elite Cup", vec![1, 2, 3, 4], 1, PrizeTable::default());
    let mut season = Season::new(2025, registry(4), Vec::new(), None, vec![continental]).unwrap();

    let mut engine = LevelEngine;
    let attendance = CapacityAttendanceModel::new();
    let mut runner = MatchRunner::new(&mut engine, &attendance);
    let mut ctx = SeasonContext::new(2025, season_start()).with_human_team(2);

    let mut deciders = Vec::new();

    loop {
        match season.advance_week(&mut ctx, &mut runner) {
            Ok(WeekStep::AwaitingHumanMatch(due)) => {
                season.apply_human_result(&ctx, &due, &MatchOutcome::new(1, 1), None, &runner).unwrap();
            }
            Ok(WeekStep::Advanced(_)) => {}
            Ok(WeekStep::SeasonFinished) => break,
            Err(CompetitionError::UnresolvedTie { team_a, team_b, .. }) => {
                let week = ctx.week;

                // re-entering the week neither replays anything nor lets it close
                assert!(matches!(
                    season.advance_week(&mut ctx, &mut runner),
                    Err(CompetitionError::UnresolvedTie { .. })
                ));
                assert_eq!(ctx.week, week);

                let pending = season.pending_human_decider(2).unwrap();
                assert_eq!((pending.team_a, pending.team_b), (team_a, team_b));
                deciders.push(pending.phase);

                season
                    .supply_continental_decider(pending.competition_id, pending.phase, pending.tie_index, 2)
                    .unwrap();

                assert!(matches!(season.advance_week(&mut ctx, &mut runner).unwrap(), WeekStep::Advanced(_)));
                assert_eq!(ctx.week, week + 1);
            }
            Err(error) => panic!("unexpected error: {:?}", error),
        }
    }

    assert_eq!(deciders, vec![ContinentalPhase::Playoff, ContinentalPhase::Final]);

    let competition = season.continental_competition(30).unwrap();
    assert!(competition.is_completed());
    assert_eq!(competition.champion, Some(2));
}

