use crate::r#match::{
    MatchContext, MatchEvent, MatchEventKind, MatchOutcome, MatchOutcomeGenerator, MatchPeriod,
    MatchSquad, MatchStats, ShootoutResult, Side,
};
use itertools::Itertools;
use log::debug;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

const BASE_EXPECTED_GOALS: f64 = 1.30;
const HOME_ADVANTAGE: f64 = 0.25;
const MAX_GOALS: u8 = 9;
const PENALTY_CONVERSION: f64 = 0.75;
const SUDDEN_DEATH_LIMIT: u8 = 30;

/// Seeded rating-weighted goal model. Two engines built with the same seed and
/// fed the same fixtures in the same order produce identical outcomes.
#[derive(Debug)]
pub struct RatingMatchEngine {
    rng: StdRng,
}

impl RatingMatchEngine {
    pub fn new(seed: u64) -> Self {
        RatingMatchEngine {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    // ========== GOAL MODEL ==========

    fn expected_goals(&self, attack: &MatchSquad, defence: &MatchSquad, ctx: &MatchContext, side: Side) -> f64 {
        let strength = (attack.overall as f64 - defence.overall as f64) / 20.0;
        let mut xg = BASE_EXPECTED_GOALS * strength.exp();

        if side == Side::Home && !ctx.neutral_venue {
            xg += HOME_ADVANTAGE * ctx.attendance_factor.clamp(0.0, 1.5) as f64;
        }

        if side == Side::Home {
            xg *= ctx.morale as f64;
        }

        xg *= 0.85 + 0.15 * ctx.pitch_condition.clamp(0.0, 1.0) as f64;

        if ctx.period == MatchPeriod::ExtraTime {
            xg /= 3.0;
        }

        xg.clamp(0.05, 5.0)
    }

    /// Knuth's method; fine for the small means used here.
    fn poisson(&mut self, lambda: f64) -> u8 {
        let limit = (-lambda).exp();
        let mut product = 1.0;
        let mut goals = 0u8;

        loop {
            product *= self.rng.random::<f64>();
            if product <= limit || goals >= MAX_GOALS {
                return goals;
            }
            goals += 1;
        }
    }

    // ========== TIMELINE ==========

    fn minute(&mut self, period: MatchPeriod) -> u8 {
        match period {
            MatchPeriod::Regulation => self.rng.random_range(1..=90),
            MatchPeriod::ExtraTime => self.rng.random_range(91..=120),
        }
    }

    fn player(&mut self, squad: &MatchSquad) -> u8 {
        if squad.shirt_numbers.is_empty() {
            return 0;
        }
        let index = self.rng.random_range(0..squad.shirt_numbers.len());
        squad.shirt_numbers[index]
    }

    fn side_events(&mut self, squad: &MatchSquad, side: Side, goals: u8, period: MatchPeriod) -> Vec<MatchEvent> {
        let mut events = Vec::new();

        for _ in 0..goals {
            let minute = self.minute(period);
            let player = self.player(squad);
            events.push(MatchEvent::new(minute, MatchEventKind::Goal, side, player));
        }

        let yellow_cards = self.rng.random_range(0..4u8);
        for _ in 0..yellow_cards {
            let minute = self.minute(period);
            let player = self.player(squad);
            events.push(MatchEvent::new(minute, MatchEventKind::YellowCard, side, player));
        }

        if self.rng.random::<f32>() < 0.05 {
            let minute = self.minute(period);
            let player = self.player(squad);
            events.push(MatchEvent::new(minute, MatchEventKind::RedCard, side, player));
        }

        if self.rng.random::<f32>() < 0.10 {
            let minute = self.minute(period);
            let player = self.player(squad);
            events.push(MatchEvent::new(minute, MatchEventKind::Injury, side, player));
        }

        events
    }

    fn stats(&mut self, home: &MatchSquad, away: &MatchSquad, home_goals: u8, away_goals: u8) -> MatchStats {
        let home_on_target = home_goals.saturating_add(self.rng.random_range(0..5u8));
        let away_on_target = away_goals.saturating_add(self.rng.random_range(0..5u8));
        let possession = 50i16 + (home.overall as i16 - away.overall as i16) / 2;

        MatchStats {
            home_shots: home_on_target.saturating_add(self.rng.random_range(2..9u8)),
            away_shots: away_on_target.saturating_add(self.rng.random_range(2..9u8)),
            home_shots_on_target: home_on_target,
            away_shots_on_target: away_on_target,
            home_possession: possession.clamp(25, 75) as u8,
        }
    }

    fn kick(&mut self) -> bool {
        self.rng.random::<f64>() < PENALTY_CONVERSION
    }
}

impl MatchOutcomeGenerator for RatingMatchEngine {
    fn simulate(&mut self, home: &MatchSquad, away: &MatchSquad, ctx: &MatchContext) -> MatchOutcome {
        let home_xg = self.expected_goals(home, away, ctx, Side::Home);
        let away_xg = self.expected_goals(away, home, ctx, Side::Away);

        let home_score = self.poisson(home_xg);
        let away_score = self.poisson(away_xg);

        let home_squad = home.clone().with_lineup(ctx.lineup_overrides.clone());

        let mut events = self.side_events(&home_squad, Side::Home, home_score, ctx.period);
        events.extend(self.side_events(away, Side::Away, away_score, ctx.period));

        let timeline = events.into_iter().sorted_by_key(|event| event.minute).collect();
        let stats = self.stats(home, away, home_score, away_score);

        debug!(
            "match simulated: {} {} - {} {} ({:?})",
            home.team_name, home_score, away_score, away.team_name, ctx.period
        );

        MatchOutcome {
            home_score,
            away_score,
            timeline,
            stats,
        }
    }

    fn penalty_shootout(&mut self, home: &MatchSquad, away: &MatchSquad) -> ShootoutResult {
        let mut home_goals = 0u8;
        let mut away_goals = 0u8;

        for _ in 0..5 {
            if self.kick() {
                home_goals += 1;
            }
            if self.kick() {
                away_goals += 1;
            }
        }

        let mut rounds = 0;
        while home_goals == away_goals {
            let home_scores = self.kick();
            let away_scores = self.kick();

            if home_scores {
                home_goals += 1;
            }
            if away_scores {
                away_goals += 1;
            }

            rounds += 1;
            if rounds >= SUDDEN_DEATH_LIMIT && home_goals == away_goals {
                // Coin toss after an absurdly long shootout.
                if self.rng.random_bool(0.5) {
                    home_goals += 1;
                } else {
                    away_goals += 1;
                }
            }
        }

        debug!(
            "penalties: {} {} - {} {}",
            home.team_name, home_goals, away_goals, away.team_name
        );

        ShootoutResult::new(home_goals, away_goals)
    }
}
