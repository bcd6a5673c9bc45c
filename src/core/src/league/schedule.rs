use crate::r#match::MatchEvent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureResult {
    pub home_goals: u8,
    pub away_goals: u8,
    pub events: Vec<MatchEvent>,
}

impl FixtureResult {
    pub fn new(home_goals: u8, away_goals: u8) -> Self {
        FixtureResult {
            home_goals,
            away_goals,
            events: Vec::new(),
        }
    }
}

/// A league fixture. `week` starts out equal to `matchday` and is rewritten into
/// global-week space once the season calendar exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: String,
    pub matchday: u16,
    pub week: u16,
    pub home_team_id: u32,
    pub away_team_id: u32,
    pub result: Option<FixtureResult>,
}

impl Fixture {
    pub fn new(id: String, matchday: u16, home_team_id: u32, away_team_id: u32) -> Self {
        Fixture {
            id,
            matchday,
            week: matchday,
            home_team_id,
            away_team_id,
            result: None,
        }
    }

    pub fn is_played(&self) -> bool {
        self.result.is_some()
    }

    pub fn involves(&self, team_id: u32) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    pub fn opponent(&self, team_id: u32) -> Option<u32> {
        if self.home_team_id == team_id {
            Some(self.away_team_id)
        } else if self.away_team_id == team_id {
            Some(self.home_team_id)
        } else {
            None
        }
    }
}

pub struct RoundRobin;

impl RoundRobin {
    /// Circle-method schedule. Odd team counts get a rest slot; `legs == 2` appends
    /// the mirrored second half with home and away swapped.
    pub fn generate(prefix: &str, teams: &[u32], legs: u8) -> Vec<Fixture> {
        let rounds = Self::rounds(teams);
        let single_leg = rounds.len() as u16;

        let mut fixtures = Vec::with_capacity(rounds.len() * teams.len() / 2 * legs.max(1) as usize);

        for leg in 0..legs.max(1) {
            for (round_index, pairs) in rounds.iter().enumerate() {
                let matchday = leg as u16 * single_leg + round_index as u16;

                for (pair_index, &(first, second)) in pairs.iter().enumerate() {
                    let (home, away) = if leg % 2 == 0 { (first, second) } else { (second, first) };

                    fixtures.push(Fixture::new(
                        format!("{}-{:02}-{:02}", prefix, matchday + 1, pair_index + 1),
                        matchday,
                        home,
                        away,
                    ));
                }
            }
        }

        fixtures
    }

    /// Number of matchdays `generate` would produce.
    pub fn matchday_count(team_count: usize, legs: u8) -> u16 {
        if team_count < 2 {
            return 0;
        }
        let slots = team_count + team_count % 2;
        (slots as u16 - 1) * legs.max(1) as u16
    }

    /// Pairings per round for a single leg.
    pub fn rounds(teams: &[u32]) -> Vec<Vec<(u32, u32)>> {
        if teams.len() < 2 {
            return Vec::new();
        }

        let mut slots: Vec<Option<u32>> = teams.iter().copied().map(Some).collect();
        if slots.len() % 2 == 1 {
            slots.push(None);
        }

        let n = slots.len();
        let mut rounds = Vec::with_capacity(n - 1);

        for round in 0..n - 1 {
            let mut pairs = Vec::with_capacity(n / 2);

            for i in 0..n / 2 {
                if let (Some(a), Some(b)) = (slots[i], slots[n - 1 - i]) {
                    if (round + i) % 2 == 0 {
                        pairs.push((a, b));
                    } else {
                        pairs.push((b, a));
                    }
                }
            }

            rounds.push(pairs);

            // Keep the first slot fixed and rotate the rest clockwise.
            if let Some(last) = slots.pop() {
                slots.insert(1, last);
            }
        }

        rounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_pair_meets_once_per_leg() {
        let teams: Vec<u32> = (1..=6).collect();
        let fixtures = RoundRobin::generate("L", &teams, 1);

        assert_eq!(fixtures.len(), 15);

        let pairs: HashSet<(u32, u32)> = fixtures
            .iter()
            .map(|f| (f.home_team_id.min(f.away_team_id), f.home_team_id.max(f.away_team_id)))
            .collect();
        assert_eq!(pairs.len(), 15);
    }

    #[test]
    fn test_nobody_plays_twice_in_a_matchday() {
        let teams: Vec<u32> = (1..=10).collect();
        let fixtures = RoundRobin::generate("L", &teams, 2);

        for matchday in 0..RoundRobin::matchday_count(10, 2) {
            let mut seen = HashSet::new();
            for fixture in fixtures.iter().filter(|f| f.matchday == matchday) {
                assert!(seen.insert(fixture.home_team_id));
                assert!(seen.insert(fixture.away_team_id));
            }
            assert_eq!(seen.len(), 10);
        }
    }

    #[test]
    fn test_second_leg_mirrors_first() {
        let teams: Vec<u32> = (1..=4).collect();
        let fixtures = RoundRobin::generate("L", &teams, 2);

        let (first, second): (Vec<_>, Vec<_>) = fixtures.iter().partition(|f| f.matchday < 3);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.home_team_id, b.away_team_id);
            assert_eq!(a.away_team_id, b.home_team_id);
        }
    }

    #[test]
    fn test_odd_team_count_rests_one_team() {
        let teams: Vec<u32> = (1..=5).collect();
        let fixtures = RoundRobin::generate("L", &teams, 1);

        assert_eq!(RoundRobin::matchday_count(5, 1), 5);
        assert_eq!(fixtures.len(), 10);
        for matchday in 0..5 {
            assert_eq!(fixtures.iter().filter(|f| f.matchday == matchday).count(), 2);
        }
    }

    #[test]
    fn test_fixture_ids_are_unique() {
        let teams: Vec<u32> = (1..=8).collect();
        let fixtures = RoundRobin::generate("premier", &teams, 2);
        let ids: HashSet<&str> = fixtures.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids.len(), fixtures.len());
    }
}
