use crate::calendar::{remap_fixtures, Calendar, Week};
use crate::context::SeasonContext;
use crate::error::{CompetitionError, CompetitionResult};
use crate::league::{
    AperturaClausuraSeason, Fixture, FixtureResult, LeagueResult, LeagueSettings, LeagueTable,
    RoundRobin, SeasonHalf, SplitSeasonOutcome,
};
use crate::r#match::PlayedMatch;
use crate::season::{MatchRequest, MatchRunner};
use crate::shared::{CompetitionKind, TeamRegistry};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// One table of a league. Most leagues have exactly one; group-organized lower
/// divisions have several that share a calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueGroup {
    pub id: u8,
    pub teams: Vec<u32>,
    pub fixtures: Vec<Fixture>,
    pub table: LeagueTable,
}

impl LeagueGroup {
    pub fn new(id: u8, prefix: &str, teams: Vec<u32>, legs: u8) -> Self {
        let fixtures = RoundRobin::generate(prefix, &teams, legs);
        let table = LeagueTable::new(&teams);

        LeagueGroup {
            id,
            teams,
            fixtures,
            table,
        }
    }

    pub fn contains(&self, team_id: u32) -> bool {
        self.teams.contains(&team_id)
    }

    pub fn is_finished(&self) -> bool {
        self.fixtures.iter().all(|f| f.is_played())
    }

    pub fn matchday_count(&self) -> u16 {
        self.fixtures.iter().map(|f| f.matchday + 1).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub id: u32,
    pub name: String,
    pub slug: String,
    pub country_id: u32,
    pub tier: u8,
    pub reputation: u16,
    pub settings: LeagueSettings,
    pub groups: Vec<LeagueGroup>,
    pub split_season: Option<AperturaClausuraSeason>,
}

impl League {
    pub fn new(
        id: u32,
        name: String,
        slug: String,
        country_id: u32,
        tier: u8,
        reputation: u16,
        settings: LeagueSettings,
        groups: Vec<Vec<u32>>,
    ) -> Self {
        let multi_group = groups.len() > 1;

        // A split season is two single round robins; the mirrored second leg is the clausura.
        let legs = if settings.is_split_season() { 2 } else { settings.legs.max(1) };

        let groups: Vec<LeagueGroup> = groups
            .into_iter()
            .enumerate()
            .map(|(index, teams)| {
                let prefix = if multi_group {
                    format!("{}-g{}", slug, index + 1)
                } else {
                    slug.clone()
                };
                LeagueGroup::new(index as u8, &prefix, teams, legs)
            })
            .collect();

        let split_season = match (settings.is_split_season(), groups.first()) {
            (true, Some(group)) => Some(AperturaClausuraSeason::new(
                &group.teams,
                RoundRobin::matchday_count(group.teams.len(), 1),
            )),
            _ => None,
        };

        League {
            id,
            name,
            slug,
            country_id,
            tier,
            reputation,
            settings,
            groups,
            split_season,
        }
    }

    pub fn teams(&self) -> impl Iterator<Item = u32> + '_ {
        self.groups.iter().flat_map(|g| g.teams.iter().copied())
    }

    pub fn contains(&self, team_id: u32) -> bool {
        self.groups.iter().any(|g| g.contains(team_id))
    }

    pub fn matchday_count(&self) -> u16 {
        self.groups.iter().map(|g| g.matchday_count()).max().unwrap_or(0)
    }

    pub fn apply_calendar(&mut self, calendar: &Calendar) -> CompetitionResult<()> {
        for group in &mut self.groups {
            remap_fixtures(&mut group.fixtures, calendar)?;
        }
        Ok(())
    }

    // ========== FIXTURES ==========

    pub fn fixtures_in_week(&self, week: Week) -> impl Iterator<Item = &Fixture> + '_ {
        self.groups
            .iter()
            .flat_map(|g| g.fixtures.iter())
            .filter(move |f| f.week == week)
    }

    pub fn due_fixture(&self, week: Week, team_id: u32) -> Option<&Fixture> {
        self.fixtures_in_week(week)
            .find(|f| f.involves(team_id) && !f.is_played())
    }

    pub fn fixture(&self, fixture_id: &str) -> Option<&Fixture> {
        self.groups
            .iter()
            .flat_map(|g| g.fixtures.iter())
            .find(|f| f.id == fixture_id)
    }

    /// Records a fixture result in its group table and, for split seasons, in the
    /// half the matchday belongs to.
    pub fn play_fixture(&mut self, fixture_id: &str, result: FixtureResult) -> CompetitionResult<()> {
        let (group_index, fixture_index) = self
            .groups
            .iter()
            .enumerate()
            .find_map(|(gi, g)| g.fixtures.iter().position(|f| f.id == fixture_id).map(|fi| (gi, fi)))
            .ok_or_else(|| CompetitionError::UnknownMatch(String::from(fixture_id)))?;

        let group = &mut self.groups[group_index];
        let fixture = &group.fixtures[fixture_index];

        if fixture.is_played() {
            return Err(CompetitionError::out_of_sequence(
                &self.name,
                format!("fixture {} already played", fixture_id),
            ));
        }

        let (home, away, matchday) = (fixture.home_team_id, fixture.away_team_id, fixture.matchday);

        if let Some(split) = self.split_season.as_mut() {
            let half = split.half_for_matchday(matchday);

            if half == SeasonHalf::Clausura && split.current_half == SeasonHalf::Apertura {
                let apertura_open = group
                    .fixtures
                    .iter()
                    .any(|f| !f.is_played() && f.matchday < split.apertura_matchdays);
                if apertura_open {
                    return Err(CompetitionError::out_of_sequence(
                        &self.name,
                        "clausura fixture before the apertura finished",
                    ));
                }
                split.begin_clausura()?;
            }

            split.apply_result(half, home, away, result.home_goals, result.away_goals)?;
        }

        group.table.apply_result(home, away, result.home_goals, result.away_goals);
        group.fixtures[fixture_index].result = Some(result);

        if group.is_finished() {
            if let Some(split) = self.split_season.as_mut() {
                split.conclude_halves()?;
            } else {
                info!("🏁 {} finished, champion: {:?}", self.name, group.table.leader());
            }
        }

        Ok(())
    }

    /// Plays every unplayed fixture of the week that does not involve the human club.
    pub fn simulate_week(
        &mut self,
        ctx: &SeasonContext,
        teams: &TeamRegistry,
        runner: &mut MatchRunner<'_>,
    ) -> CompetitionResult<LeagueResult> {
        let requests: Vec<MatchRequest> = self
            .fixtures_in_week(ctx.week)
            .filter(|f| !f.is_played() && !ctx.involves_human(f.home_team_id, f.away_team_id))
            .map(|f| MatchRequest::new(CompetitionKind::League, self.id, f.id.clone(), f.home_team_id, f.away_team_id))
            .collect();

        if requests.is_empty() {
            return Ok(LeagueResult::new(self.id));
        }

        debug!("⚽ {}: {} fixtures in week {}", self.name, requests.len(), ctx.week);

        let mut matches = Vec::with_capacity(requests.len());
        for request in requests {
            let played = runner.play(teams, &request)?;
            self.record(&played)?;
            matches.push(played);
        }

        Ok(LeagueResult::with_matches(self.id, matches))
    }

    pub fn record(&mut self, played: &PlayedMatch) -> CompetitionResult<()> {
        let mut result = FixtureResult::new(played.home_score, played.away_score);
        result.events = played.events.clone();
        self.play_fixture(&played.fixture_id, result)
    }

    // ========== SPLIT-SEASON FINAL ==========

    pub fn pending_split_final(&self) -> Option<(u8, u32, u32)> {
        self.split_season.as_ref().and_then(|s| s.pending_leg())
    }

    pub fn play_split_final_leg(&mut self, leg: u8, home_goals: u8, away_goals: u8) -> CompetitionResult<Option<SplitSeasonOutcome>> {
        let split = self.split_season.as_mut().ok_or_else(|| {
            CompetitionError::out_of_sequence(&self.name, "league has no split season")
        })?;
        split.play_decider_leg(leg, home_goals, away_goals)
    }

    pub fn simulate_split_final(
        &mut self,
        ctx: &SeasonContext,
        leg: u8,
        teams: &TeamRegistry,
        runner: &mut MatchRunner<'_>,
    ) -> CompetitionResult<LeagueResult> {
        let Some((next_leg, home, away)) = self.pending_split_final() else {
            return Ok(LeagueResult::new(self.id));
        };

        if next_leg != leg || ctx.involves_human(home, away) {
            return Ok(LeagueResult::new(self.id));
        }

        let request = MatchRequest::new(
            CompetitionKind::SplitSeasonFinal,
            self.id,
            format!("{}-final-{}", self.slug, leg),
            home,
            away,
        );
        let played = runner.play(teams, &request)?;
        let outcome = self.play_split_final_leg(leg, played.home_score, played.away_score)?;

        let mut result = LeagueResult::with_matches(self.id, vec![played]);
        result.champion = outcome.map(|o| o.winner);
        Ok(result)
    }

    // ========== SEASON END ==========

    pub fn is_finished(&self) -> bool {
        let tables_done = self.groups.iter().all(|g| g.is_finished());
        let split_done = self
            .split_season
            .as_ref()
            .is_none_or(|s| s.outcome.is_some());
        tables_done && split_done
    }

    pub fn champion(&self) -> Option<u32> {
        match &self.split_season {
            Some(split) => split.outcome.map(|o| o.winner),
            None if self.groups.len() == 1 && self.groups[0].is_finished() => self.groups[0].table.leader(),
            None => None,
        }
    }

    /// Final order of one group: the table ranking, or for split seasons the
    /// champion followed by the combined table.
    pub fn final_order(&self, group_index: usize) -> Vec<u32> {
        match (&self.split_season, self.groups.get(group_index)) {
            (Some(split), _) if group_index == 0 => split.season_order(),
            (_, Some(group)) => group.table.ranked_team_ids(),
            _ => Vec::new(),
        }
    }

    /// Whole league in order: group winners first, then second places, and so on.
    pub fn overall_order(&self) -> Vec<u32> {
        let orders: Vec<Vec<u32>> = (0..self.groups.len()).map(|g| self.final_order(g)).collect();
        let longest = orders.iter().map(|o| o.len()).max().unwrap_or(0);

        (0..longest)
            .flat_map(|position| orders.iter().filter_map(move |o| o.get(position).copied()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn league(settings: LeagueSettings, groups: Vec<Vec<u32>>) -> League {
        League::new(1, String::from("Premier"), String::from("premier"), 1, 1, 5000, settings, groups)
    }

    #[test]
    fn test_new_builds_round_robin() {
        let league = league(LeagueSettings::standard(2), vec![(1..=6).collect()]);
        assert_eq!(league.matchday_count(), 10);
        assert_eq!(league.groups[0].fixtures.len(), 30);
    }

    #[test]
    fn test_play_fixture_twice_is_rejected() {
        let mut league = league(LeagueSettings::standard(1), vec![vec![1, 2]]);
        let id = league.groups[0].fixtures[0].id.clone();

        league.play_fixture(&id, FixtureResult::new(2, 1)).unwrap();
        assert!(matches!(
            league.play_fixture(&id, FixtureResult::new(2, 1)),
            Err(CompetitionError::OutOfSequence { .. })
        ));
        assert_eq!(league.groups[0].table.row(1).unwrap().played, 1);
        assert!(league.is_finished());
    }

    #[test]
    fn test_split_season_routes_halves() {
        let mut league = league(LeagueSettings::apertura_clausura(), vec![vec![1, 2]]);
        assert_eq!(league.matchday_count(), 2);

        let apertura = league.groups[0].fixtures[0].clone();
        let clausura = league.groups[0].fixtures[1].clone();

        league.play_fixture(&apertura.id, FixtureResult::new(1, 0)).unwrap();
        league.play_fixture(&clausura.id, FixtureResult::new(1, 0)).unwrap();

        let split = league.split_season.as_ref().unwrap();
        assert_eq!(split.current_half, SeasonHalf::Clausura);

        // Each side won its home match, so the halves have different champions.
        assert!(league.pending_split_final().is_some());
        assert!(!league.is_finished());
    }

    #[test]
    fn test_overall_order_interleaves_groups() {
        let mut league = league(LeagueSettings::standard(1), vec![vec![1, 2], vec![3, 4]]);
        let first = league.groups[0].fixtures[0].id.clone();
        let second = league.groups[1].fixtures[0].id.clone();

        league.play_fixture(&first, FixtureResult::new(0, 3)).unwrap();
        league.play_fixture(&second, FixtureResult::new(1, 0)).unwrap();

        let home_second = league.groups[1].fixtures[0].home_team_id;
        let away_first = league.groups[0].fixtures[0].away_team_id;
        let order = league.overall_order();
        assert_eq!(order[0], away_first);
        assert_eq!(order[1], home_second);
        assert_eq!(order.len(), 4);
    }
}
