use crate::loaders::{CountryEntity, DatabaseEntity};
use chrono::NaiveDate;
use log::info;
use season_core::{CompetitionResult, CupDefinition, LeagueDefinition, SeasonSetup, TeamRef, TeamRegistry};
use std::collections::BTreeMap;

pub struct DatabaseGenerator;

impl DatabaseGenerator {
    /// Validated, bootstrapped setup of the first season. Only the first
    /// country with a cup gets a domestic cup.
    pub fn generate(data: &DatabaseEntity, year: u16, season_start: NaiveDate) -> CompetitionResult<SeasonSetup> {
        let teams = TeamRegistry::new(
            data.teams
                .iter()
                .map(|team| TeamRef::new(team.id, &team.name, &team.short_name, team.reputation, team.overall))
                .collect(),
        );

        let leagues: Vec<LeagueDefinition> = data.countries.iter().flat_map(Self::generate_leagues).collect();

        let memberships: BTreeMap<u32, Vec<Vec<u32>>> = data
            .countries
            .iter()
            .flat_map(|country| country.leagues.iter())
            .map(|league| (league.id, league.groups.clone()))
            .collect();

        let mut setup = SeasonSetup::new(year, season_start, teams, leagues, memberships).with_continental(
            data.continental.clone(),
            data.slots.clone(),
            data.cup_winner_slot,
        );

        if let Some(cup) = data.countries.iter().find_map(Self::generate_cup) {
            setup = setup.with_cup(cup);
        }

        setup.bootstrap()?;

        info!(
            "🗄️ generated {} countries, {} leagues, {} teams",
            data.countries.len(),
            setup.leagues.len(),
            setup.teams.len()
        );

        Ok(setup)
    }

    fn generate_leagues(country: &CountryEntity) -> Vec<LeagueDefinition> {
        country
            .leagues
            .iter()
            .map(|league| LeagueDefinition {
                id: league.id,
                name: league.name.clone(),
                slug: league.slug.clone(),
                country_id: country.id,
                tier: league.tier,
                reputation: league.reputation,
                settings: league.settings.clone(),
            })
            .collect()
    }

    fn generate_cup(country: &CountryEntity) -> Option<CupDefinition> {
        country.cup.as_ref().map(|cup| CupDefinition {
            id: cup.id,
            name: cup.name.clone(),
            country_id: country.id,
            leagues: country.leagues.iter().map(|l| l.id).collect(),
        })
    }
}
