use crate::continent::{
    ContinentalCompetition, ContinentalSettings, CupWinnerSlot, Qualification, QualificationInput, SlotAllocation,
};
use crate::cup::CupBracket;
use crate::error::{CompetitionError, CompetitionResult, DegradedFill};
use crate::league::{League, LeagueSettings};
use crate::season::Season;
use crate::shared::TeamRegistry;
use chrono::NaiveDate;
use itertools::Itertools;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Static description of a league; memberships change every season, this does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueDefinition {
    pub id: u32,
    pub name: String,
    pub slug: String,
    pub country_id: u32,
    pub tier: u8,
    pub reputation: u16,
    #[serde(default)]
    pub settings: LeagueSettings,
}

impl LeagueDefinition {
    pub fn build(&self, groups: Vec<Vec<u32>>) -> League {
        League::new(
            self.id,
            self.name.clone(),
            self.slug.clone(),
            self.country_id,
            self.tier,
            self.reputation,
            self.settings.clone(),
            groups,
        )
    }
}

/// Domestic cup open to every club of the listed leagues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CupDefinition {
    pub id: u32,
    pub name: String,
    pub country_id: u32,
    pub leagues: Vec<u32>,
}

/// Everything a season is bootstrapped from.
#[derive(Debug, Clone)]
pub struct SeasonSetup {
    pub year: u16,
    pub season_start: NaiveDate,
    pub teams: TeamRegistry,
    pub leagues: Vec<LeagueDefinition>,
    /// League id to its groups of team ids, in registration order.
    pub memberships: BTreeMap<u32, Vec<Vec<u32>>>,
    pub cup: Option<CupDefinition>,
    pub continental: Vec<ContinentalSettings>,
    pub slots: Vec<SlotAllocation>,
    pub cup_winner_slot: Option<CupWinnerSlot>,
    /// Competition id to entrants in seed order.
    pub continental_entrants: BTreeMap<u32, Vec<u32>>,
}

impl SeasonSetup {
    pub fn new(
        year: u16,
        season_start: NaiveDate,
        teams: TeamRegistry,
        leagues: Vec<LeagueDefinition>,
        memberships: BTreeMap<u32, Vec<Vec<u32>>>,
    ) -> Self {
        SeasonSetup {
            year,
            season_start,
            teams,
            leagues,
            memberships,
            cup: None,
            continental: Vec::new(),
            slots: Vec::new(),
            cup_winner_slot: None,
            continental_entrants: BTreeMap::new(),
        }
    }

    pub fn with_cup(mut self, cup: CupDefinition) -> Self {
        self.cup = Some(cup);
        self
    }

    pub fn with_continental(
        mut self,
        competitions: Vec<ContinentalSettings>,
        slots: Vec<SlotAllocation>,
        cup_winner_slot: Option<CupWinnerSlot>,
    ) -> Self {
        self.continental = competitions;
        self.slots = slots;
        self.cup_winner_slot = cup_winner_slot;
        self
    }

    pub fn definition(&self, league_id: u32) -> Option<&LeagueDefinition> {
        self.leagues.iter().find(|l| l.id == league_id)
    }

    /// League one tier above in the same country.
    pub fn league_above(&self, league: &LeagueDefinition) -> Option<&LeagueDefinition> {
        let tier = league.tier.checked_sub(1)?;
        self.leagues
            .iter()
            .find(|l| l.country_id == league.country_id && l.tier == tier)
    }

    /// League one tier below in the same country.
    pub fn league_below(&self, league: &LeagueDefinition) -> Option<&LeagueDefinition> {
        self.leagues
            .iter()
            .find(|l| l.country_id == league.country_id && l.tier == league.tier + 1)
    }

    pub fn members(&self, league_id: u32) -> Vec<u32> {
        self.memberships
            .get(&league_id)
            .map(|groups| groups.iter().flatten().copied().collect())
            .unwrap_or_default()
    }

    // ========== VALIDATION ==========

    /// Rejects setups that would make a season unplayable or change league sizes
    /// from one season to the next.
    pub fn validate(&self) -> CompetitionResult<()> {
        let mut seen: BTreeSet<u32> = BTreeSet::new();

        let duplicate_tier = self
            .leagues
            .iter()
            .map(|l| (l.country_id, l.tier))
            .duplicates()
            .next();
        if let Some((country, tier)) = duplicate_tier {
            return Err(CompetitionError::invalid_configuration(format!(
                "country {} has two leagues at tier {}",
                country, tier
            )));
        }

        for league in &self.leagues {
            let groups = self.memberships.get(&league.id).ok_or_else(|| {
                CompetitionError::invalid_configuration(format!("{} has no members", league.name))
            })?;

            if groups.len() != league.settings.groups as usize {
                return Err(CompetitionError::invalid_configuration(format!(
                    "{} expects {} groups, got {}",
                    league.name,
                    league.settings.groups,
                    groups.len()
                )));
            }

            if league.settings.is_split_season() && groups.len() > 1 {
                return Err(CompetitionError::invalid_configuration(format!(
                    "{} cannot split its season across groups",
                    league.name
                )));
            }

            let smallest = groups.iter().map(|g| g.len()).min().unwrap_or(0);
            if smallest < 2 {
                return Err(CompetitionError::invalid_configuration(format!(
                    "{} has a group with fewer than two teams",
                    league.name
                )));
            }

            for team_id in groups.iter().flatten() {
                self.teams.get(*team_id)?;
                if !seen.insert(*team_id) {
                    return Err(CompetitionError::invalid_configuration(format!(
                        "team {} plays in more than one league",
                        team_id
                    )));
                }
            }

            self.validate_places(league, smallest)?;
        }

        Ok(())
    }

    fn validate_places(&self, league: &LeagueDefinition, smallest_group: usize) -> CompetitionResult<()> {
        let settings = &league.settings;

        if let Some(playoff) = settings.playoff {
            if !matches!(playoff.width, 2 | 4) {
                return Err(CompetitionError::invalid_configuration(format!(
                    "{}: playoff width {} is not supported",
                    league.name, playoff.width
                )));
            }
            if (playoff.first_position as usize) <= settings.promotion_places as usize
                || playoff.positions().end > smallest_group
            {
                return Err(CompetitionError::invalid_configuration(format!(
                    "{}: playoff positions {:?} do not fit the table",
                    league.name,
                    playoff.positions()
                )));
            }
        }

        let promoted = settings.promoted_per_group() as usize;
        let relegated = settings.relegation_places as usize;

        if self.league_above(league).is_none() && promoted > 0 {
            return Err(CompetitionError::invalid_configuration(format!(
                "{} promotes but has no league above",
                league.name
            )));
        }

        let expected_relegation = match self.league_below(league) {
            Some(below) => below.settings.promoted_per_group() as usize * below.settings.groups as usize,
            None => 0,
        };
        if relegated != expected_relegation {
            return Err(CompetitionError::invalid_configuration(format!(
                "{} relegates {} but the tier below promotes {}",
                league.name, relegated, expected_relegation
            )));
        }

        if promoted + relegated > smallest_group {
            return Err(CompetitionError::invalid_configuration(format!(
                "{} moves more teams than a group holds",
                league.name
            )));
        }

        Ok(())
    }

    // ========== BOOTSTRAP ==========

    /// Prepares the very first season. With no final tables yet, continental
    /// places go to each league's clubs by reputation.
    pub fn bootstrap(&mut self) -> CompetitionResult<Vec<DegradedFill>> {
        self.validate()?;

        let input = QualificationInput {
            league_orders: self
                .leagues
                .iter()
                .map(|l| (l.id, self.teams.by_reputation(&self.members(l.id))))
                .collect(),
            cup_winner: None,
        };

        let outcome = Qualification::allocate(&self.continental, &self.slots, None, &input, &self.teams);
        self.continental_entrants = outcome.entrants;

        info!(
            "🌍 bootstrap {}: {} leagues, {} teams, {} continental competitions",
            self.year,
            self.leagues.len(),
            self.teams.len(),
            self.continental.len()
        );

        Ok(outcome.warnings)
    }

    /// Fresh engines for every competition, scheduled on one calendar.
    pub fn build_season(&self) -> CompetitionResult<Season> {
        let leagues: Vec<League> = self
            .leagues
            .iter()
            .map(|definition| {
                let groups = self.memberships.get(&definition.id).cloned().unwrap_or_default();
                definition.build(groups)
            })
            .collect();

        let cup = self.cup.as_ref().map(|definition| {
            let entrants: Vec<u32> = definition.leagues.iter().flat_map(|id| self.members(*id)).collect();
            CupBracket::new(definition.id, &definition.name, &self.teams.by_reputation(&entrants))
        });

        let mut continental = Vec::new();
        for settings in &self.continental {
            let entrants = self.continental_entrants.get(&settings.id).cloned().unwrap_or_default();

            if entrants.len() < 2 {
                warn!("⚠️ {} skipped this season: {} entrants", settings.name, entrants.len());
                continue;
            }

            continental.push(ContinentalCompetition::new(
                settings.id,
                &settings.name,
                entrants,
                settings.league_phase_matchdays,
                settings.prizes.clone(),
            ));
        }

        Season::new(self.year, self.teams.clone(), leagues, cup, continental)
    }
}
