use crate::error::{CompetitionError, CompetitionResult};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable club identity shared by every competition. Squads live elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: u32,
    pub name: String,
    pub short_name: String,
    pub reputation: u16,
    pub overall: u8,
}

impl TeamRef {
    pub fn new(id: u32, name: &str, short_name: &str, reputation: u16, overall: u8) -> Self {
        TeamRef {
            id,
            name: String::from(name),
            short_name: String::from(short_name),
            reputation,
            overall,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamRegistry {
    teams: BTreeMap<u32, TeamRef>,
}

impl TeamRegistry {
    pub fn new(teams: Vec<TeamRef>) -> Self {
        TeamRegistry {
            teams: teams.into_iter().map(|team| (team.id, team)).collect(),
        }
    }

    pub fn get(&self, team_id: u32) -> CompetitionResult<&TeamRef> {
        self.teams
            .get(&team_id)
            .ok_or(CompetitionError::UnknownTeam(team_id))
    }

    pub fn contains(&self, team_id: u32) -> bool {
        self.teams.contains_key(&team_id)
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TeamRef> {
        self.teams.values()
    }

    pub fn name(&self, team_id: u32) -> &str {
        self.teams
            .get(&team_id)
            .map(|team| team.name.as_str())
            .unwrap_or("Unknown")
    }

    /// Reputation descending; equal reputations keep the order they were given in.
    pub fn by_reputation(&self, team_ids: &[u32]) -> Vec<u32> {
        team_ids
            .iter()
            .copied()
            .sorted_by(|a, b| self.reputation(*b).cmp(&self.reputation(*a)))
            .collect()
    }

    fn reputation(&self, team_id: u32) -> u16 {
        self.teams.get(&team_id).map(|t| t.reputation).unwrap_or(0)
    }
}
