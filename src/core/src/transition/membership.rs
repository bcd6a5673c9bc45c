use crate::error::{CompetitionError, CompetitionResult};
use crate::season::Season;
use crate::shared::TeamRegistry;
use crate::transition::SeasonSetup;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Movement {
    Promoted,
    Relegated,
}

/// One team changing league between seasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipDelta {
    pub team_id: u32,
    pub from_league: u32,
    pub to_league: u32,
    pub movement: Movement,
}

/// Playoff winners keyed by league id and group index.
pub type PlayoffWinners = BTreeMap<(u32, usize), u32>;

pub struct Membership;

impl Membership {
    /// Who goes up and who goes down. Automatic places come from each group's
    /// final order, plus the group's playoff winner; relegation takes the bottom
    /// of the whole league.
    pub fn deltas(setup: &SeasonSetup, season: &Season, playoff_winners: &PlayoffWinners) -> CompetitionResult<Vec<MembershipDelta>> {
        let mut deltas = Vec::new();

        for definition in &setup.leagues {
            let league = season.league(definition.id)?;

            if let Some(above) = setup.league_above(definition) {
                for group_index in 0..league.groups.len() {
                    let order = league.final_order(group_index);

                    let mut promoted: Vec<u32> = order
                        .iter()
                        .copied()
                        .take(definition.settings.promotion_places as usize)
                        .collect();

                    if definition.settings.playoff.is_some() {
                        let winner = playoff_winners.get(&(definition.id, group_index)).ok_or_else(|| {
                            CompetitionError::out_of_sequence(
                                &definition.name,
                                format!("group {} playoff has no winner", group_index + 1),
                            )
                        })?;
                        promoted.push(*winner);
                    }

                    deltas.extend(promoted.into_iter().map(|team_id| MembershipDelta {
                        team_id,
                        from_league: definition.id,
                        to_league: above.id,
                        movement: Movement::Promoted,
                    }));
                }
            }

            if let Some(below) = setup.league_below(definition) {
                let order = league.overall_order();
                let count = (definition.settings.relegation_places as usize).min(order.len());

                deltas.extend(order[order.len() - count..].iter().map(|&team_id| MembershipDelta {
                    team_id,
                    from_league: definition.id,
                    to_league: below.id,
                    movement: Movement::Relegated,
                }));
            }
        }

        for delta in &deltas {
            info!(
                "{} team {}: league {} -> {}",
                match delta.movement {
                    Movement::Promoted => "⬆️",
                    Movement::Relegated => "⬇️",
                },
                delta.team_id,
                delta.from_league,
                delta.to_league
            );
        }

        Ok(deltas)
    }

    /// Next season's groups. Staying clubs keep their final order, newcomers
    /// follow by reputation; group divisions are redrawn from scratch.
    pub fn apply(setup: &SeasonSetup, season: &Season, deltas: &[MembershipDelta]) -> CompetitionResult<BTreeMap<u32, Vec<Vec<u32>>>> {
        let mut memberships = BTreeMap::new();

        for definition in &setup.leagues {
            let league = season.league(definition.id)?;

            let leaving = |team_id: u32| deltas.iter().any(|d| d.team_id == team_id && d.from_league == definition.id);
            let arriving: Vec<u32> = deltas
                .iter()
                .filter(|d| d.to_league == definition.id)
                .map(|d| d.team_id)
                .collect();

            let mut members: Vec<u32> = league.overall_order().into_iter().filter(|&t| !leaving(t)).collect();
            members.extend(setup.teams.by_reputation(&arriving));

            let groups = if definition.settings.groups > 1 {
                Self::serpentine(&setup.teams, &members, definition.settings.groups as usize)
            } else {
                vec![members]
            };

            memberships.insert(definition.id, groups);
        }

        Ok(memberships)
    }

    /// Snake draft over reputation: 1 2 3 3 2 1 1 2 3 ... Group sizes differ by at
    /// most one.
    pub fn serpentine(teams: &TeamRegistry, members: &[u32], groups: usize) -> Vec<Vec<u32>> {
        let mut result: Vec<Vec<u32>> = vec![Vec::new(); groups.max(1)];
        let width = result.len();

        for (index, team_id) in teams.by_reputation(members).into_iter().enumerate() {
            let lap = index / width;
            let offset = index % width;
            let group = if lap % 2 == 0 { offset } else { width - 1 - offset };
            result[group].push(team_id);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::TeamRef;

    fn registry(count: u32) -> TeamRegistry {
        TeamRegistry::new(
            (1..=count)
                .map(|id| TeamRef::new(id, &format!("Team {}", id), "T", 2000 - id as u16 * 10, 60))
                .collect(),
        )
    }

    #[test]
    fn test_serpentine_balances_groups() {
        let teams = registry(8);
        let members: Vec<u32> = (1..=8).rev().collect();

        let groups = Membership::serpentine(&teams, &members, 2);
        assert_eq!(groups[0], vec![1, 4, 5, 8]);
        assert_eq!(groups[1], vec![2, 3, 6, 7]);
    }

    #[test]
    fn test_serpentine_uneven_sizes_differ_by_one() {
        let teams = registry(7);
        let members: Vec<u32> = (1..=7).collect();

        let groups = Membership::serpentine(&teams, &members, 3);
        let sizes: Vec<usize> = groups.iter().map(|g| g.len()).collect();
        assert_eq!(sizes, vec![3, 2, 2]);
        assert_eq!(groups[0], vec![1, 6, 7]);
    }
}
