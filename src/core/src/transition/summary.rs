use crate::continent::QualificationOutcome;
use crate::error::DegradedFill;
use crate::r#match::PlayedMatch;
use crate::season::Season;
use crate::shared::CurrencyValue;
use crate::transition::{MembershipDelta, Movement};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How one club's season went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSeasonSummary {
    pub team_id: u32,
    pub league_id: Option<u32>,
    /// 1-based position in the team's table, group tables included.
    pub final_standing: Option<u32>,
    pub points: u16,
    pub cup_result: Option<String>,
    pub continental_result: Option<String>,
    pub prize_money: Option<CurrencyValue>,
    pub promoted: bool,
    pub relegated: bool,
    /// Continental competitions qualified for next season.
    pub qualified_for: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub year: u16,
    pub league_champions: BTreeMap<u32, u32>,
    pub cup_winner: Option<u32>,
    pub continental_winners: BTreeMap<u32, u32>,
    pub promoted: Vec<u32>,
    pub relegated: Vec<u32>,
    pub playoff_matches: Vec<PlayedMatch>,
    pub teams: BTreeMap<u32, TeamSeasonSummary>,
    pub warnings: Vec<DegradedFill>,
}

impl SeasonSummary {
    pub fn build(
        season: &Season,
        deltas: &[MembershipDelta],
        qualification: &QualificationOutcome,
        playoff_matches: Vec<PlayedMatch>,
    ) -> Self {
        let moved = |team_id: u32, movement: Movement| deltas.iter().any(|d| d.team_id == team_id && d.movement == movement);

        let mut teams = BTreeMap::new();

        for league in &season.leagues {
            for (group_index, group) in league.groups.iter().enumerate() {
                let order = league.final_order(group_index);

                for &team_id in &group.teams {
                    let continental = season.continental.iter().find(|c| c.contains(team_id));

                    teams.insert(
                        team_id,
                        TeamSeasonSummary {
                            team_id,
                            league_id: Some(league.id),
                            final_standing: order.iter().position(|&t| t == team_id).map(|p| p as u32 + 1),
                            points: group.table.row(team_id).map(|r| r.points).unwrap_or(0),
                            cup_result: season.cup.as_ref().and_then(|c| c.finish_for(team_id)),
                            continental_result: continental.and_then(|c| c.finish_for(team_id)),
                            prize_money: continental.and_then(|c| c.prize_for(team_id)).cloned(),
                            promoted: moved(team_id, Movement::Promoted),
                            relegated: moved(team_id, Movement::Relegated),
                            qualified_for: qualification.qualified_for(team_id),
                        },
                    );
                }
            }
        }

        SeasonSummary {
            year: season.year,
            league_champions: season
                .leagues
                .iter()
                .filter_map(|l| l.champion().map(|team| (l.id, team)))
                .collect(),
            cup_winner: season.cup.as_ref().and_then(|c| c.champion()),
            continental_winners: season
                .continental
                .iter()
                .filter_map(|c| c.champion.map(|team| (c.id, team)))
                .collect(),
            promoted: deltas
                .iter()
                .filter(|d| d.movement == Movement::Promoted)
                .map(|d| d.team_id)
                .collect(),
            relegated: deltas
                .iter()
                .filter(|d| d.movement == Movement::Relegated)
                .map(|d| d.team_id)
                .collect(),
            playoff_matches,
            teams,
            warnings: qualification.warnings.clone(),
        }
    }

    pub fn team(&self, team_id: u32) -> Option<&TeamSeasonSummary> {
        self.teams.get(&team_id)
    }
}
