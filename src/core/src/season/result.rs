use crate::r#match::PlayedMatch;
use crate::season::DueMatch;
use crate::shared::CompetitionKind;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct ChampionDecided {
    pub competition: CompetitionKind,
    pub competition_id: u32,
    pub team_id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekReport {
    pub week: u16,
    pub date: NaiveDate,
    pub matches: Vec<PlayedMatch>,
    pub champions: Vec<ChampionDecided>,
}

impl WeekReport {
    pub fn new(week: u16, date: NaiveDate) -> Self {
        WeekReport {
            week,
            date,
            matches: Vec::new(),
            champions: Vec::new(),
        }
    }

    pub fn champion(&mut self, competition: CompetitionKind, competition_id: u32, team_id: Option<u32>) {
        if let Some(team_id) = team_id {
            let decided = ChampionDecided {
                competition,
                competition_id,
                team_id,
            };
            if !self.champions.contains(&decided) {
                self.champions.push(decided);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeekStep {
    Advanced(WeekReport),
    /// The week stays open until the human club's match is applied.
    AwaitingHumanMatch(DueMatch),
    SeasonFinished,
}
