use crate::r#match::PlayedMatch;

#[derive(Debug, Clone, Default)]
pub struct LeagueResult {
    pub league_id: u32,
    pub matches: Vec<PlayedMatch>,
    /// Set on the week a split-season decider crowned its winner.
    pub champion: Option<u32>,
}

impl LeagueResult {
    pub fn new(league_id: u32) -> Self {
        LeagueResult {
            league_id,
            matches: Vec::new(),
            champion: None,
        }
    }

    pub fn with_matches(league_id: u32, matches: Vec<PlayedMatch>) -> Self {
        LeagueResult {
            league_id,
            matches,
            champion: None,
        }
    }

    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }
}
