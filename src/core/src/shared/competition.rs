use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CompetitionKind {
    League,
    Cup,
    Continental,
    SplitSeasonFinal,
    Playoff,
    Friendly,
}

impl CompetitionKind {
    /// Kinds whose results feed a standings table.
    pub fn counts_for_table(&self) -> bool {
        matches!(self, CompetitionKind::League | CompetitionKind::Continental)
    }
}

impl Display for CompetitionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CompetitionKind::League => "league",
            CompetitionKind::Cup => "cup",
            CompetitionKind::Continental => "continental",
            CompetitionKind::SplitSeasonFinal => "split-season final",
            CompetitionKind::Playoff => "playoff",
            CompetitionKind::Friendly => "friendly",
        };
        write!(f, "{}", name)
    }
}
