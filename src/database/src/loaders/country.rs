use season_core::LeagueSettings;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CountryEntity {
    pub id: u32,
    pub name: String,
    pub code: String,
    pub reputation: u16,
    pub leagues: Vec<LeagueEntity>,
    #[serde(default)]
    pub cup: Option<CupEntity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueEntity {
    pub id: u32,
    pub name: String,
    pub slug: String,
    pub tier: u8,
    pub reputation: u16,
    #[serde(default)]
    pub settings: LeagueSettings,
    /// Team ids per group; a single-table league has one group.
    pub groups: Vec<Vec<u32>>,
}

/// Domestic cup open to every league of the country.
#[derive(Debug, Clone, Deserialize)]
pub struct CupEntity {
    pub id: u32,
    pub name: String,
}
