pub mod country;
pub mod team;

pub use country::*;
pub use team::*;

use season_core::{ContinentalSettings, CupWinnerSlot, SlotAllocation};
use serde::Deserialize;

const STATIC_WORLD_JSON: &str = include_str!("../data/world.json");

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseEntity {
    pub countries: Vec<CountryEntity>,
    pub teams: Vec<TeamEntity>,
    #[serde(default)]
    pub continental: Vec<ContinentalSettings>,
    #[serde(default)]
    pub slots: Vec<SlotAllocation>,
    #[serde(default)]
    pub cup_winner_slot: Option<CupWinnerSlot>,
}

pub struct DatabaseLoader;

impl DatabaseLoader {
    pub fn load() -> Result<DatabaseEntity, serde_json::Error> {
        Self::parse(STATIC_WORLD_JSON)
    }

    pub fn parse(json: &str) -> Result<DatabaseEntity, serde_json::Error> {
        serde_json::from_str(json)
    }
}
