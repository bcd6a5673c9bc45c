mod generators;
mod loaders;

pub use generators::DatabaseGenerator;
pub use loaders::{CountryEntity, CupEntity, DatabaseEntity, DatabaseLoader, LeagueEntity, TeamEntity};
