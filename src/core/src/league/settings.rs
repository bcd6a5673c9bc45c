use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeagueFormat {
    #[default]
    Standard,
    AperturaClausura,
}

/// Contested promotion places: `width` teams starting at 1-based `first_position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffSettings {
    pub first_position: u8,
    pub width: u8,
}

impl PlayoffSettings {
    pub fn new(first_position: u8, width: u8) -> Self {
        PlayoffSettings {
            first_position,
            width,
        }
    }

    pub fn positions(&self) -> std::ops::Range<usize> {
        let start = self.first_position.saturating_sub(1) as usize;
        start..start + self.width as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueSettings {
    #[serde(default)]
    pub format: LeagueFormat,
    #[serde(default = "default_legs")]
    pub legs: u8,
    /// Automatic promotions, per group for group-organized divisions.
    #[serde(default)]
    pub promotion_places: u8,
    #[serde(default)]
    pub relegation_places: u8,
    #[serde(default)]
    pub playoff: Option<PlayoffSettings>,
    #[serde(default = "default_groups")]
    pub groups: u8,
}

fn default_legs() -> u8 {
    2
}

fn default_groups() -> u8 {
    1
}

impl LeagueSettings {
    pub fn standard(legs: u8) -> Self {
        LeagueSettings {
            format: LeagueFormat::Standard,
            legs,
            promotion_places: 0,
            relegation_places: 0,
            playoff: None,
            groups: 1,
        }
    }

    pub fn apertura_clausura() -> Self {
        LeagueSettings {
            format: LeagueFormat::AperturaClausura,
            legs: 1,
            ..LeagueSettings::standard(1)
        }
    }

    pub fn with_promotion(mut self, places: u8) -> Self {
        self.promotion_places = places;
        self
    }

    pub fn with_relegation(mut self, places: u8) -> Self {
        self.relegation_places = places;
        self
    }

    pub fn with_playoff(mut self, first_position: u8, width: u8) -> Self {
        self.playoff = Some(PlayoffSettings::new(first_position, width));
        self
    }

    pub fn with_groups(mut self, groups: u8) -> Self {
        self.groups = groups.max(1);
        self
    }

    pub fn is_split_season(&self) -> bool {
        self.format == LeagueFormat::AperturaClausura
    }

    /// Teams that go up from one table: automatic places plus a playoff winner.
    pub fn promoted_per_group(&self) -> u8 {
        self.promotion_places + u8::from(self.playoff.is_some())
    }
}

impl Default for LeagueSettings {
    fn default() -> Self {
        LeagueSettings::standard(2)
    }
}
