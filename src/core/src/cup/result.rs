use crate::r#match::PlayedMatch;

#[derive(Debug, Clone, Default)]
pub struct CupResult {
    pub cup_id: u32,
    pub matches: Vec<PlayedMatch>,
    pub champion: Option<u32>,
}

impl CupResult {
    pub fn new(cup_id: u32) -> Self {
        CupResult {
            cup_id,
            matches: Vec::new(),
            champion: None,
        }
    }
}
