use crate::r#match::PlayedMatch;

#[derive(Debug, Clone, Default)]
pub struct ContinentalResult {
    pub competition_id: u32,
    pub matches: Vec<PlayedMatch>,
    pub champion: Option<u32>,
}

impl ContinentalResult {
    pub fn new(competition_id: u32) -> Self {
        ContinentalResult {
            competition_id,
            matches: Vec::new(),
            champion: None,
        }
    }
}
