use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TeamEntity {
    pub id: u32,
    pub name: String,
    pub short_name: String,
    pub reputation: u16,
    pub overall: u8,
}
