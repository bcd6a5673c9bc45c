pub mod competition;
pub mod currency;
pub mod leg;
pub mod seeding;
pub mod team;

pub use competition::*;
pub use currency::*;
pub use leg::*;
pub use seeding::*;
pub use team::*;
