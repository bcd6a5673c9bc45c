pub mod builder;
pub mod calendar;

pub use builder::*;
pub use calendar::*;
