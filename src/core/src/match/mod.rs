pub mod attendance;
pub mod outcome;
pub mod rating;
pub mod result;
pub mod squad;

pub use attendance::*;
pub use outcome::*;
pub use rating::*;
pub use result::*;
pub use squad::*;
