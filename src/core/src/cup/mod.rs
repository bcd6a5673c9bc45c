pub mod bracket;
pub mod result;

pub use bracket::*;
pub use result::*;
