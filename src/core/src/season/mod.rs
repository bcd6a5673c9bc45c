pub mod due;
pub mod result;
pub mod runner;
pub mod season;

pub use due::*;
pub use result::*;
pub use runner::*;
pub use season::*;
