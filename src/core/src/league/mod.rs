pub mod apertura;
pub mod league;
pub mod result;
pub mod schedule;
pub mod settings;
pub mod table;

pub use apertura::*;
pub use league::*;
pub use result::*;
pub use schedule::*;
pub use settings::*;
pub use table::*;
