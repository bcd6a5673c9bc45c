pub mod competition;
pub mod format;
pub mod qualification;
pub mod result;
pub mod tie;

pub use competition::*;
pub use format::*;
pub use qualification::*;
pub use result::*;
pub use tie::*;
