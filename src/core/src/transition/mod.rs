pub mod membership;
pub mod pipeline;
pub mod setup;
pub mod summary;

pub use membership::*;
pub use pipeline::*;
pub use setup::*;
pub use summary::*;
