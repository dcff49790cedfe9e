mod embed;
mod exclude;
mod setup;

pub use embed::*;
pub use exclude::*;
pub use setup::*;
