mod start;
mod status;
mod stop;

pub use start::*;
pub use status::*;
pub use stop::*;
