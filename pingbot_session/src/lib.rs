pub mod discord;
pub mod emitter;
pub mod error;
pub mod gateway;
pub mod manager;
pub mod publisher;
pub mod render;
pub mod roles;
pub mod session;

#[cfg(test)]
mod mock;

use std::sync::{Mutex, MutexGuard, PoisonError};

use pingbot_stats::PingCounter;

pub use error::{Error, Result};
pub use gateway::Gateway;
pub use manager::SessionManager;
pub use session::Timings;

pub type SharedCounter = std::sync::Arc<Mutex<PingCounter>>;

/// A panicked task cannot leave the counter half-updated, so poisoning is ignored.
pub(crate) fn lock_counter(counter: &Mutex<PingCounter>) -> MutexGuard<'_, PingCounter> {
    counter.lock().unwrap_or_else(PoisonError::into_inner)
}
