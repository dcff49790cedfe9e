mod counter;

pub use counter::{PingCounter, RateSnapshot, HOUR_MS, MINUTE_MS, SECOND_MS};
