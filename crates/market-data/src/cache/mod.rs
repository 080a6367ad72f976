//! Time-bounded result cache.
//!
//! - `clock` - Injected time source, so expiry is testable without sleeping
//! - `store` - Process-wide entry map plus per-key in-flight locks

mod clock;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{CacheEntry, ResultCache};
