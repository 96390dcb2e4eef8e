use chrono::{DateTime, Utc};
use classroom_core::ports::Clock;

/// Wall clock. Under wasm32 chrono reads `Date.now()`.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
