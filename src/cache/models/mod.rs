pub mod poll_status;
pub mod reading;
pub mod session;

pub use poll_status::PollStatus;
pub use reading::{GlucoseReading, GlucoseUnits, Trend};
pub use session::CachedSession;
