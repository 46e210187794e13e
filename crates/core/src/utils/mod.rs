pub mod clock;
pub mod decimal;

pub use clock::{Clock, ManualClock, SystemClock};
pub use decimal::{round_display, round_to_precision};
