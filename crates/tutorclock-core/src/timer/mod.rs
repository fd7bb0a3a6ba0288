mod format;
mod scheduler;

pub use format::format_duration;
pub use scheduler::{TickScheduler, DEFAULT_TICK_PERIOD};
