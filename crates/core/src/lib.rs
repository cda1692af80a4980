#![forbid(unsafe_code)]

pub mod assignment;
pub mod images;
pub mod model;
pub mod time;

pub use assignment::{AssignmentEngine, plan};
pub use images::ImageResolver;
pub use time::Clock;

/// Number of questions in the survey when no override is configured.
pub const DEFAULT_TOTAL_QUESTIONS: usize = 37;
