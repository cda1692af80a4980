//! The survey state machine and the per-request workflow around it.

pub mod controller;
pub mod screen;
pub mod workflow;

pub use controller::{Event, FlowController};
pub use screen::{ComparisonImages, Screen};
pub use workflow::{Action, FlowStep, Notice, SurveyFlowService};
