//! Repetition engine: stage lookup and the task completion state machine.

pub mod completion;
pub mod schedule;

pub use completion::{Completion, Transition, complete, complete_task};
pub use schedule::{Schedule, ScheduleFile, next_stage};
