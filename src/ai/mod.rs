pub mod prioritize;
pub mod subtasks;

pub use prioritize::prioritize;
pub use subtasks::generate_subtasks;
