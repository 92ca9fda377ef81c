pub mod share;
pub mod state;
pub mod task;

pub use share::*;
pub use state::*;
pub use task::*;
