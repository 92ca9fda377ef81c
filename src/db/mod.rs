pub mod connection;
pub mod migrations;
pub mod share_repo;
pub mod state_repo;
pub mod task_repo;

pub use connection::*;
