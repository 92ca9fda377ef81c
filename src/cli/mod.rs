pub mod commands;
pub mod data;
pub mod init;
pub mod settings;
pub mod share;
pub mod stats;
pub mod task;
pub mod view;

pub use commands::*;
