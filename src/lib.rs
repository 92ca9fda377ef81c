pub mod ai;
pub mod cli;
pub mod db;
pub mod error;
pub mod graph;
pub mod models;
pub mod output;
pub mod store;
