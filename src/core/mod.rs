pub mod catalog;
pub mod errors;
pub mod models;
pub mod recorder;
pub mod state;
pub mod targets;
