pub mod config;
pub mod models;
pub mod outcome;
pub mod util;
