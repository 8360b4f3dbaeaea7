pub mod args;
pub mod config;
pub mod dataset;
pub mod model;
pub mod utils;
