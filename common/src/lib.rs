pub mod config;
pub mod location;
pub mod model;
