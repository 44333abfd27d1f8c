pub mod builder;
pub mod config;
pub mod driver;
pub mod runner;
