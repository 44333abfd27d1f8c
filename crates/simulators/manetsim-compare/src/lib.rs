#![forbid(unsafe_code)]

pub mod apps;
pub mod error;
pub mod net;
pub mod simulation;
pub mod stats;
