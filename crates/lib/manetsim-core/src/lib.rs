#![forbid(unsafe_code)]

pub use hashbrown;

pub mod bucket;
pub mod error;
pub mod model;
pub mod node;
pub mod scheduler;
