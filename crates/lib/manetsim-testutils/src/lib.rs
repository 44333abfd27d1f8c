pub mod bucket;
pub mod network;
