pub mod position;
pub mod run;
pub mod throughput;
