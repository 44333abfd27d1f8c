pub mod address;
pub mod chain;
pub mod feedback;
pub mod packet;
pub mod topology;
pub mod transport;
