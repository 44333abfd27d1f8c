pub mod channel;
pub mod mobility;
pub mod netdevice;
pub mod node;
pub mod phy;
