use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};

use hashbrown::HashMap;
use log::debug;

use manetsim_core::error::ConfigError;
use manetsim_core::node::NodeId;

use crate::device::netdevice::DeviceContainer;
use crate::device::node::Node;

/// Address of the peer a packet was received from, as seen by the receiving socket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SenderAddress {
    Inet(SocketAddrV4),
    Unknown,
}

impl fmt::Display for SenderAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SenderAddress::Inet(address) => write!(f, "{}", address.ip()),
            SenderAddress::Unknown => write!(f, "unknown"),
        }
    }
}

/// Maps every assigned address back to the node that owns it.
#[derive(Clone, Debug, Default)]
pub struct AddressBook {
    owners: HashMap<Ipv4Addr, NodeId>,
}

impl AddressBook {
    pub fn insert(&mut self, address: Ipv4Addr, node_id: NodeId) {
        self.owners.insert(address, node_id);
    }

    pub fn node_of(&self, address: &Ipv4Addr) -> Option<NodeId> {
        self.owners.get(address).copied()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Hands out consecutive host addresses of one subnet to network devices.
#[derive(Clone, Debug)]
pub struct AddressHelper {
    network: u32,
    prefix_len: u8,
    next_host: u32,
}

impl AddressHelper {
    pub fn new(base: Ipv4Addr, prefix_len: u8) -> Self {
        let mask = Self::mask(prefix_len);
        Self {
            network: u32::from(base) & mask,
            prefix_len,
            next_host: 1,
        }
    }

    fn mask(prefix_len: u8) -> u32 {
        match prefix_len {
            0 => 0,
            len => u32::MAX << (32 - u32::from(len.min(32))),
        }
    }

    /// Number of host addresses the subnet can hand out in total.
    pub fn capacity(&self) -> u32 {
        let host_bits = 32 - u32::from(self.prefix_len.min(32));
        if host_bits < 2 {
            return 0;
        }
        (1u32 << host_bits) - 2
    }

    pub fn next_address(&mut self) -> Result<Ipv4Addr, ConfigError> {
        if self.next_host > self.capacity() {
            return Err(ConfigError::Settings(format!(
                "subnet /{} has no free host address left",
                self.prefix_len
            )));
        }
        let address = Ipv4Addr::from(self.network | self.next_host);
        self.next_host += 1;
        Ok(address)
    }

    pub fn assign(
        &mut self,
        nodes: &mut [Node],
        devices: &DeviceContainer,
    ) -> Result<AddressBook, ConfigError> {
        let mut book = AddressBook::default();
        for handle in devices.iter() {
            let node = nodes
                .get_mut(handle.node.as_index())
                .ok_or(ConfigError::UnknownNode(handle.node))?;
            let address = self.next_address()?;
            debug!("Assigning address {} to node {}", address, node.id());
            node.address = Some(address);
            book.insert(address, node.id());
        }
        Ok(book)
    }
}
