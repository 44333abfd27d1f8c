use manetsim_core::node::NodeId;

use crate::device::phy::WifiPhy;

#[derive(Clone, Debug)]
pub enum NetDevice {
    Wifi(WifiPhy),
    Loopback,
}

impl NetDevice {
    pub fn wifi_phy(&self) -> Option<&WifiPhy> {
        match self {
            NetDevice::Wifi(phy) => Some(phy),
            NetDevice::Loopback => None,
        }
    }

    pub fn wifi_phy_mut(&mut self) -> Option<&mut WifiPhy> {
        match self {
            NetDevice::Wifi(phy) => Some(phy),
            NetDevice::Loopback => None,
        }
    }
}

/// Refers to the device installed on a node. The devices themselves stay with the nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceHandle {
    pub node: NodeId,
}

#[derive(Clone, Debug, Default)]
pub struct DeviceContainer {
    handles: Vec<DeviceHandle>,
}

impl DeviceContainer {
    pub fn add(&mut self, handle: DeviceHandle) {
        self.handles.push(handle);
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceHandle> {
        self.handles.iter()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl FromIterator<DeviceHandle> for DeviceContainer {
    fn from_iter<I: IntoIterator<Item = DeviceHandle>>(iter: I) -> Self {
        Self {
            handles: iter.into_iter().collect(),
        }
    }
}
