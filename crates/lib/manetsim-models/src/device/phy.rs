use typed_builder::TypedBuilder;

use crate::net::feedback::{FeedbackTarget, PowerRangeSample};
use crate::net::packet::Packet;

/// The Wi-Fi PHY of a node. On every successful reception it reports the packet and its
/// received power to the cross-layer target, if one is set.
#[derive(Clone, Debug, TypedBuilder)]
pub struct WifiPhy {
    pub tx_power: f64,
    pub rx_sensitivity: f64,
    #[builder(default)]
    cross_layer: Option<FeedbackTarget>,
    #[builder(default)]
    rx_count: u64,
}

impl WifiPhy {
    /// Replaces any previously set target.
    pub fn set_cross_layer(&mut self, target: FeedbackTarget) {
        self.cross_layer = Some(target);
    }

    pub fn cross_layer(&self) -> Option<FeedbackTarget> {
        self.cross_layer
    }

    pub fn can_receive(&self, rx_power: f64) -> bool {
        rx_power >= self.rx_sensitivity
    }

    pub fn rx_count(&self) -> u64 {
        self.rx_count
    }

    pub fn receive(&mut self, packet: &Packet, rx_power: f64) -> Option<(FeedbackTarget, PowerRangeSample)> {
        self.rx_count += 1;
        self.cross_layer.map(|target| {
            (
                target,
                PowerRangeSample {
                    packet_uid: packet.uid,
                    rx_power,
                },
            )
        })
    }
}
