use log::{debug, info};

use manetsim_core::error::ConfigError;
use manetsim_core::model::Model;

use crate::device::channel::LinkBudget;
use crate::device::netdevice::DeviceContainer;
use crate::device::node::Node;
use crate::net::chain::splice_routing;
use crate::net::feedback::wire_feedback;
use crate::routing::greedy::GreedyRouter;
use crate::routing::kind::RoutingKind;
use crate::routing::policy::{RangePolicy, RoutingSettings};
use crate::routing::power::{PowerAdaptiveRouter, RouterState};
use crate::routing::table::TableRouter;
use crate::routing::RoutingProtocol;

/// Creates, aggregates and wires the power-adaptive router for a whole population.
#[derive(Clone, Debug)]
pub struct PowerRoutingHelper {
    tx_power: f64,
    budget: LinkBudget,
    settings: RoutingSettings,
}

impl PowerRoutingHelper {
    pub fn new(tx_power: f64, budget: LinkBudget, settings: RoutingSettings) -> Self {
        Self {
            tx_power,
            budget,
            settings,
        }
    }

    pub fn create(&self) -> Result<RoutingProtocol, ConfigError> {
        let mut router =
            PowerAdaptiveRouter::new(self.budget, RangePolicy::with_settings(&self.settings));
        router.configure(self.tx_power)?;
        Ok(RoutingProtocol::PowerAdaptive(router))
    }

    pub fn aggregate(&self, nodes: &mut [Node]) -> Result<(), ConfigError> {
        for node in nodes.iter_mut() {
            node.aggregate_routing(self.create()?)?;
        }
        Ok(())
    }

    /// Splices every router under its node's transport and points the node's PHY at it.
    ///
    /// `devices` runs parallel to `nodes`. A handle only fixes which node is paired with
    /// which position in the sequence; the PHY itself is the one held by that node, since
    /// a node carries a single device. Each node is handled on its own, so the order of
    /// the nodes does not change the result. Any node left without an active router
    /// aborts the installation.
    pub fn install(&self, nodes: &mut [Node], devices: &DeviceContainer) -> Result<(), ConfigError> {
        if nodes.len() != devices.len() {
            return Err(ConfigError::Settings(format!(
                "{} nodes but {} device handles",
                nodes.len(),
                devices.len()
            )));
        }
        for (node, handle) in nodes.iter_mut().zip(devices.iter()) {
            if handle.node != node.id() {
                return Err(ConfigError::UnknownNode(handle.node));
            }
            splice_routing(node)?;
            wire_feedback(node)?;
            match node.power_router().map(PowerAdaptiveRouter::state) {
                Some(RouterState::Active) => debug!("Node {} wired", node.id()),
                Some(state) => {
                    return Err(ConfigError::InvalidRouterState {
                        node: node.id(),
                        operation: "activate",
                        state: state.to_string(),
                    })
                }
                None => return Err(ConfigError::MissingRouting(node.id())),
            }
        }
        info!("Power-adaptive routing installed on {} nodes", nodes.len());
        Ok(())
    }
}

/// Installs the comparison baselines. They need no splice and no feedback.
#[derive(Clone, Debug)]
pub struct BaselineHelper {
    kind: RoutingKind,
    range: f64,
}

impl BaselineHelper {
    pub fn new(kind: RoutingKind, range: f64) -> Self {
        Self { kind, range }
    }

    pub fn create(&self) -> Result<RoutingProtocol, ConfigError> {
        match self.kind {
            RoutingKind::Olsr | RoutingKind::Aodv | RoutingKind::Dsdv | RoutingKind::Dsr => Ok(
                RoutingProtocol::Table(TableRouter::new(self.kind, self.range)),
            ),
            RoutingKind::Gpsr => Ok(RoutingProtocol::Greedy(GreedyRouter::new(self.range))),
            RoutingKind::PowerGpsr => Err(ConfigError::Settings(format!(
                "{} is installed through the cross-layer installer",
                self.kind
            ))),
        }
    }

    pub fn install(&self, nodes: &mut [Node]) -> Result<(), ConfigError> {
        for node in nodes.iter_mut() {
            node.aggregate_routing(self.create()?)?;
        }
        info!("{} installed on {} nodes", self.kind, nodes.len());
        Ok(())
    }
}
