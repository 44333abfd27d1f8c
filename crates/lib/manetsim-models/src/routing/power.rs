use std::fmt::{Display, Formatter};

use log::{debug, trace};

use manetsim_core::error::ConfigError;
use manetsim_core::node::NodeId;

use crate::device::channel::LinkBudget;
use crate::device::mobility::Point2D;
use crate::net::chain::{DownTarget, Segment};
use crate::net::feedback::PowerRangeSample;
use crate::net::packet::{GeoHeader, Header, Packet};
use crate::net::topology::Topology;
use crate::routing::greedy::greedy_next_hop;
use crate::routing::policy::RangePolicy;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum RouterState {
    #[default]
    Uninstalled,
    Installed,
    Active,
    TornDown,
}

impl Display for RouterState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterState::Uninstalled => write!(f, "Uninstalled"),
            RouterState::Installed => write!(f, "Installed"),
            RouterState::Active => write!(f, "Active"),
            RouterState::TornDown => write!(f, "TornDown"),
        }
    }
}

/// The per-node state of the power-adaptive geographic router.
///
/// The router becomes `Active` once it has a down target and its PHY reports to it.
/// Only then does it accept feedback and attach headers.
#[derive(Clone, Debug)]
pub struct PowerAdaptiveRouter {
    node: Option<NodeId>,
    state: RouterState,
    tx_power: f64,
    budget: LinkBudget,
    policy: RangePolicy,
    nominal_range: f64,
    range: f64,
    down_target: Option<DownTarget>,
    feedback_wired: bool,
    samples: u64,
}

impl PowerAdaptiveRouter {
    pub fn new(budget: LinkBudget, policy: RangePolicy) -> Self {
        Self {
            node: None,
            state: RouterState::Uninstalled,
            tx_power: 0.0,
            budget,
            policy,
            nominal_range: 0.0,
            range: 0.0,
            down_target: None,
            feedback_wired: false,
            samples: 0,
        }
    }

    fn node_id(&self) -> NodeId {
        self.node.unwrap_or_default()
    }

    fn invalid(&self, operation: &'static str) -> ConfigError {
        ConfigError::InvalidRouterState {
            node: self.node_id(),
            operation,
            state: self.state.to_string(),
        }
    }

    pub fn configure(&mut self, tx_power: f64) -> Result<(), ConfigError> {
        match self.state {
            RouterState::Uninstalled | RouterState::Installed => {}
            _ => return Err(self.invalid("configure")),
        }
        self.tx_power = tx_power;
        self.nominal_range = self.budget.range_for(tx_power);
        self.range = self.nominal_range;
        self.policy.reset();
        Ok(())
    }

    pub fn mark_installed(&mut self, node_id: NodeId) -> Result<(), ConfigError> {
        if self.state != RouterState::Uninstalled {
            return Err(self.invalid("aggregate"));
        }
        self.node = Some(node_id);
        self.state = RouterState::Installed;
        Ok(())
    }

    /// Replaces the current down target. Pointing the router at itself is refused.
    pub fn set_down_target(&mut self, target: DownTarget) -> Result<(), ConfigError> {
        if self.state != RouterState::Installed {
            return Err(self.invalid("set down target"));
        }
        if target == DownTarget::RoutingAddHeaders {
            return Err(ConfigError::AlreadySpliced(self.node_id()));
        }
        self.down_target = Some(target);
        self.try_activate();
        Ok(())
    }

    pub fn wire_feedback(&mut self) -> Result<(), ConfigError> {
        match self.state {
            RouterState::Installed | RouterState::Active => {}
            _ => return Err(self.invalid("wire feedback")),
        }
        self.feedback_wired = true;
        self.try_activate();
        Ok(())
    }

    fn try_activate(&mut self) {
        if self.state == RouterState::Installed && self.down_target.is_some() && self.feedback_wired {
            self.state = RouterState::Active;
            debug!(
                "Router of node {} active, nominal range {:.1} m",
                self.node_id(),
                self.nominal_range
            );
        }
    }

    /// Recomputes the effective range from one reception report. Reports outside the
    /// active state are dropped.
    pub fn on_feedback(&mut self, sample: PowerRangeSample) {
        if self.state != RouterState::Active {
            trace!(
                "Router of node {} ignores feedback while {}",
                self.node_id(),
                self.state
            );
            return;
        }
        self.policy.observe(sample.rx_power);
        self.range = self.nominal_range * self.policy.fraction(self.budget.rx_sensitivity);
        self.samples += 1;
    }

    /// Prepends the geographic header and returns the segment together with the target
    /// it must be forwarded to.
    pub fn add_headers(
        &mut self,
        mut segment: Segment,
        position: Point2D,
    ) -> Result<(DownTarget, Segment), ConfigError> {
        if self.state != RouterState::Active {
            return Err(self.invalid("add headers"));
        }
        let target = self.down_target.ok_or_else(|| self.invalid("add headers"))?;
        segment.packet.add_header(Header::Geo(
            GeoHeader::builder()
                .origin(position)
                .tx_power(self.tx_power)
                .build(),
        ));
        Ok((target, segment))
    }

    pub fn remove_headers(&self, packet: &mut Packet) {
        if let Some(Header::Geo(_)) = packet.peek_header() {
            packet.remove_header();
        }
    }

    pub fn next_hop(&self, me: NodeId, destination: NodeId, topology: &Topology) -> Option<NodeId> {
        greedy_next_hop(me, destination, topology, self.range)
    }

    pub fn teardown(&mut self) {
        self.state = RouterState::TornDown;
        self.down_target = None;
        self.feedback_wired = false;
    }

    pub fn state(&self) -> RouterState {
        self.state
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    pub fn nominal_range(&self) -> f64 {
        self.nominal_range
    }

    pub fn tx_power(&self) -> f64 {
        self.tx_power
    }

    pub fn down_target(&self) -> Option<DownTarget> {
        self.down_target
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }
}
