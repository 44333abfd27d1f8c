use std::net::Ipv4Addr;

use thiserror::Error;

use crate::node::NodeId;

/// Errors that make the results of a run meaningless. None of these are recoverable, every
/// one of them aborts the whole sweep.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no such protocol: {0}")]
    UnknownProtocol(u32),
    #[error("invalid sweep bounds: {0}")]
    InvalidSweep(String),
    #[error("node {0} has no routing instance aggregated")]
    MissingRouting(NodeId),
    #[error("node {0} has no transport protocol installed")]
    MissingTransport(NodeId),
    #[error("node {0} has no wifi phy to report reception power")]
    MissingWifiPhy(NodeId),
    #[error("transport of node {0} is already spliced to its router")]
    AlreadySpliced(NodeId),
    #[error("node {0} already has a routing instance aggregated")]
    RoutingAlreadyAggregated(NodeId),
    #[error("router of node {node} cannot {operation} while {state}")]
    InvalidRouterState {
        node: NodeId,
        operation: &'static str,
        state: String,
    },
    #[error("node {0} is not part of the simulation")]
    UnknownNode(NodeId),
    #[error("no node owns address {0}")]
    UnknownAddress(Ipv4Addr),
    #[error("invalid settings: {0}")]
    Settings(String),
}
