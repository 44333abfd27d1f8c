use manetsim_core::node::NodeId;

use crate::net::topology::Topology;

/// Picks the neighbour within `range` that is closest to the destination, provided it is
/// strictly closer than this node. `None` means the packet is stuck in a local minimum.
pub fn greedy_next_hop(
    me: NodeId,
    destination: NodeId,
    topology: &Topology,
    range: f64,
) -> Option<NodeId> {
    let target = topology.position_of(destination)?;
    let own_distance = topology.position_of(me)?.distance(&target);
    topology
        .neighbors_of(me, range)
        .into_iter()
        .filter_map(|neighbor| {
            let position = topology.position_of(neighbor.node_id)?;
            Some((neighbor.node_id, position.distance(&target)))
        })
        .filter(|(_, distance)| *distance < own_distance)
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(node_id, _)| node_id)
}

/// Geographic forwarding over a fixed radio range.
#[derive(Clone, Debug)]
pub struct GreedyRouter {
    range: f64,
}

impl GreedyRouter {
    pub fn new(range: f64) -> Self {
        Self { range }
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    pub fn next_hop(&self, me: NodeId, destination: NodeId, topology: &Topology) -> Option<NodeId> {
        greedy_next_hop(me, destination, topology, self.range)
    }
}
