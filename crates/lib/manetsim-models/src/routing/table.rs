use std::collections::VecDeque;

use hashbrown::HashMap;

use manetsim_core::node::NodeId;

use crate::net::topology::Topology;
use crate::routing::kind::RoutingKind;

/// Stand-in for the topology-aware baselines. Paths are the hop-count shortest paths over
/// the current unit-disk graph, so the baselines differ only in their name.
#[derive(Clone, Debug)]
pub struct TableRouter {
    kind: RoutingKind,
    range: f64,
}

impl TableRouter {
    pub fn new(kind: RoutingKind, range: f64) -> Self {
        Self { kind, range }
    }

    pub fn kind(&self) -> RoutingKind {
        self.kind
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    /// First hop of a shortest path, found by breadth-first search from this node.
    pub fn next_hop(&self, me: NodeId, destination: NodeId, topology: &Topology) -> Option<NodeId> {
        if me == destination {
            return Some(me);
        }
        let mut parents: HashMap<NodeId, NodeId> = HashMap::new();
        let mut frontier = VecDeque::from([me]);
        parents.insert(me, me);
        while let Some(current) = frontier.pop_front() {
            for neighbor in topology.neighbors_of(current, self.range) {
                if parents.contains_key(&neighbor.node_id) {
                    continue;
                }
                parents.insert(neighbor.node_id, current);
                if neighbor.node_id == destination {
                    return first_hop(&parents, me, destination);
                }
                frontier.push_back(neighbor.node_id);
            }
        }
        None
    }
}

fn first_hop(parents: &HashMap<NodeId, NodeId>, me: NodeId, destination: NodeId) -> Option<NodeId> {
    let mut hop = destination;
    loop {
        let parent = *parents.get(&hop)?;
        if parent == me {
            return Some(hop);
        }
        hop = parent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mobility::Point2D;

    #[test]
    fn out_of_range_destination_is_reached_through_a_relay() {
        let topology = Topology::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, 50.0),
            Point2D::new(60.0, 60.0),
        ]);
        let router = TableRouter::new(RoutingKind::Olsr, 65.0);
        assert_eq!(
            router.next_hop(NodeId::from(0u32), NodeId::from(2u32), &topology),
            Some(NodeId::from(1u32))
        );
    }

    #[test]
    fn disconnected_destination_has_no_route() {
        let topology = Topology::new(vec![Point2D::new(0.0, 0.0), Point2D::new(500.0, 0.0)]);
        let router = TableRouter::new(RoutingKind::Aodv, 100.0);
        assert_eq!(
            router.next_hop(NodeId::from(0u32), NodeId::from(1u32), &topology),
            None
        );
    }
}
