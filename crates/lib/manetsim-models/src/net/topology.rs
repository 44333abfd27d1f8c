use kiddo::{KdTree, NearestNeighbour, SquaredEuclidean};

use manetsim_core::node::NodeId;

use crate::device::mobility::Point2D;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub node_id: NodeId,
    pub distance: f64,
}

/// Snapshot of node positions, indexed for range queries. Rebuilt whenever the nodes move.
#[derive(Debug, Default)]
pub struct Topology {
    positions: Vec<Point2D>,
    tree: KdTree<f64, 2>,
}

impl Topology {
    /// Positions must be given in node ID order.
    pub fn new(positions: Vec<Point2D>) -> Self {
        let mut topology = Self::default();
        topology.rebuild(positions);
        topology
    }

    pub fn rebuild(&mut self, positions: Vec<Point2D>) {
        self.tree = KdTree::default();
        positions.iter().enumerate().for_each(|(idx, position)| {
            self.tree.add(&position.as_array(), idx as u64);
        });
        self.positions = positions;
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position_of(&self, node_id: NodeId) -> Option<Point2D> {
        self.positions.get(node_id.as_index()).copied()
    }

    /// Nodes within `radius` of the given point, nearest first.
    pub fn within_point(&self, point: &Point2D, radius: f64) -> Vec<Neighbor> {
        let found: Vec<NearestNeighbour<f64, u64>> = self
            .tree
            .within::<SquaredEuclidean>(&point.as_array(), radius * radius);
        found
            .into_iter()
            .map(|neighbour| Neighbor {
                node_id: NodeId::from(neighbour.item as u32),
                distance: neighbour.distance.sqrt(),
            })
            .collect()
    }

    /// Nodes within `radius` of the given node, excluding the node itself.
    pub fn neighbors_of(&self, node_id: NodeId, radius: f64) -> Vec<Neighbor> {
        let position = match self.position_of(node_id) {
            Some(position) => position,
            None => return Vec::new(),
        };
        self.within_point(&position, radius)
            .into_iter()
            .filter(|neighbor| neighbor.node_id != node_id)
            .collect()
    }
}
