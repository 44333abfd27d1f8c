use std::fmt;
use std::fmt::Debug;
use std::str::FromStr;

use serde::Deserialize;

/// A unique ID of every node in a simulation run. IDs are dense and start at zero so that
/// they double as an index into the node population.
#[derive(Deserialize, Default, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.parse::<u32>()?;
        Ok(Self(id))
    }
}

impl From<u32> for NodeId {
    fn from(f: u32) -> Self {
        Self(f)
    }
}

impl From<usize> for NodeId {
    fn from(f: usize) -> Self {
        Self(f as u32)
    }
}

impl NodeId {
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn as_u64(&self) -> u64 {
        self.0 as u64
    }

    pub fn as_index(&self) -> usize {
        self.0 as usize
    }
}

/// The part a node plays in the traffic pattern of a run. Sinks receive, sources send and
/// every other node only relays.
#[derive(Deserialize, Debug, Hash, Copy, Default, Clone, PartialEq, Eq)]
pub enum NodeRole {
    #[default]
    Relay,
    Sink,
    Source,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::Relay => write!(f, "Relay"),
            NodeRole::Sink => write!(f, "Sink"),
            NodeRole::Source => write!(f, "Source"),
        }
    }
}
