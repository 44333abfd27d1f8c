use std::fmt::{Display, Formatter};

use manetsim_core::error::ConfigError;

/// The routing protocols a sweep can compare, keyed by their integer selector.
#[derive(Debug, Hash, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum RoutingKind {
    Olsr = 1,
    Aodv = 2,
    Dsdv = 3,
    Dsr = 4,
    Gpsr = 5,
    PowerGpsr = 6,
}

impl TryFrom<u32> for RoutingKind {
    type Error = ConfigError;

    fn try_from(selector: u32) -> Result<Self, Self::Error> {
        match selector {
            1 => Ok(RoutingKind::Olsr),
            2 => Ok(RoutingKind::Aodv),
            3 => Ok(RoutingKind::Dsdv),
            4 => Ok(RoutingKind::Dsr),
            5 => Ok(RoutingKind::Gpsr),
            6 => Ok(RoutingKind::PowerGpsr),
            _ => Err(ConfigError::UnknownProtocol(selector)),
        }
    }
}

impl Display for RoutingKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingKind::Olsr => write!(f, "OLSR"),
            RoutingKind::Aodv => write!(f, "AODV"),
            RoutingKind::Dsdv => write!(f, "DSDV"),
            RoutingKind::Dsr => write!(f, "DSR"),
            RoutingKind::Gpsr => write!(f, "GPSR"),
            RoutingKind::PowerGpsr => write!(f, "MYGPSR"),
        }
    }
}

impl RoutingKind {
    pub fn selector(&self) -> u32 {
        *self as u32
    }

    /// Only this variant goes through the splice and the feedback wiring.
    pub fn is_cross_layer(&self) -> bool {
        matches!(self, RoutingKind::PowerGpsr)
    }

    pub fn is_geographic(&self) -> bool {
        matches!(self, RoutingKind::Gpsr | RoutingKind::PowerGpsr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_map_to_names() {
        let names: Vec<String> = (1..=6)
            .map(|s| RoutingKind::try_from(s).unwrap().to_string())
            .collect();
        assert_eq!(names, ["OLSR", "AODV", "DSDV", "DSR", "GPSR", "MYGPSR"]);
        assert_eq!(RoutingKind::PowerGpsr.selector(), 6);
    }

    #[test]
    fn unknown_selector_is_fatal() {
        assert!(matches!(
            RoutingKind::try_from(0),
            Err(ConfigError::UnknownProtocol(0))
        ));
        assert!(matches!(
            RoutingKind::try_from(7),
            Err(ConfigError::UnknownProtocol(7))
        ));
    }
}
