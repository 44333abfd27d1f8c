use serde::Deserialize;

use manetsim_core::model::{Model, ModelSettings};

/// Smoothed values closer than this to a sample are snapped onto it.
const SNAP_DB: f64 = 0.01;

#[derive(Deserialize, Debug, Clone)]
pub struct RoutingSettings {
    #[serde(default = "default_smoothing")]
    pub smoothing: f64,
    #[serde(default = "default_saturation_margin")]
    pub saturation_margin: f64,
    #[serde(default = "default_floor_fraction")]
    pub floor_fraction: f64,
    #[serde(default = "default_max_hops")]
    pub max_hops: u8,
}

fn default_smoothing() -> f64 {
    0.25
}

fn default_saturation_margin() -> f64 {
    20.0
}

fn default_floor_fraction() -> f64 {
    0.5
}

fn default_max_hops() -> u8 {
    64
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            smoothing: default_smoothing(),
            saturation_margin: default_saturation_margin(),
            floor_fraction: default_floor_fraction(),
            max_hops: default_max_hops(),
        }
    }
}

impl ModelSettings for RoutingSettings {}

/// Maps received power reports onto a fraction of the nominal range.
///
/// The reports are smoothed exponentially. The margin of the smoothed power above the
/// receiver sensitivity scales the range linearly between `floor` and the full nominal
/// range, which is reached at `saturation_margin` dB. Equal samples settle on one value
/// after a bounded number of reports because of the snapping.
#[derive(Clone, Debug)]
pub struct RangePolicy {
    smoothing: f64,
    saturation_margin: f64,
    floor: f64,
    smoothed: Option<f64>,
}

impl Model for RangePolicy {
    type Settings = RoutingSettings;

    fn with_settings(settings: &RoutingSettings) -> Self {
        Self {
            smoothing: settings.smoothing.clamp(f64::EPSILON, 1.0),
            saturation_margin: settings.saturation_margin.max(f64::EPSILON),
            floor: settings.floor_fraction.clamp(0.0, 1.0),
            smoothed: None,
        }
    }
}

impl RangePolicy {
    pub fn observe(&mut self, rx_power: f64) -> f64 {
        let next = match self.smoothed {
            None => rx_power,
            Some(current) if (rx_power - current).abs() < SNAP_DB => rx_power,
            Some(current) => current + self.smoothing * (rx_power - current),
        };
        self.smoothed = Some(next);
        next
    }

    pub fn smoothed(&self) -> Option<f64> {
        self.smoothed
    }

    /// Fraction of the nominal range to use. Without any report the full range is kept.
    pub fn fraction(&self, rx_sensitivity: f64) -> f64 {
        match self.smoothed {
            None => 1.0,
            Some(power) => {
                let margin = power - rx_sensitivity;
                let scaled = self.floor + (1.0 - self.floor) * margin / self.saturation_margin;
                scaled.clamp(self.floor, 1.0)
            }
        }
    }

    pub fn reset(&mut self) {
        self.smoothed = None;
    }
}
