use rand::Rng;
use rand_distr::{Distribution, Gamma};
use serde::Deserialize;

use manetsim_core::bucket::TimeUS;
use manetsim_core::error::ConfigError;
use manetsim_core::model::{Model, ModelSettings};

const SPEED_OF_LIGHT: f64 = 299_792_458.0;
const FADING_HEADROOM_DB: f64 = 10.0;

#[derive(Deserialize, Debug, Clone)]
pub struct PhySettings {
    #[serde(default = "default_rx_sensitivity")]
    pub rx_sensitivity: f64,
    #[serde(default = "default_path_loss_exponent")]
    pub path_loss_exponent: f64,
    #[serde(default = "default_reference_loss")]
    pub reference_loss: f64,
    pub nakagami_m: Option<f64>,
    #[serde(default = "default_data_rate")]
    pub data_rate: f64,
}

fn default_rx_sensitivity() -> f64 {
    -96.0
}

fn default_path_loss_exponent() -> f64 {
    3.0
}

fn default_reference_loss() -> f64 {
    46.6777
}

fn default_data_rate() -> f64 {
    6_000_000.0
}

impl Default for PhySettings {
    fn default() -> Self {
        Self {
            rx_sensitivity: default_rx_sensitivity(),
            path_loss_exponent: default_path_loss_exponent(),
            reference_loss: default_reference_loss(),
            nakagami_m: None,
            data_rate: default_data_rate(),
        }
    }
}

impl PhySettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.data_rate.is_finite() && self.data_rate > 0.0) {
            return Err(ConfigError::Settings(format!(
                "data rate {} bit/s is not positive",
                self.data_rate
            )));
        }
        match self.nakagami_m {
            Some(m) if !(m.is_finite() && m > 0.0) => Err(ConfigError::Settings(format!(
                "nakagami shape {} is not positive",
                m
            ))),
            _ => Ok(()),
        }
    }
}

impl ModelSettings for PhySettings {}

/// Deterministic part of the link budget: log-distance loss against a fixed sensitivity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkBudget {
    pub reference_loss: f64,
    pub exponent: f64,
    pub rx_sensitivity: f64,
}

impl LinkBudget {
    pub fn path_loss(&self, distance: f64) -> f64 {
        if distance <= 1.0 {
            return self.reference_loss;
        }
        self.reference_loss + 10.0 * self.exponent * distance.log10()
    }

    /// Distance at which a transmission at `tx_power` fades down to the sensitivity.
    pub fn range_for(&self, tx_power: f64) -> f64 {
        let margin = tx_power - self.reference_loss - self.rx_sensitivity;
        10f64.powf(margin / (10.0 * self.exponent)).max(1.0)
    }
}

/// Log-distance propagation with optional Nakagami-m fading.
#[derive(Clone, Debug)]
pub struct LogDistanceChannel {
    budget: LinkBudget,
    fading: Option<Gamma<f64>>,
    data_rate: f64,
}

impl Model for LogDistanceChannel {
    type Settings = PhySettings;

    fn with_settings(settings: &PhySettings) -> Self {
        let fading = settings
            .nakagami_m
            .filter(|m| *m > 0.0)
            .and_then(|m| Gamma::new(m, 1.0 / m).ok());
        Self {
            budget: LinkBudget {
                reference_loss: settings.reference_loss,
                exponent: settings.path_loss_exponent,
                rx_sensitivity: settings.rx_sensitivity,
            },
            fading,
            data_rate: settings.data_rate,
        }
    }
}

impl LogDistanceChannel {
    pub fn budget(&self) -> LinkBudget {
        self.budget
    }

    pub fn rx_power<R: Rng>(&self, tx_power: f64, distance: f64, rng: &mut R) -> f64 {
        let mean = tx_power - self.budget.path_loss(distance);
        match &self.fading {
            Some(gamma) => mean + 10.0 * gamma.sample(rng).max(f64::MIN_POSITIVE).log10(),
            None => mean,
        }
    }

    /// Radius beyond which no frame can be received, fading included.
    pub fn reach(&self, tx_power: f64) -> f64 {
        match self.fading {
            Some(_) => self.budget.range_for(tx_power + FADING_HEADROOM_DB),
            None => self.budget.range_for(tx_power),
        }
    }

    pub fn hop_delay(&self, bytes: u32, distance: f64) -> TimeUS {
        let serialisation = f64::from(bytes) * 8.0 / self.data_rate;
        TimeUS::from_secs_f64(serialisation + distance / SPEED_OF_LIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeded_rng;

    #[test]
    fn range_inverts_the_path_loss() {
        let channel = LogDistanceChannel::with_settings(&PhySettings::default());
        let budget = channel.budget();
        let range = budget.range_for(20.0);
        let at_edge = 20.0 - budget.path_loss(range);
        assert!((at_edge - budget.rx_sensitivity).abs() < 1e-9);
        assert!(range > 200.0 && range < 210.0);
    }

    #[test]
    fn received_power_drops_with_distance() {
        let channel = LogDistanceChannel::with_settings(&PhySettings::default());
        let mut rng = seeded_rng(1);
        let near = channel.rx_power(20.0, 10.0, &mut rng);
        let far = channel.rx_power(20.0, 100.0, &mut rng);
        assert!(near > far);
        assert!((near - far - 30.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_rates_and_shapes_are_rejected() {
        assert!(PhySettings::default().validate().is_ok());
        let zero_rate = PhySettings {
            data_rate: 0.0,
            ..Default::default()
        };
        assert!(zero_rate.validate().is_err());
        let bad_shape = PhySettings {
            nakagami_m: Some(-1.0),
            ..Default::default()
        };
        assert!(bad_shape.validate().is_err());
        let fading = PhySettings {
            nakagami_m: Some(1.0),
            ..Default::default()
        };
        assert!(fading.validate().is_ok());
    }

    #[test]
    fn hop_delay_covers_serialisation() {
        let channel = LogDistanceChannel::with_settings(&PhySettings::default());
        assert_eq!(channel.hop_delay(750, 0.0), TimeUS::from(1000u64));
    }
}
