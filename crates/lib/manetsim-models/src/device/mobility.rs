use std::f64::consts::PI;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Deserialize;
use typed_builder::TypedBuilder;

use manetsim_core::error::ConfigError;

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, TypedBuilder)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

/// The rectangular field the nodes move in.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldSettings {
    pub width: f64,
    pub height: f64,
}

impl FieldSettings {
    /// Both sides must be finite and positive for positions to be drawn from the field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid = |side: f64| side.is_finite() && side > 0.0;
        if valid(self.width) && valid(self.height) {
            Ok(())
        } else {
            Err(ConfigError::Settings(format!(
                "field of {} x {} m is not a usable area",
                self.width, self.height
            )))
        }
    }

    pub fn random_position<R: Rng>(&self, rng: &mut R) -> Point2D {
        Point2D::new(
            rng.gen_range(0.0..=self.width),
            rng.gen_range(0.0..=self.height),
        )
    }
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MobilityType {
    #[default]
    Static,
    GaussMarkov,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MobilitySettings {
    pub mobility_type: MobilityType,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_min_speed")]
    pub min_speed: f64,
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,
    #[serde(default = "default_direction_std_dev")]
    pub direction_std_dev: f64,
}

fn default_alpha() -> f64 {
    0.85
}

fn default_min_speed() -> f64 {
    14.0
}

fn default_max_speed() -> f64 {
    23.0
}

fn default_direction_std_dev() -> f64 {
    0.2f64.sqrt()
}

impl Default for MobilitySettings {
    fn default() -> Self {
        Self {
            mobility_type: MobilityType::Static,
            alpha: default_alpha(),
            min_speed: default_min_speed(),
            max_speed: default_max_speed(),
            direction_std_dev: default_direction_std_dev(),
        }
    }
}

/// Gauss-Markov mobility: speed and heading are pulled towards per-node means with memory
/// `alpha`, the heading additionally receives Gaussian noise. Nodes bounce off the field edges.
#[derive(Clone, Debug)]
pub struct GaussMarkov {
    alpha: f64,
    speed: f64,
    direction: f64,
    mean_speed: f64,
    mean_direction: f64,
    direction_noise: Normal<f64>,
}

impl GaussMarkov {
    pub fn new<R: Rng>(settings: &MobilitySettings, rng: &mut R) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&settings.alpha) {
            return Err(ConfigError::Settings(format!(
                "gauss-markov alpha {} is outside [0, 1]",
                settings.alpha
            )));
        }
        if settings.min_speed > settings.max_speed || settings.min_speed < 0.0 {
            return Err(ConfigError::Settings(format!(
                "invalid speed range [{}, {}]",
                settings.min_speed, settings.max_speed
            )));
        }
        let direction_noise = Normal::new(0.0, settings.direction_std_dev)
            .map_err(|e| ConfigError::Settings(format!("direction noise: {}", e)))?;
        let mean_speed = rng.gen_range(settings.min_speed..=settings.max_speed);
        let mean_direction = rng.gen_range(0.0..2.0 * PI);
        Ok(Self {
            alpha: settings.alpha,
            speed: mean_speed,
            direction: mean_direction,
            mean_speed,
            mean_direction,
            direction_noise,
        })
    }

    pub fn advance<R: Rng>(
        &mut self,
        position: Point2D,
        elapsed: f64,
        field: &FieldSettings,
        rng: &mut R,
    ) -> Point2D {
        let memory = (1.0 - self.alpha * self.alpha).sqrt();
        self.speed = self.alpha * self.speed + (1.0 - self.alpha) * self.mean_speed;
        self.direction = self.alpha * self.direction
            + (1.0 - self.alpha) * self.mean_direction
            + memory * self.direction_noise.sample(rng);

        let mut next = Point2D::new(
            position.x + self.speed * elapsed * self.direction.cos(),
            position.y + self.speed * elapsed * self.direction.sin(),
        );

        if next.x < 0.0 || next.x > field.width {
            next.x = reflect(next.x, field.width);
            self.direction = PI - self.direction;
            self.mean_direction = PI - self.mean_direction;
        }
        if next.y < 0.0 || next.y > field.height {
            next.y = reflect(next.y, field.height);
            self.direction = -self.direction;
            self.mean_direction = -self.mean_direction;
        }
        next
    }
}

fn reflect(value: f64, limit: f64) -> f64 {
    if limit <= 0.0 {
        return 0.0;
    }
    let folded = value.rem_euclid(2.0 * limit);
    if folded > limit {
        2.0 * limit - folded
    } else {
        folded
    }
}

#[derive(Clone, Debug, Default)]
pub enum Mobility {
    #[default]
    Static,
    GaussMarkov(GaussMarkov),
}

impl Mobility {
    pub fn new<R: Rng>(settings: &MobilitySettings, rng: &mut R) -> Result<Self, ConfigError> {
        match settings.mobility_type {
            MobilityType::Static => Ok(Mobility::Static),
            MobilityType::GaussMarkov => Ok(Mobility::GaussMarkov(GaussMarkov::new(settings, rng)?)),
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, Mobility::Static)
    }

    pub fn advance<R: Rng>(
        &mut self,
        position: Point2D,
        elapsed: f64,
        field: &FieldSettings,
        rng: &mut R,
    ) -> Point2D {
        match self {
            Mobility::Static => position,
            Mobility::GaussMarkov(model) => model.advance(position, elapsed, field, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeded_rng;

    #[test]
    fn gauss_markov_stays_inside_the_field() {
        let mut rng = seeded_rng(11);
        let field = FieldSettings {
            width: 200.0,
            height: 100.0,
        };
        let settings = MobilitySettings {
            mobility_type: MobilityType::GaussMarkov,
            ..Default::default()
        };
        let mut mobility = Mobility::new(&settings, &mut rng).unwrap();
        let mut position = field.random_position(&mut rng);
        for _ in 0..500 {
            position = mobility.advance(position, 3.0, &field, &mut rng);
            assert!((0.0..=field.width).contains(&position.x));
            assert!((0.0..=field.height).contains(&position.y));
        }
    }

    #[test]
    fn static_nodes_do_not_move() {
        let mut rng = seeded_rng(3);
        let field = FieldSettings {
            width: 10.0,
            height: 10.0,
        };
        let mut mobility = Mobility::Static;
        let start = Point2D::new(4.0, 5.0);
        assert_eq!(mobility.advance(start, 10.0, &field, &mut rng), start);
    }

    #[test]
    fn degenerate_fields_are_rejected() {
        let field = |width, height| FieldSettings { width, height };
        assert!(field(1500.0, 300.0).validate().is_ok());
        assert!(field(0.0, 300.0).validate().is_err());
        assert!(field(-10.0, 60.0).validate().is_err());
        assert!(field(60.0, f64::NAN).validate().is_err());
        assert!(field(f64::INFINITY, 60.0).validate().is_err());
    }

    #[test]
    fn inverted_speed_range_is_rejected() {
        let mut rng = seeded_rng(5);
        let settings = MobilitySettings {
            mobility_type: MobilityType::GaussMarkov,
            min_speed: 30.0,
            max_speed: 10.0,
            ..Default::default()
        };
        assert!(Mobility::new(&settings, &mut rng).is_err());
    }
}
