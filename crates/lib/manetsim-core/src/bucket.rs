use std::fmt::{Debug, Display};
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::scheduler::EventQueue;

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Virtual time of a simulation run in microseconds.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeUS(pub u64);

impl Display for TimeUS {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TimeUS {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.parse::<u64>()?;
        Ok(Self(id))
    }
}

impl From<u64> for TimeUS {
    fn from(f: u64) -> Self {
        Self(f)
    }
}

impl From<i32> for TimeUS {
    fn from(f: i32) -> Self {
        Self(f as u64)
    }
}

impl TimeUS {
    pub const ZERO: TimeUS = TimeUS(0);

    pub fn from_secs_f64(seconds: f64) -> Self {
        Self((seconds.max(0.0) * MICROS_PER_SECOND).round() as u64)
    }

    pub fn from_secs(seconds: u64) -> Self {
        Self(seconds * 1_000_000)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / MICROS_PER_SECOND
    }
}

impl Mul<u64> for TimeUS {
    type Output = Self;

    fn mul(self, rhs: u64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Add for TimeUS {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for TimeUS {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

/// Subtraction saturates at zero, a timestamp from the future yields no elapsed time.
impl Sub for TimeUS {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

/// A trait for the world that the scheduler drives. It owns every node of a run together
/// with the shared models (channel, topology, statistics) and reacts to the events that
/// the scheduler pops from the queue.
///
/// Every callback runs to completion before the next event is popped. A callback may
/// schedule follow-up events, including re-arming itself.
pub trait Bucket {
    type Event;

    fn initialize(&mut self, queue: &mut EventQueue<Self::Event>) -> Result<(), ConfigError>;
    fn handle(
        &mut self,
        now: TimeUS,
        event: Self::Event,
        queue: &mut EventQueue<Self::Event>,
    ) -> Result<(), ConfigError>;
    fn terminate(&mut self, now: TimeUS);
}

#[cfg(test)]
mod tests {
    use super::TimeUS;

    #[test]
    fn seconds_round_trip_at_microsecond_resolution() {
        let time = TimeUS::from_secs_f64(1.5);
        assert_eq!(time, TimeUS::from(1_500_000u64));
        assert_eq!(time.as_secs_f64(), 1.5);
    }

    #[test]
    fn subtraction_saturates() {
        assert_eq!(TimeUS::from(5u64) - TimeUS::from(9u64), TimeUS::ZERO);
    }
}
