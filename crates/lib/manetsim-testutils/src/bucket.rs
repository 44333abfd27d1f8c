use manetsim_core::bucket::{Bucket, TimeUS};
use manetsim_core::error::ConfigError;
use manetsim_core::scheduler::EventQueue;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickEvent {
    Tick,
    Fail,
}

/// A bucket with one self re-arming periodic event, like a statistics flush.
#[derive(Default, Debug)]
pub struct TickBucket {
    pub period: TimeUS,
    pub ticks: Vec<TimeUS>,
    pub fail_at: Option<TimeUS>,
    pub terminated_at: Option<TimeUS>,
}

impl TickBucket {
    pub fn new(period: TimeUS) -> Self {
        Self {
            period,
            ..Default::default()
        }
    }

    pub fn failing_at(period: TimeUS, fail_at: TimeUS) -> Self {
        Self {
            period,
            fail_at: Some(fail_at),
            ..Default::default()
        }
    }
}

impl Bucket for TickBucket {
    type Event = TickEvent;

    fn initialize(&mut self, queue: &mut EventQueue<TickEvent>) -> Result<(), ConfigError> {
        queue.schedule(self.period, TickEvent::Tick);
        if let Some(at) = self.fail_at {
            queue.schedule(at, TickEvent::Fail);
        }
        Ok(())
    }

    fn handle(
        &mut self,
        now: TimeUS,
        event: TickEvent,
        queue: &mut EventQueue<TickEvent>,
    ) -> Result<(), ConfigError> {
        match event {
            TickEvent::Tick => {
                self.ticks.push(now);
                queue.schedule(now + self.period, TickEvent::Tick);
                Ok(())
            }
            TickEvent::Fail => Err(ConfigError::Settings(format!("failure at {}", now))),
        }
    }

    fn terminate(&mut self, now: TimeUS) {
        self.terminated_at = Some(now);
    }
}
