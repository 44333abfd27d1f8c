use log::debug;

use manetsim_core::bucket::Bucket;
use manetsim_core::error::ConfigError;
use manetsim_core::scheduler::Scheduler;

/// Drives the scheduler to the end of the run and returns the bucket. Events still queued
/// at that point are retired by `terminate`, so nothing of this run fires later.
pub fn run_simulation<B, S>(mut scheduler: S) -> Result<B, ConfigError>
where
    S: Scheduler<B>,
    B: Bucket,
{
    scheduler.initialize()?;
    let mut events: u64 = 0;
    while scheduler.trigger()?.is_some() {
        events += 1;
    }
    debug!(
        "Executed {} events within {} us",
        events,
        scheduler.duration()
    );
    Ok(scheduler.terminate())
}
