use itertools::iproduct;
use log::info;

use manetsim_core::error::ConfigError;
use manetsim_core::scheduler::DefaultScheduler;
use manetsim_models::routing::kind::RoutingKind;
use manetsim_output::result::Results;

use crate::error::ExperimentError;
use crate::net::bucket::{NetworkBucket, RunOutcome};
use crate::simulation::builder::{PreparedRun, RunBuilder};
use crate::simulation::config::BaseConfig;
use crate::simulation::runner::run_simulation;

pub type NetScheduler = DefaultScheduler<NetworkBucket>;

/// Sweeps every selected protocol over every node count. The configuration is checked
/// once, up front; any error afterwards aborts the sweep.
#[derive(Debug)]
pub struct ExperimentDriver {
    config: BaseConfig,
    protocols: Vec<RoutingKind>,
    node_counts: Vec<u32>,
}

impl ExperimentDriver {
    pub fn new(config: BaseConfig) -> Result<Self, ConfigError> {
        let protocols = config.validate()?;
        let node_counts = config.sweep_settings.node_counts.counts();
        Ok(Self {
            config,
            protocols,
            node_counts,
        })
    }

    pub fn config(&self) -> &BaseConfig {
        &self.config
    }

    pub fn protocols(&self) -> &[RoutingKind] {
        &self.protocols
    }

    pub fn node_counts(&self) -> &[u32] {
        &self.node_counts
    }

    pub fn run(&self, results: &mut Results) -> Result<(), ExperimentError> {
        self.run_with(results, |_| {})
    }

    /// Like `run`, with a hook that sees every run after its nodes are built and before
    /// routing is installed.
    pub fn run_with<F>(&self, results: &mut Results, mut before_install: F) -> Result<(), ExperimentError>
    where
        F: FnMut(&mut PreparedRun),
    {
        for (kind, node_count) in iproduct!(self.protocols.iter().copied(), self.node_counts.iter().copied()) {
            info!("Starting run: {} with {} nodes", kind, node_count);
            let outcome = self.run_once(kind, node_count, &mut before_install)?;
            results.throughput.add_data(outcome.throughput);
            results.run_stats.add_data(outcome.run_stats);
            if let Some(positions) = results.positions.as_mut() {
                positions.add_data(outcome.positions);
            }
            results.write_to_file()?;
        }
        Ok(())
    }

    pub fn run_once<F>(
        &self,
        kind: RoutingKind,
        node_count: u32,
        before_install: &mut F,
    ) -> Result<RunOutcome, ConfigError>
    where
        F: FnMut(&mut PreparedRun),
    {
        let builder = RunBuilder::new(&self.config);
        let mut prepared = builder.prepare(kind, node_count)?;
        before_install(&mut prepared);
        builder.install_routing(&mut prepared)?;
        let bucket = builder.build_bucket(prepared)?;

        let scheduler: NetScheduler = DefaultScheduler::builder()
            .bucket(bucket)
            .duration(self.config.simulation_settings.duration)
            .build();
        let bucket = run_simulation(scheduler)?;
        bucket.into_outcome()
    }
}
