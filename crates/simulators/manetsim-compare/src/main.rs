use std::path::Path;

use anyhow::Context;
use clap::Parser;
use log::info;

use manetsim_compare::simulation::config::BaseConfigReader;
use manetsim_compare::simulation::driver::ExperimentDriver;
use manetsim_output::logger::initiate_logger;
use manetsim_output::result::Results;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
struct CliArgs {
    #[arg(short = 'c', long, value_name = "CONFIG_FILE")]
    config: String,
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let start = std::time::Instant::now();

    let config_file = Path::new(&args.config);
    let config_path = config_file
        .parent()
        .context("invalid directory for the configuration file")?
        .to_path_buf();
    let base_config = BaseConfigReader::new(&args.config)
        .parse()
        .with_context(|| format!("reading {}", args.config))?;
    initiate_logger(&config_path, &base_config.log_settings)?;

    let driver = ExperimentDriver::new(base_config)?;
    info!(
        "Sweeping {} protocols over {} node counts",
        driver.protocols().len(),
        driver.node_counts().len()
    );
    let mut results = Results::new(&config_path, &driver.config().output_settings)?;
    driver.run(&mut results)?;
    results.close_files()?;

    let elapsed = start.elapsed();
    println!("Simulation finished in {} ms.", elapsed.as_millis());
    Ok(())
}
