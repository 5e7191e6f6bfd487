//! Retime some traffic signals and rerun the same scenario. Longer stages
//! mean fewer wasted transitions but worse worst-case waits; this measures
//! which effect dominates for a particular map and demand.

use anyhow::{bail, Result};
use structopt::StructOpt;

use experiments::compare::{describe_run, Comparison};
use experiments::signals::{cycle_length, retime, scale};
use sim_api::{Api, IntersectionID, LoadScenario, Time};
use util::Timer;

#[derive(StructOpt)]
#[structopt(
    name = "retime_signals",
    about = "Measure the effect of retiming some traffic signals"
)]
struct Flags {
    /// The URL of a running simulation server
    #[structopt(long, default_value = "http://localhost:1234")]
    api: String,
    /// The path to a scenario file, resolved on the server
    #[structopt(long)]
    scenario: String,
    /// The signalized intersections to retime, as comma-separated IDs
    #[structopt(long, use_delimiter = true, required = true)]
    intersections: Vec<usize>,
    /// Add this many seconds to every stage (negative to subtract)
    #[structopt(long, conflicts_with = "scale")]
    add: Option<f64>,
    /// Scale every stage to this percentage of its current duration
    #[structopt(long)]
    scale: Option<usize>,
    /// Simulate until this time of day, like 18:00:00
    #[structopt(long, default_value = "22:00:00")]
    until: Time,
    /// A seed for instantiating the scenario, identical in both runs
    #[structopt(long, default_value = "42")]
    rng_seed: u64,
    /// Write per-trip deltas to this CSV file
    #[structopt(long)]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let flags = Flags::from_args();
    util::logger::setup();
    if flags.add.is_none() && flags.scale.is_none() {
        bail!("specify either --add or --scale");
    }

    let api = Api::new(&flags.api);
    let mut timer = Timer::new("signal retiming experiment");

    let mut load = LoadScenario::new(&flags.scenario);
    load.rng_seed = flags.rng_seed;

    timer.start("baseline run");
    api.load_scenario(&load).await?;
    let baseline = experiments::run_until(&api, flags.until).await?;
    timer.stop("baseline run");

    timer.start("retime signals");
    for i in &flags.intersections {
        let mut signal = api.get_traffic_signal(IntersectionID(*i)).await?;
        let before = cycle_length(&signal);
        if let Some(secs) = flags.add {
            retime(&mut signal, secs);
        } else if let Some(pct) = flags.scale {
            scale(&mut signal, pct);
        }
        println!(
            "Signal at intersection {}: cycle {} -> {}",
            i,
            before,
            cycle_length(&signal)
        );
        api.set_traffic_signal(&signal).await?;
    }
    // Start the scenario over with the new timing in place
    api.reset().await?;
    timer.stop("retime signals");

    timer.start("experimental run");
    let experiment = experiments::run_until(&api, flags.until).await?;
    timer.stop("experimental run");

    describe_run("baseline", &baseline);
    describe_run("retimed signals", &experiment);
    let comparison = Comparison::compare(&baseline, &experiment);
    comparison.print_summary();
    if let Some(path) = flags.output {
        comparison.write_csv(&path)?;
        println!("Wrote {}", path);
    }
    timer.done();
    Ok(())
}
