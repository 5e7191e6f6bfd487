//! What happens to everyone else's commute if some people just stay home?
//! Runs the same scenario twice against a simulation server -- once
//! untouched, once with a percentage of people's trips cancelled -- and
//! compares trip times.

use anyhow::{bail, Result};
use structopt::StructOpt;

use experiments::compare::{describe_run, Comparison};
use sim_api::{Api, LoadScenario, ScenarioModifier, Time};
use util::Timer;

#[derive(StructOpt)]
#[structopt(
    name = "cancel_trips",
    about = "Measure how cancelling some trips changes the remaining ones"
)]
struct Flags {
    /// The URL of a running simulation server
    #[structopt(long, default_value = "http://localhost:1234")]
    api: String,
    /// The path to a scenario file, resolved on the server
    #[structopt(long)]
    scenario: String,
    /// Cancel all trips for this percentage of people
    #[structopt(long, default_value = "50")]
    pct: usize,
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
    if flags.pct == 0 || flags.pct > 100 {
        bail!("--pct must be between 1 and 100");
    }

    let api = Api::new(&flags.api);
    let mut timer = Timer::new("cancellation experiment");

    let mut load = LoadScenario::new(&flags.scenario);
    load.rng_seed = flags.rng_seed;

    timer.start("baseline run");
    api.load_scenario(&load).await?;
    let baseline = experiments::run_until(&api, flags.until).await?;
    timer.stop("baseline run");

    timer.start("experimental run");
    load.modifiers = vec![ScenarioModifier::CancelPeople(flags.pct)];
    api.load_scenario(&load).await?;
    let experiment = experiments::run_until(&api, flags.until).await?;
    timer.stop("experimental run");

    describe_run("baseline", &baseline);
    describe_run(
        &format!("{}% of people cancelled", flags.pct),
        &experiment,
    );
    let comparison = Comparison::compare(&baseline, &experiment);
    comparison.print_summary();
    if let Some(path) = flags.output {
        comparison.write_csv(&path)?;
        println!("Wrote {}", path);
    }
    timer.done();
    Ok(())
}
