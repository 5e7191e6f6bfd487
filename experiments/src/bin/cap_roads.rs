//! Cap how many vehicles per hour may enter some roads, then rerun the same
//! scenario and see who wins and who loses. The cap lives in map edits, so
//! the experimental run applies edits and resets instead of reloading.

use anyhow::{bail, Result};
use structopt::StructOpt;

use experiments::compare::{describe_run, Comparison};
use experiments::edits::{add_command, set_road_cap};
use sim_api::{Api, LoadScenario, RoadID, Time};
use util::Timer;

#[derive(StructOpt)]
#[structopt(
    name = "cap_roads",
    about = "Measure the effect of capping vehicles per hour on some roads"
)]
struct Flags {
    /// The URL of a running simulation server
    #[structopt(long, default_value = "http://localhost:1234")]
    api: String,
    /// The path to a scenario file, resolved on the server
    #[structopt(long)]
    scenario: String,
    /// The roads to cap, as comma-separated IDs like 3,14,15
    #[structopt(long, use_delimiter = true, required = true)]
    roads: Vec<usize>,
    /// How many vehicles per hour each capped road allows
    #[structopt(long, default_value = "100")]
    cap: usize,
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
    if flags.cap == 0 {
        bail!("a cap of 0 closes the road entirely; that's a different experiment");
    }

    let api = Api::new(&flags.api);
    let mut timer = Timer::new("road capping experiment");

    let mut load = LoadScenario::new(&flags.scenario);
    load.rng_seed = flags.rng_seed;

    timer.start("baseline run");
    api.load_scenario(&load).await?;
    let baseline = experiments::run_until(&api, flags.until).await?;
    timer.stop("baseline run");

    timer.start("apply caps");
    let mut edits = api.get_edits().await?;
    for r in &flags.roads {
        let mut cmd = api.get_edit_road_command(RoadID(*r)).await?;
        set_road_cap(&mut cmd, flags.cap)?;
        add_command(&mut edits, cmd)?;
    }
    api.set_edits(&edits).await?;
    // Edits to roads only take effect on the next reset
    api.reset().await?;
    timer.stop("apply caps");

    timer.start("experimental run");
    let experiment = experiments::run_until(&api, flags.until).await?;
    timer.stop("experimental run");

    describe_run("baseline", &baseline);
    describe_run(
        &format!(
            "{} roads capped at {} vehicles per hour",
            flags.roads.len(),
            flags.cap
        ),
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
