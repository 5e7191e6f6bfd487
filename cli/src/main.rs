//! A collection of small tools that support the simulation workflow without
//! talking to the server. These are bundled as a single executable to reduce
//! the cost of static linking in the release's file size.

#[macro_use]
extern crate log;

mod dispatch_url;
mod extract_colors;
mod generate_demand;
mod osm_reader;

use anyhow::Result;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(name = "simtool", about = "The traffic-sim sidecar multi-tool")]
enum Command {
    /// Convert an OSM extract into a travel demand CSV that the simulation's
    /// importer understands. One-shot; rerun it when the map changes.
    OsmToDemand {
        /// The path to an .osm XML file
        #[structopt(long)]
        input: String,
        /// The CSV file to write
        #[structopt(long)]
        output: String,
        /// How many people to generate
        #[structopt(long, default_value = "1000")]
        num_people: usize,
        /// A seed for generating random numbers
        #[structopt(long, default_value = "42")]
        rng_seed: u64,
    },
    /// Open a URL with whatever program suits it: videos in a video player,
    /// images in a viewer, everything else in the browser. Meant to be wired
    /// up as the terminal's URL handler.
    DispatchUrl {
        /// The URL to open
        #[structopt()]
        url: String,
        /// Print the command that would run, without running it
        #[structopt(long)]
        dry_run: bool,
    },
    /// Extract the color constants from a Rust codebase (like the GUI these
    /// tools pair with) into a JSON palette.
    ExtractColors {
        /// The root of the codebase to scan
        #[structopt(long)]
        path: String,
        /// The JSON file to write; prints to STDOUT if omitted
        #[structopt(long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cmd = Command::from_args();

    // dispatch-url runs on every click in the terminal; keep it quiet
    if !matches!(cmd, Command::DispatchUrl { .. }) {
        util::logger::setup();
    }

    match cmd {
        Command::OsmToDemand {
            input,
            output,
            num_people,
            rng_seed,
        } => generate_demand::run(input, output, num_people, rng_seed),
        Command::DispatchUrl { url, dry_run } => dispatch_url::run(url, dry_run),
        Command::ExtractColors { path, output } => extract_colors::run(path, output),
    }
}
