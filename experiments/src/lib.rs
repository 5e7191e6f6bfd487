//! Each binary in this crate drives a running simulation server through one
//! experiment: change something about the world, rerun the same scenario, and
//! compare trip times. The library half holds everything pure enough to test
//! without a server.

#[macro_use]
extern crate log;

pub mod compare;
pub mod edits;
pub mod signals;

use anyhow::Result;

use sim_api::{Api, FinishedTrip, Time};

/// Simulate until `end`, then grab all finished trips.
pub async fn run_until(api: &Api, end: Time) -> Result<Vec<FinishedTrip>> {
    api.goto_time(end).await?;
    let trips = api.get_finished_trips().await?;
    info!("Simulated until {}; {} trips finished", end, trips.len());
    Ok(trips)
}
