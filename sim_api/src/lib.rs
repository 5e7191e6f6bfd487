//! A client library for the traffic simulation server's JSON API. The server
//! itself -- the map model, the simulation, all of it -- lives elsewhere;
//! this crate just wraps its endpoints with types for the pieces that scripts
//! actually manipulate. Anything a script treats as opaque (map edits, signal
//! movements) stays a raw `serde_json::Value` and round-trips unchanged.

#[macro_use]
extern crate log;

mod client;
mod types;

pub use crate::client::Api;
pub use crate::types::{
    Distance, Duration, FinishedTrip, IntersectionID, LoadScenario, RoadID, ScenarioModifier,
    Stage, StageType, Time, TrafficSignal, TripID, TripMode,
};
