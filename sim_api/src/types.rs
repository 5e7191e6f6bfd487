use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// A moment during one simulated day, measured in seconds since midnight.
/// Printed and parsed as `HH:MM:SS`; hours keep counting past 24 if the
/// simulation runs past midnight.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Time(f64);

impl Time {
    pub const START_OF_DAY: Time = Time(0.0);

    pub fn seconds_since_midnight(secs: f64) -> Time {
        assert!(secs >= 0.0, "negative time {}", secs);
        Time(secs)
    }
}

impl FromStr for Time {
    type Err = anyhow::Error;

    fn from_str(string: &str) -> Result<Time> {
        let parts: Vec<&str> = string.trim().split(':').collect();
        if parts.len() != 3 {
            bail!("time {} isn't HH:MM:SS", string);
        }
        let hours: f64 = parts[0].parse()?;
        let mins: f64 = parts[1].parse()?;
        // The server may tack fractional seconds onto its replies
        let secs: f64 = parts[2].parse()?;
        if mins >= 60.0 || secs >= 60.0 {
            bail!("time {} has out-of-range minutes or seconds", string);
        }
        Ok(Time(hours * 3600.0 + mins * 60.0 + secs))
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let total = self.0.floor() as usize;
        write!(
            f,
            "{:02}:{:02}:{:02}",
            total / 3600,
            (total % 3600) / 60,
            total % 60
        )
    }
}

/// A length of simulated time in seconds. On the wire it's a bare number,
/// matching how the server serializes durations.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Duration(f64);

impl Duration {
    pub const ZERO: Duration = Duration(0.0);

    pub const fn seconds(secs: f64) -> Duration {
        Duration(secs)
    }

    pub fn inner_seconds(self) -> f64 {
        self.0
    }

    pub fn abs(self) -> Duration {
        Duration(self.0.abs())
    }
}

impl Add for Duration {
    type Output = Duration;
    fn add(self, other: Duration) -> Duration {
        Duration(self.0 + other.0)
    }
}

impl Sub for Duration {
    type Output = Duration;
    fn sub(self, other: Duration) -> Duration {
        Duration(self.0 - other.0)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 < 0.0 {
            write!(f, "-{}", self.abs())
        } else if self.0 < 60.0 {
            write!(f, "{:.1}s", self.0)
        } else if self.0 < 3600.0 {
            let mins = (self.0 / 60.0).floor();
            write!(f, "{}m{:02.0}s", mins, (self.0 - mins * 60.0).floor())
        } else {
            let hours = (self.0 / 3600.0).floor();
            write!(
                f,
                "{}h{:02.0}m",
                hours,
                ((self.0 - hours * 3600.0) / 60.0).floor()
            )
        }
    }
}

/// Meters, as a bare number on the wire.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Distance(f64);

impl Distance {
    pub fn meters(m: f64) -> Distance {
        Distance(m)
    }

    pub fn inner_meters(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 < 1000.0 {
            write!(f, "{:.0}m", self.0)
        } else {
            write!(f, "{:.1}km", self.0 / 1000.0)
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TripID(pub usize);

impl fmt::Display for TripID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "trip {}", self.0)
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct IntersectionID(pub usize);

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RoadID(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TripMode {
    Walk,
    Bike,
    Transit,
    Drive,
}

impl TripMode {
    pub fn noun(self) -> &'static str {
        match self {
            TripMode::Walk => "pedestrian",
            TripMode::Bike => "bike",
            TripMode::Transit => "bus rider",
            TripMode::Drive => "car",
        }
    }
}

/// One trip that finished (or was cancelled) during a simulation run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FinishedTrip {
    pub id: TripID,
    pub duration: Duration,
    pub distance_crossed: Distance,
    /// None means the trip was cancelled, either by a scenario modifier or
    /// because no route existed.
    pub mode: Option<TripMode>,
    /// True if a road capacity cap delayed or rerouted this trip.
    pub capped: bool,
}

/// Systematic transformations the server can apply to a scenario as it loads
/// it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ScenarioModifier {
    /// Cancel all trips for this percentage of people.
    CancelPeople(usize),
    /// Repeat the entire day this many times.
    RepeatDays(usize),
}

/// The body of a `/sim/load` request. Loading rewinds the clock to midnight.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoadScenario {
    /// A path to a scenario file, resolved on the server.
    pub scenario: String,
    pub modifiers: Vec<ScenarioModifier>,
    pub rng_seed: u64,
}

impl LoadScenario {
    pub fn new<S: Into<String>>(scenario: S) -> LoadScenario {
        LoadScenario {
            scenario: scenario.into(),
            modifiers: Vec::new(),
            rng_seed: 42,
        }
    }
}

/// A traffic signal's full programming: a repeating cycle of stages. The
/// movements within each stage are opaque to this crate; retiming scripts
/// only touch stage durations and the offset.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrafficSignal {
    pub id: IntersectionID,
    pub stages: Vec<Stage>,
    pub offset: Duration,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stage {
    pub protected_movements: serde_json::Value,
    pub yield_movements: serde_json::Value,
    pub stage_type: StageType,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum StageType {
    Fixed(Duration),
    /// Minimum duration, delay with no demand that ends the stage, and the
    /// additional duration for an extended cycle.
    Variable(Duration, Duration, Duration),
}

impl StageType {
    pub fn simple_duration(&self) -> Duration {
        match self {
            StageType::Fixed(d) => *d,
            StageType::Variable(d, _, _) => *d,
        }
    }
}
