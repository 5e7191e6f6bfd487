use std::collections::BTreeMap;

use anyhow::Result;

use sim_api::{Duration, FinishedTrip, TripID, TripMode};
use util::prettyprint_usize;

/// Trips faster or slower than this count as unchanged; the simulation's
/// discrete timesteps produce jitter below it.
const EPSILON: Duration = Duration::seconds(0.1);

/// The per-trip difference between a baseline run and an experimental run of
/// the same scenario. Only trips that finished in both runs, uncancelled,
/// contribute deltas.
pub struct Comparison {
    pub faster: Vec<(TripID, Duration)>,
    pub slower: Vec<(TripID, Duration)>,
    pub unchanged: usize,
    /// Finished in the baseline, but cancelled or never finished in the
    /// experimental run.
    pub dropped: usize,
    /// The other way around. Capacity caps can delay a trip right past the
    /// end of the measured window, so this isn't always zero.
    pub gained: usize,
}

impl Comparison {
    pub fn compare(baseline: &[FinishedTrip], experiment: &[FinishedTrip]) -> Comparison {
        let baseline_trips: BTreeMap<TripID, &FinishedTrip> = baseline
            .iter()
            .filter(|t| t.mode.is_some())
            .map(|t| (t.id, t))
            .collect();
        let experiment_trips: BTreeMap<TripID, &FinishedTrip> = experiment
            .iter()
            .filter(|t| t.mode.is_some())
            .map(|t| (t.id, t))
            .collect();

        let mut result = Comparison {
            faster: Vec::new(),
            slower: Vec::new(),
            unchanged: 0,
            dropped: 0,
            gained: experiment_trips
                .keys()
                .filter(|id| !baseline_trips.contains_key(id))
                .count(),
        };

        for (id, before) in &baseline_trips {
            let after = match experiment_trips.get(id) {
                Some(t) => t,
                None => {
                    result.dropped += 1;
                    continue;
                }
            };
            let delta = after.duration - before.duration;
            if delta.abs() <= EPSILON {
                result.unchanged += 1;
            } else if delta < Duration::ZERO {
                result.faster.push((*id, delta.abs()));
            } else {
                result.slower.push((*id, delta));
            }
        }
        // Worst offenders first
        result.faster.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        result.slower.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        result
    }

    pub fn print_summary(&self) {
        let saved: f64 = self.faster.iter().map(|(_, d)| d.inner_seconds()).sum();
        let lost: f64 = self.slower.iter().map(|(_, d)| d.inner_seconds()).sum();
        println!(
            "{} trips faster, saving {} in total",
            prettyprint_usize(self.faster.len()),
            Duration::seconds(saved)
        );
        println!(
            "{} trips slower, losing {} in total",
            prettyprint_usize(self.slower.len()),
            Duration::seconds(lost)
        );
        println!("{} trips unchanged", prettyprint_usize(self.unchanged));
        if self.dropped > 0 || self.gained > 0 {
            println!(
                "{} trips dropped out of the experimental run, {} only appear there",
                prettyprint_usize(self.dropped),
                prettyprint_usize(self.gained)
            );
        }
        for (id, delta) in self.slower.iter().take(3) {
            println!("  worst: {} got {} slower", id, delta);
        }
    }

    /// Dump every per-trip delta for offline analysis.
    pub fn write_csv(&self, path: &str) -> Result<()> {
        let mut writer = csv::Writer::from_writer(fs_err::File::create(path)?);
        writer.write_record(["trip", "delta_seconds"])?;
        for (id, delta) in &self.faster {
            writer.write_record([id.0.to_string(), (-delta.inner_seconds()).to_string()])?;
        }
        for (id, delta) in &self.slower {
            writer.write_record([id.0.to_string(), delta.inner_seconds().to_string()])?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Print one run's totals: trips finished and mean duration per mode, trips
/// cancelled, trips hit by a capacity cap.
pub fn describe_run(label: &str, trips: &[FinishedTrip]) {
    let mut per_mode: BTreeMap<TripMode, (usize, f64)> = BTreeMap::new();
    let mut cancelled = 0;
    let mut capped = 0;
    for trip in trips {
        match trip.mode {
            Some(mode) => {
                let entry = per_mode.entry(mode).or_insert((0, 0.0));
                entry.0 += 1;
                entry.1 += trip.duration.inner_seconds();
            }
            None => {
                cancelled += 1;
            }
        }
        if trip.capped {
            capped += 1;
        }
    }

    println!(
        "{}: {} trips finished, {} cancelled",
        label,
        prettyprint_usize(trips.len() - cancelled),
        prettyprint_usize(cancelled)
    );
    for (mode, (count, total)) in per_mode {
        println!(
            "  {} {} trips, average {}",
            prettyprint_usize(count),
            mode.noun(),
            Duration::seconds(total / (count as f64))
        );
    }
    if capped > 0 {
        println!("  {} trips hit a road capacity cap", prettyprint_usize(capped));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_api::Distance;

    fn trip(id: usize, duration: f64, mode: Option<TripMode>) -> FinishedTrip {
        FinishedTrip {
            id: TripID(id),
            duration: Duration::seconds(duration),
            distance_crossed: Distance::meters(1000.0),
            mode,
            capped: false,
        }
    }

    #[test]
    fn join_by_id() {
        let baseline = vec![
            trip(1, 100.0, Some(TripMode::Drive)),
            trip(2, 200.0, Some(TripMode::Walk)),
            trip(3, 300.0, Some(TripMode::Bike)),
            trip(4, 400.0, Some(TripMode::Drive)),
        ];
        // Different order, one trip cancelled, one new
        let experiment = vec![
            trip(5, 50.0, Some(TripMode::Drive)),
            trip(3, 300.05, Some(TripMode::Bike)),
            trip(1, 90.0, Some(TripMode::Drive)),
            trip(2, 250.0, Some(TripMode::Walk)),
            trip(4, 0.0, None),
        ];

        let cmp = Comparison::compare(&baseline, &experiment);
        assert_eq!(cmp.faster, vec![(TripID(1), Duration::seconds(10.0))]);
        assert_eq!(cmp.slower, vec![(TripID(2), Duration::seconds(50.0))]);
        assert_eq!(cmp.unchanged, 1);
        assert_eq!(cmp.dropped, 1);
        assert_eq!(cmp.gained, 1);
    }

    #[test]
    fn slower_sorted_worst_first() {
        let baseline = vec![
            trip(1, 100.0, Some(TripMode::Drive)),
            trip(2, 100.0, Some(TripMode::Drive)),
        ];
        let experiment = vec![
            trip(1, 110.0, Some(TripMode::Drive)),
            trip(2, 160.0, Some(TripMode::Drive)),
        ];
        let cmp = Comparison::compare(&baseline, &experiment);
        assert_eq!(
            cmp.slower,
            vec![
                (TripID(2), Duration::seconds(60.0)),
                (TripID(1), Duration::seconds(10.0))
            ]
        );
    }
}
