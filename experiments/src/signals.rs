use sim_api::{Duration, StageType, TrafficSignal};

/// Stages shorter than this don't give anybody time to clear the
/// intersection.
const MIN_STAGE_SECONDS: f64 = 5.0;

/// Add (or with a negative delta, subtract) time to every stage. Fixed stages
/// change their duration; variable stages change their minimum.
pub fn retime(signal: &mut TrafficSignal, delta_seconds: f64) {
    transform(signal, |secs| secs + delta_seconds);
}

/// Scale every stage's duration, `percent` being 100 for no change.
pub fn scale(signal: &mut TrafficSignal, percent: usize) {
    let factor = (percent as f64) / 100.0;
    transform(signal, |secs| secs * factor);
}

/// How long one full cycle of the signal takes.
pub fn cycle_length(signal: &TrafficSignal) -> Duration {
    let mut total = Duration::ZERO;
    for stage in &signal.stages {
        total = total + stage.stage_type.simple_duration();
    }
    total
}

fn transform<F: Fn(f64) -> f64>(signal: &mut TrafficSignal, f: F) {
    for stage in &mut signal.stages {
        stage.stage_type = match stage.stage_type {
            StageType::Fixed(d) => StageType::Fixed(adjust(d, &f)),
            StageType::Variable(min, delay, additional) => {
                StageType::Variable(adjust(min, &f), delay, additional)
            }
        };
    }
}

fn adjust<F: Fn(f64) -> f64>(d: Duration, f: &F) -> Duration {
    Duration::seconds(f(d.inner_seconds()).max(MIN_STAGE_SECONDS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_api::{IntersectionID, Stage};

    fn signal(stages: Vec<StageType>) -> TrafficSignal {
        TrafficSignal {
            id: IntersectionID(42),
            stages: stages
                .into_iter()
                .map(|stage_type| Stage {
                    protected_movements: serde_json::json!([]),
                    yield_movements: serde_json::json!([]),
                    stage_type,
                })
                .collect(),
            offset: Duration::ZERO,
        }
    }

    #[test]
    fn retime_clamps() {
        let mut s = signal(vec![
            StageType::Fixed(Duration::seconds(30.0)),
            StageType::Fixed(Duration::seconds(10.0)),
            StageType::Variable(
                Duration::seconds(20.0),
                Duration::seconds(5.0),
                Duration::seconds(10.0),
            ),
        ]);
        retime(&mut s, -15.0);
        assert_eq!(
            s.stages[0].stage_type.simple_duration(),
            Duration::seconds(15.0)
        );
        // 10 - 15 clamps to the floor instead of going negative
        assert_eq!(
            s.stages[1].stage_type.simple_duration(),
            Duration::seconds(5.0)
        );
        // Only the variable stage's minimum moves
        match s.stages[2].stage_type {
            StageType::Variable(min, delay, additional) => {
                assert_eq!(min, Duration::seconds(5.0));
                assert_eq!(delay, Duration::seconds(5.0));
                assert_eq!(additional, Duration::seconds(10.0));
            }
            _ => panic!("variable stage changed type"),
        }
    }

    #[test]
    fn scale_and_measure() {
        let mut s = signal(vec![
            StageType::Fixed(Duration::seconds(30.0)),
            StageType::Fixed(Duration::seconds(50.0)),
        ]);
        assert_eq!(cycle_length(&s), Duration::seconds(80.0));
        scale(&mut s, 150);
        assert_eq!(cycle_length(&s), Duration::seconds(120.0));
    }
}
