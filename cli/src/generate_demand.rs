use anyhow::{bail, Result};
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use serde::Serialize;

use util::{prettyprint_usize, Timer};

use crate::osm_reader::{self, Document, LonLat};

/// One row of the demand CSV: a single one-way trip. The columns match what
/// the simulation's importer expects, so the output plugs straight in.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Record {
    /// v for driving, b for biking, p for walking, t for transit
    pub agent_type: String,
    /// LINESTRING(lon lat,lon lat) from origin to destination
    pub geometry: String,
    /// Departure in HHMM, like 0730
    pub departure_time: String,
}

pub fn run(input: String, output: String, num_people: usize, rng_seed: u64) -> Result<()> {
    let mut timer = Timer::new("generate demand from OSM");

    timer.start("read OSM");
    let raw = fs_err::read_to_string(&input)?;
    let doc = osm_reader::read(&raw, &mut timer)?;
    timer.stop("read OSM");

    timer.start("generate trips");
    let mut rng = XorShiftRng::seed_from_u64(rng_seed);
    let records = generate(&doc, num_people, &mut rng)?;
    timer.stop("generate trips");

    timer.start("write CSV");
    let mut writer = csv::Writer::from_writer(fs_err::File::create(&output)?);
    for rec in &records {
        writer.serialize(rec)?;
    }
    writer.flush()?;
    timer.stop("write CSV");

    println!(
        "Wrote {} trips to {}",
        prettyprint_usize(records.len()),
        output
    );
    timer.done();
    Ok(())
}

/// Everybody leaves home in the morning, goes somewhere with a job or an
/// amenity, and comes home 4-12 hours later.
fn generate(doc: &Document, num_people: usize, rng: &mut XorShiftRng) -> Result<Vec<Record>> {
    let (homes, workplaces) = classify_buildings(doc);
    info!(
        "{} homes, {} workplaces",
        prettyprint_usize(homes.len()),
        prettyprint_usize(workplaces.len())
    );
    if homes.is_empty() {
        bail!("this extract has no residential buildings; can't generate demand");
    }
    if workplaces.is_empty() {
        bail!("this extract has no workplaces or amenities; can't generate demand");
    }

    let mut records = Vec::new();
    let mut skipped = 0;
    for _ in 0..num_people {
        let home = homes[rng.gen_range(0..homes.len())];
        let work = workplaces[rng.gen_range(0..workplaces.len())];
        // A "workplace" can double as somebody's home; regenerating a few
        // no-op trips is cheaper than deduplicating the building lists.
        if home == work {
            skipped += 1;
            continue;
        }

        let agent_type = pick_mode(home.gps_dist_meters(work), rng);
        let leave_home = rng.gen_range(7 * 3600..10 * 3600);
        let return_home = leave_home + rng.gen_range(4 * 3600..12 * 3600);

        records.push(Record {
            agent_type: agent_type.to_string(),
            geometry: linestring(home, work),
            departure_time: hhmm(leave_home),
        });
        records.push(Record {
            agent_type: agent_type.to_string(),
            geometry: linestring(work, home),
            departure_time: hhmm(return_home),
        });
    }
    if skipped > 0 {
        warn!(
            "Skipped {} people whose home and destination were the same building",
            prettyprint_usize(skipped)
        );
    }
    Ok(records)
}

/// Split buildings into places people live and places people go. A building
/// with a business tag counts as a destination even if somebody also lives
/// there.
fn classify_buildings(doc: &Document) -> (Vec<LonLat>, Vec<LonLat>) {
    let mut homes = Vec::new();
    let mut workplaces = Vec::new();

    for way in doc.ways.values() {
        if !way.tags.contains_key("building") {
            continue;
        }
        if way.tags.contains_key("amenity")
            || way.tags.contains_key("shop")
            || way.tags.contains_key("office")
            || way.tags.is_any(
                "building",
                &[
                    "commercial",
                    "retail",
                    "office",
                    "industrial",
                    "school",
                    "university",
                ],
            )
        {
            workplaces.push(way.center());
        } else if way.tags.is_any(
            "building",
            &[
                "yes",
                "house",
                "detached",
                "residential",
                "apartments",
                "terrace",
                "semidetached_house",
            ],
        ) {
            homes.push(way.center());
        }
    }

    // Standalone amenity nodes (food carts, corner shops mapped as points)
    // are destinations too
    for node in doc.nodes.values() {
        if node.tags.contains_key("amenity") || node.tags.contains_key("shop") {
            workplaces.push(node.pt);
        }
    }

    (homes, workplaces)
}

fn pick_mode(dist_meters: f64, rng: &mut XorShiftRng) -> &'static str {
    if dist_meters < 500.0 {
        return "p";
    }
    if dist_meters < 3000.0 {
        // Short hops split between everything
        return match rng.gen_range(0..10) {
            0..=2 => "b",
            3..=4 => "p",
            5..=6 => "t",
            _ => "v",
        };
    }
    if rng.gen_bool(0.4) {
        "t"
    } else {
        "v"
    }
}

fn linestring(from: LonLat, to: LonLat) -> String {
    format!(
        "LINESTRING({} {},{} {})",
        from.longitude, from.latitude, to.longitude, to.latitude
    )
}

fn hhmm(seconds_since_midnight: usize) -> String {
    format!(
        "{:02}{:02}",
        seconds_since_midnight / 3600,
        (seconds_since_midnight % 3600) / 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats() {
        assert_eq!(hhmm(7 * 3600 + 35 * 60), "0735");
        assert_eq!(hhmm(0), "0000");
        assert_eq!(
            linestring(LonLat::new(-122.3245, 47.6456), LonLat::new(-122.3142, 47.6675)),
            "LINESTRING(-122.3245 47.6456,-122.3142 47.6675)"
        );
    }

    #[test]
    fn deterministic_per_seed() {
        let doc = sample_doc();
        let mut rng1 = XorShiftRng::seed_from_u64(42);
        let mut rng2 = XorShiftRng::seed_from_u64(42);
        let mut rng3 = XorShiftRng::seed_from_u64(43);
        let a = generate(&doc, 50, &mut rng1).unwrap();
        let b = generate(&doc, 50, &mut rng2).unwrap();
        let c = generate(&doc, 50, &mut rng3).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn round_trips_come_home() {
        let doc = sample_doc();
        let mut rng = XorShiftRng::seed_from_u64(42);
        let records = generate(&doc, 20, &mut rng).unwrap();
        // Two records per person, and the return trip reverses the geometry
        assert_eq!(records.len() % 2, 0);
        for pair in records.chunks(2) {
            let out = parse_linestring(&pair[0].geometry);
            let back = parse_linestring(&pair[1].geometry);
            assert_eq!(out.0, back.1);
            assert_eq!(out.1, back.0);
            assert!(pair[0].departure_time < pair[1].departure_time);
        }
    }

    #[test]
    fn no_demand_without_buildings() {
        let doc = Document {
            nodes: std::collections::BTreeMap::new(),
            ways: std::collections::BTreeMap::new(),
        };
        let mut rng = XorShiftRng::seed_from_u64(42);
        assert!(generate(&doc, 10, &mut rng).is_err());
    }

    fn parse_linestring(input: &str) -> (String, String) {
        let parts: Vec<&str> = input
            .strip_prefix("LINESTRING(")
            .unwrap()
            .strip_suffix(')')
            .unwrap()
            .split(',')
            .collect();
        (parts[0].to_string(), parts[1].to_string())
    }

    fn sample_doc() -> Document {
        let raw = r#"<?xml version="1.0"?>
<osm>
  <node id="1" lat="47.6000" lon="-122.3000"/>
  <node id="2" lat="47.6010" lon="-122.3010"/>
  <node id="3" lat="47.6100" lon="-122.3100"/>
  <node id="4" lat="47.6110" lon="-122.3110"/>
  <node id="5" lat="47.6200" lon="-122.3200"/>
  <node id="6" lat="47.6210" lon="-122.3210"/>
  <way id="10">
    <nd ref="1"/>
    <nd ref="2"/>
    <tag k="building" v="house"/>
  </way>
  <way id="11">
    <nd ref="3"/>
    <nd ref="4"/>
    <tag k="building" v="apartments"/>
  </way>
  <way id="12">
    <nd ref="5"/>
    <nd ref="6"/>
    <tag k="building" v="retail"/>
    <tag k="shop" v="supermarket"/>
  </way>
</osm>"#;
        crate::osm_reader::read(raw, &mut util::Timer::new("test")).unwrap()
    }
}
