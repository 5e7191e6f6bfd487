use std::collections::BTreeMap;

use anyhow::{anyhow, Result};

use util::{prettyprint_usize, Timer};

// References to missing objects are just filtered out. Per
// https://wiki.openstreetmap.org/wiki/OSM_XML#Certainties_and_Uncertainties, we assume
// elements come in order: nodes, then ways. Relations aren't needed for
// generating demand.

pub struct Document {
    pub nodes: BTreeMap<NodeID, Node>,
    pub ways: BTreeMap<WayID, Way>,
}

pub struct Node {
    pub pt: LonLat,
    pub tags: Tags,
}

pub struct Way {
    pub nodes: Vec<NodeID>,
    // Duplicates geometry, because it's convenient
    pub pts: Vec<LonLat>,
    pub tags: Tags,
}

impl Way {
    /// The average of the way's points. Not the polygon centroid, but close
    /// enough for picking trip endpoints.
    pub fn center(&self) -> LonLat {
        let mut lon = 0.0;
        let mut lat = 0.0;
        for pt in &self.pts {
            lon += pt.longitude;
            lat += pt.latitude;
        }
        let n = self.pts.len() as f64;
        LonLat::new(lon / n, lat / n)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeID(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WayID(pub i64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LonLat {
    pub longitude: f64,
    pub latitude: f64,
}

impl LonLat {
    pub fn new(longitude: f64, latitude: f64) -> LonLat {
        LonLat {
            longitude,
            latitude,
        }
    }

    /// Crow-flying distance to another point, in meters. Haversine, so fine
    /// at city scale.
    pub fn gps_dist_meters(self, other: LonLat) -> f64 {
        let earth_radius_m = 6_371_000.0;
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        2.0 * earth_radius_m * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

#[derive(Clone, Default)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, k: K, v: V) {
        self.0.insert(k.into(), v.into());
    }

    pub fn get(&self, k: &str) -> Option<&String> {
        self.0.get(k)
    }

    pub fn contains_key(&self, k: &str) -> bool {
        self.0.contains_key(k)
    }

    pub fn is(&self, k: &str, v: &str) -> bool {
        self.0.get(k).map(|x| x == v).unwrap_or(false)
    }

    pub fn is_any(&self, k: &str, values: &[&str]) -> bool {
        values.iter().any(|v| self.is(k, v))
    }
}

pub fn read(raw_xml: &str, timer: &mut Timer) -> Result<Document> {
    timer.start("parse XML");
    let tree = roxmltree::Document::parse(raw_xml)?;
    timer.stop("parse XML");

    let mut doc = Document {
        nodes: BTreeMap::new(),
        ways: BTreeMap::new(),
    };

    timer.start("scrape objects");
    for obj in tree.descendants() {
        if !obj.is_element() {
            continue;
        }
        match obj.tag_name().name() {
            "node" => {
                let id = NodeID(parse_attr(&obj, "id")?);
                let pt = LonLat::new(parse_attr(&obj, "lon")?, parse_attr(&obj, "lat")?);
                doc.nodes.insert(
                    id,
                    Node {
                        pt,
                        tags: read_tags(&obj),
                    },
                );
            }
            "way" => {
                let id = WayID(parse_attr(&obj, "id")?);
                let mut nodes = Vec::new();
                let mut pts = Vec::new();
                for child in obj.children() {
                    if child.tag_name().name() == "nd" {
                        let n = NodeID(parse_attr(&child, "ref")?);
                        if let Some(node) = doc.nodes.get(&n) {
                            nodes.push(n);
                            pts.push(node.pt);
                        }
                    }
                }
                if pts.is_empty() {
                    continue;
                }
                doc.ways.insert(
                    id,
                    Way {
                        nodes,
                        pts,
                        tags: read_tags(&obj),
                    },
                );
            }
            _ => {}
        }
    }
    timer.stop("scrape objects");

    info!(
        "Read {} nodes and {} ways",
        prettyprint_usize(doc.nodes.len()),
        prettyprint_usize(doc.ways.len())
    );
    Ok(doc)
}

fn read_tags(obj: &roxmltree::Node) -> Tags {
    let mut tags = Tags::default();
    for child in obj.children() {
        if child.tag_name().name() == "tag" {
            if let (Some(k), Some(v)) = (child.attribute("k"), child.attribute("v")) {
                tags.insert(k, v);
            }
        }
    }
    tags
}

fn parse_attr<T: std::str::FromStr>(obj: &roxmltree::Node, name: &str) -> Result<T> {
    obj.attribute(name)
        .ok_or_else(|| anyhow!("a <{}> is missing {}", obj.tag_name().name(), name))?
        .parse::<T>()
        .map_err(|_| anyhow!("a <{}> has a malformed {}", obj.tag_name().name(), name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_a_small_extract() {
        let raw = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <node id="1" lat="47.6" lon="-122.3">
    <tag k="amenity" v="cafe"/>
  </node>
  <node id="2" lat="47.61" lon="-122.31"/>
  <node id="3" lat="47.62" lon="-122.33"/>
  <way id="100">
    <nd ref="2"/>
    <nd ref="3"/>
    <nd ref="999"/>
    <tag k="building" v="house"/>
  </way>
</osm>"#;
        let doc = read(raw, &mut Timer::new("test")).unwrap();
        assert_eq!(doc.nodes.len(), 3);
        assert_eq!(doc.ways.len(), 1);
        assert!(doc.nodes[&NodeID(1)].tags.is("amenity", "cafe"));

        let way = &doc.ways[&WayID(100)];
        assert!(way.tags.is("building", "house"));
        // The dangling ref is dropped
        assert_eq!(way.nodes, vec![NodeID(2), NodeID(3)]);
        let center = way.center();
        assert!((center.longitude - -122.32).abs() < 1e-9);
        assert!((center.latitude - 47.615).abs() < 1e-9);
    }

    #[test]
    fn haversine_sanity() {
        // Two points about 1.1km apart in Seattle
        let a = LonLat::new(-122.3245, 47.6456);
        let b = LonLat::new(-122.3142, 47.6542);
        let dist = a.gps_dist_meters(b);
        assert!(dist > 1000.0 && dist < 1500.0, "got {}", dist);
        assert!(a.gps_dist_meters(a) < 1e-6);
    }
}
