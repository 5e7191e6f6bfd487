//! Map edits stay opaque JSON; the server owns their format. These helpers
//! only reach into the few fields the capping experiment needs to touch.

use anyhow::{anyhow, Result};
use serde_json::Value;

/// Rewrite the `new` road state of a ChangeRoad command to cap how many
/// vehicles can enter this road per hour.
pub fn set_road_cap(cmd: &mut Value, cap: usize) -> Result<()> {
    let restrictions = cmd
        .get_mut("ChangeRoad")
        .and_then(|x| x.get_mut("new"))
        .and_then(|x| x.get_mut("access_restrictions"))
        .ok_or_else(|| anyhow!("road command is missing ChangeRoad/new/access_restrictions"))?;
    restrictions["cap_vehicles_per_hour"] = cap.into();
    Ok(())
}

/// Append one command to an edits blob fetched from the server.
pub fn add_command(edits: &mut Value, cmd: Value) -> Result<()> {
    edits
        .get_mut("commands")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| anyhow!("edits are missing the commands list"))?
        .push(cmd);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Abbreviated from a real server response; only the fields we touch plus
    // a few bystanders to prove they survive.
    fn sample_command() -> Value {
        serde_json::json!({
            "ChangeRoad": {
                "r": { "osm_way_id": 243_443_210, "i1": 1, "i2": 2 },
                "old": {
                    "speed_limit": 11.176,
                    "access_restrictions": {
                        "allow_through_traffic": 127,
                        "cap_vehicles_per_hour": null
                    }
                },
                "new": {
                    "speed_limit": 11.176,
                    "access_restrictions": {
                        "allow_through_traffic": 127,
                        "cap_vehicles_per_hour": null
                    }
                }
            }
        })
    }

    #[test]
    fn cap_only_touches_new() {
        let mut cmd = sample_command();
        set_road_cap(&mut cmd, 100).unwrap();
        assert_eq!(
            cmd["ChangeRoad"]["new"]["access_restrictions"]["cap_vehicles_per_hour"],
            serde_json::json!(100)
        );
        // The old state and unrelated fields are untouched
        assert_eq!(
            cmd["ChangeRoad"]["old"]["access_restrictions"]["cap_vehicles_per_hour"],
            Value::Null
        );
        assert_eq!(cmd["ChangeRoad"]["new"]["speed_limit"], 11.176);
    }

    #[test]
    fn reject_unexpected_shapes() {
        let mut cmd = serde_json::json!({ "ChangeIntersection": {} });
        assert!(set_road_cap(&mut cmd, 100).is_err());
    }

    #[test]
    fn append_commands() {
        let mut edits = serde_json::json!({
            "map_name": { "city": ["us", "seattle"], "map": "montlake" },
            "edits_name": "untitled edits",
            "version": 13,
            "commands": []
        });
        add_command(&mut edits, sample_command()).unwrap();
        add_command(&mut edits, sample_command()).unwrap();
        assert_eq!(edits["commands"].as_array().unwrap().len(), 2);
    }
}
