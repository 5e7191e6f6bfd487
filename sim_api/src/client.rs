use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{FinishedTrip, IntersectionID, LoadScenario, RoadID, Time, TrafficSignal};

/// A connection to one simulation server. Every call must be made from a
/// tokio runtime. There's no retrying; if the server rejects a request, the
/// error carries its explanation.
pub struct Api {
    base_url: String,
    client: reqwest::Client,
}

impl Api {
    pub fn new<S: Into<String>>(base_url: S) -> Api {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Api {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Rewind the simulation to midnight, keeping the scenario and any map
    /// edits applied so far.
    pub async fn reset(&self) -> Result<()> {
        self.get_text("/sim/reset", &[]).await?;
        Ok(())
    }

    pub async fn get_time(&self) -> Result<Time> {
        self.get_text("/sim/get-time", &[]).await?.parse()
    }

    /// Simulate forward until `end`. Asking for a time before the current one
    /// is a server-side error.
    pub async fn goto_time(&self, end: Time) -> Result<()> {
        self.get_text("/sim/goto-time", &[("t", end.to_string())])
            .await?;
        Ok(())
    }

    /// Start over with a scenario, applying any modifiers as it's
    /// instantiated. This rewinds the clock to midnight.
    pub async fn load_scenario(&self, load: &LoadScenario) -> Result<()> {
        info!("Loading {} with {} modifiers", load.scenario, load.modifiers.len());
        self.post_json("/sim/load", load).await?;
        Ok(())
    }

    /// Everything that's finished (or been cancelled) so far this run.
    pub async fn get_finished_trips(&self) -> Result<Vec<FinishedTrip>> {
        self.get_json("/data/get-finished-trips", &[]).await
    }

    pub async fn get_traffic_signal(&self, i: IntersectionID) -> Result<TrafficSignal> {
        self.get_json("/traffic-signals/get", &[("id", i.0.to_string())])
            .await
    }

    /// Overwrite one signal's programming. Takes effect immediately.
    pub async fn set_traffic_signal(&self, signal: &TrafficSignal) -> Result<()> {
        self.post_json("/traffic-signals/set", signal).await?;
        Ok(())
    }

    /// The currently applied map edits, as an opaque blob in the server's
    /// permanent edits format.
    pub async fn get_edits(&self) -> Result<serde_json::Value> {
        self.get_json("/map/get-edits", &[]).await
    }

    /// A ChangeRoad command for this road, with `old` and `new` both set to
    /// the road's current state. Mutate `new` and hand it back via
    /// `set_edits`.
    pub async fn get_edit_road_command(&self, r: RoadID) -> Result<serde_json::Value> {
        self.get_json("/map/get-edit-road-command", &[("id", r.0.to_string())])
            .await
    }

    /// Replace all map edits. Lane and access changes only take effect after
    /// the next `reset`.
    pub async fn set_edits(&self, edits: &serde_json::Value) -> Result<()> {
        self.post_json("/map/set-edits", edits).await?;
        Ok(())
    }

    async fn get_text(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {}", path))?;
        let status = resp.status();
        let body = resp.text().await.with_context(|| format!("GET {}", path))?;
        if !status.is_success() {
            bail!("GET {} failed ({}): {}", path, status, body.trim());
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let body = self.get_text(path, query).await?;
        serde_json::from_str(&body).with_context(|| format!("parsing the response to GET {}", path))
    }

    async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<()> {
        let resp = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_string(body)?)
            .send()
            .await
            .with_context(|| format!("POST {}", path))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("POST {} failed ({}): {}", path, status, body.trim());
        }
        Ok(())
    }
}
