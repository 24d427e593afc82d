use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use crate::app::ports::MilestoneSourcePort;
use crate::config::Settings;
use crate::error::{MilestoneError, Result};
use crate::types::{source_id_from_number_or_string, MotorwayConfig, RawRecord};

/// Overpass QL selecting every `highway=milestone` node on the named motorway,
/// including sections still under construction.
pub fn milestone_query(prefix: &str, motorway_name: &str, area_id: u64, timeout_seconds: u64) -> String {
    let way_name = escape_ql(&format!("{} {}", prefix, motorway_name));
    format!(
        "[out:json][timeout:{timeout_seconds}];\
         area(id:{area_id})->.searchArea;\
         (\
           way[\"highway\"=\"motorway\"][name=\"{way_name}\"];\
           >>;\
           way[\"highway\"=\"construction\"][\"construction\"=\"motorway\"][name=\"{way_name}\"];\
           >>;\
         ) -> .motorway_nodes;\
         node.motorway_nodes[\"highway\"=\"milestone\"] -> .milestones;\
         .milestones out geom;"
    )
}

fn escape_ql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(deserialize_with = "source_id_from_number_or_string")]
    id: String,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

impl OverpassElement {
    fn into_raw_record(self) -> Option<RawRecord> {
        Some(RawRecord {
            lat: self.lat?,
            lon: self.lon?,
            id: self.id,
            tags: self.tags,
        })
    }
}

/// Decode an Overpass JSON body; elements without coordinates are skipped
pub fn parse_overpass_response(body: &[u8]) -> Result<Vec<RawRecord>> {
    let response: OverpassResponse = serde_json::from_slice(body)?;
    let total = response.elements.len();
    let records: Vec<RawRecord> = response
        .elements
        .into_iter()
        .filter_map(OverpassElement::into_raw_record)
        .collect();
    if records.len() < total {
        debug!("Skipped {} Overpass elements without coordinates", total - records.len());
    }
    Ok(records)
}

/// Milestone source backed by an Overpass API interpreter
pub struct OverpassClient {
    client: reqwest::Client,
    endpoint: String,
    motorway_prefix: String,
    area_id: u64,
    timeout_seconds: u64,
}

impl OverpassClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: settings.overpass_url.clone(),
            motorway_prefix: settings.motorway_prefix.clone(),
            area_id: settings.area_id,
            timeout_seconds: settings.query_timeout_seconds,
        })
    }

    pub fn query_for(&self, motorway_name: &str) -> String {
        milestone_query(&self.motorway_prefix, motorway_name, self.area_id, self.timeout_seconds)
    }
}

#[async_trait]
impl MilestoneSourcePort for OverpassClient {
    #[instrument(skip(self, motorway), fields(motorway = %motorway.name))]
    async fn fetch_milestones(&self, motorway: &MotorwayConfig) -> Result<Vec<RawRecord>> {
        let query = self.query_for(&motorway.name);
        debug!("Overpass query: {}", query);

        let resp = self
            .client
            .post(&self.endpoint)
            .form(&[("data", query.as_str())])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            return Err(MilestoneError::Overpass {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&body).chars().take(200).collect(),
            });
        }

        let records = parse_overpass_response(&body)?;
        info!("Fetched {} milestones for {}", records.len(), motorway.name);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_embeds_name_area_and_timeout() {
        let query = milestone_query("autostrada", "Trakia", 3600186382, 25);

        assert!(query.starts_with("[out:json][timeout:25];area(id:3600186382)->.searchArea;"));
        assert!(query.contains("way[\"highway\"=\"motorway\"][name=\"autostrada Trakia\"];"));
        assert!(query.contains(
            "way[\"highway\"=\"construction\"][\"construction\"=\"motorway\"][name=\"autostrada Trakia\"];"
        ));
        assert!(query.contains("node.motorway_nodes[\"highway\"=\"milestone\"] -> .milestones;"));
        assert!(query.ends_with(".milestones out geom;"));
    }

    #[test]
    fn test_query_escapes_quotes() {
        let query = milestone_query("A", "\"Hemus\"", 1, 25);
        assert!(query.contains("[name=\"A \\\"Hemus\\\"\"]"));
    }

    #[test]
    fn test_parse_response() {
        let body = json!({
            "version": 0.6,
            "elements": [
                { "type": "node", "id": 101, "lat": 42.1, "lon": 24.5,
                  "tags": { "highway": "milestone", "distance": "12" } },
                { "type": "node", "id": 102, "lat": 42.2, "lon": 24.6 },
                { "type": "way", "id": 5, "nodes": [101, 102] }
            ]
        });

        let records = parse_overpass_response(body.to_string().as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "101");
        assert_eq!(records[0].tag("distance"), Some("12"));
        assert!(records[1].tags.is_empty());
    }

    #[test]
    fn test_parse_response_without_elements() {
        assert!(parse_overpass_response(b"{}").unwrap().is_empty());
        assert!(matches!(
            parse_overpass_response(b"<html>busy</html>"),
            Err(MilestoneError::Json(_))
        ));
    }
}
