//! Server location directory and trace metadata

use crate::{
    client::{ProbeTransport, LOCATIONS_PATH, TRACE_PATH},
    error::{AppError, Result},
    models::ServerLocation,
};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// Trace key naming the location that served the request
pub const COLO_KEY: &str = "colo";

/// One entry of the location directory
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationRecord {
    pub iata: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub cca2: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub city: String,
}

impl From<LocationRecord> for ServerLocation {
    fn from(record: LocationRecord) -> Self {
        Self {
            city: record.city,
            region: record.region,
            lat: record.lat,
            lon: record.lon,
        }
    }
}

/// Location directory keyed by IATA code
pub type LocationDirectory = HashMap<String, ServerLocation>;

/// Parse the JSON location directory
pub fn parse_locations(json: &str) -> Result<LocationDirectory> {
    let records: Vec<LocationRecord> = serde_json::from_str(json)
        .map_err(|e| AppError::parse(format!("Invalid location directory: {}", e)))?;

    Ok(records
        .into_iter()
        .map(|record| (record.iata.clone(), ServerLocation::from(record)))
        .collect())
}

/// Parse a `key=value` trace document
///
/// Lines without `=` or with an empty value are skipped. Later duplicates
/// win.
pub fn parse_trace(text: &str) -> HashMap<String, String> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Colo code of a parsed trace document
pub fn colo_from_trace(trace: &HashMap<String, String>) -> Result<String> {
    trace
        .get(COLO_KEY)
        .cloned()
        .ok_or_else(|| AppError::parse("Trace document has no colo entry"))
}

/// Look up the location serving `colo`
pub fn resolve_location(directory: &LocationDirectory, colo: &str) -> Result<ServerLocation> {
    directory
        .get(colo)
        .cloned()
        .ok_or_else(|| AppError::parse(format!("Unknown server location code: {}", colo)))
}

/// Fetch and parse the location directory
pub async fn fetch_locations<T: ProbeTransport + ?Sized>(transport: &T) -> Result<LocationDirectory> {
    let body = transport.fetch_text(LOCATIONS_PATH).await?;
    let directory = parse_locations(&body)?;
    debug!(locations = directory.len(), "location directory fetched");
    Ok(directory)
}

/// Fetch the trace document and return the serving colo code
pub async fn fetch_colo<T: ProbeTransport + ?Sized>(transport: &T) -> Result<String> {
    let body = transport.fetch_text(TRACE_PATH).await?;
    let colo = colo_from_trace(&parse_trace(&body))?;
    debug!(%colo, "trace fetched");
    Ok(colo)
}
