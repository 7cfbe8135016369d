// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Feature loading.
//!
//! Backends hand out features in two shapes: a flat JSON array of records
//! (`/api/food`) and GeoJSON (`cities.geojson`, or the raw feature array a
//! server template embeds). Both are normalized into [`Feature`] values here
//! before anything else sees them.

use crate::feature::{Feature, FeatureId, LatLon};
use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("feature source unreachable: {0}")]
    Http(#[from] reqwest::Error),
    #[error("feature source unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("feature source is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed feature source: {0}")]
    Malformed(String),
}

/// Where features come from.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureSource {
    Url(String),
    File(PathBuf),
    Inline(String),
}

impl FeatureSource {
    /// `http://` and `https://` locations are fetched, anything else is a path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::File(PathBuf::from(location))
        }
    }

    fn read_text(&self) -> Result<String, LoadError> {
        match self {
            Self::Url(url) => {
                info!("Fetching features — url={}", url);
                let client = reqwest::blocking::Client::builder()
                    .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
                    .build()?;
                let body = client.get(url).send()?.error_for_status()?.text()?;
                debug!("Fetched feature document — bytes={}", body.len());
                Ok(body)
            }
            Self::File(path) => {
                info!("Reading features — path={}", path.display());
                Ok(fs::read_to_string(path)?)
            }
            Self::Inline(text) => Ok(text.clone()),
        }
    }
}

/// The set of features a page was loaded with. Immutable apart from the
/// admin append of a geocoded location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureStore {
    features: Vec<Feature>,
}

impl FeatureStore {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn load(source: &FeatureSource) -> Result<Self, LoadError> {
        let text = source.read_text()?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, LoadError> {
        let document: Value = serde_json::from_str(text)?;
        Self::from_json_value(document)
    }

    pub fn from_json_value(document: Value) -> Result<Self, LoadError> {
        let records = match document {
            Value::Array(records) => records,
            Value::Object(mut object) => {
                let kind = object.get("type").and_then(Value::as_str).unwrap_or("");
                if kind != "FeatureCollection" {
                    return Err(LoadError::Malformed(format!(
                        "expected a FeatureCollection, found type '{}'",
                        kind
                    )));
                }
                match object.remove("features") {
                    Some(Value::Array(features)) => features,
                    _ => {
                        return Err(LoadError::Malformed(
                            "FeatureCollection has no features array".to_string(),
                        ))
                    }
                }
            }
            other => {
                return Err(LoadError::Malformed(format!(
                    "expected an array or a FeatureCollection, found {}",
                    json_kind(&other)
                )))
            }
        };

        let total = records.len();
        let mut features = Vec::with_capacity(total);
        let mut seen = HashSet::new();

        for (index, record) in records.into_iter().enumerate() {
            let feature = match normalize_record(index, record) {
                Ok(f) => f,
                Err(reason) => {
                    warn!("Dropping feature record — index={} reason={}", index, reason);
                    continue;
                }
            };
            if !seen.insert(feature.id.clone()) {
                warn!(
                    "Dropping feature record with duplicate id — index={} id={}",
                    index, feature.id
                );
                continue;
            }
            features.push(feature);
        }

        info!(
            "Loaded features — accepted={} dropped={}",
            features.len(),
            total - features.len()
        );
        Ok(Self { features })
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, id: &FeatureId) -> Option<&Feature> {
        self.features.iter().find(|f| &f.id == id)
    }

    /// Distinct categories in first-seen order, for the filter drop-down.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.features
            .iter()
            .filter_map(|f| f.category.as_ref())
            .filter(|c| seen.insert(c.as_str()))
            .cloned()
            .collect()
    }

    /// Case-insensitive display-name lookup.
    pub fn find_by_name(&self, name: &str) -> Option<&Feature> {
        let wanted = name.to_lowercase();
        self.features.iter().find(|f| {
            f.display_name
                .as_deref()
                .is_some_and(|n| n.to_lowercase() == wanted)
        })
    }

    /// `"<lat>, <lon>"` for the named feature.
    pub fn coordinates_for(&self, name: &str) -> Option<String> {
        self.find_by_name(name).map(|f| f.coordinates.to_string())
    }

    /// Appends a feature, re-keying it when its id is already taken.
    pub fn append(&mut self, mut feature: Feature) -> FeatureId {
        if self.get(&feature.id).is_some() {
            feature.id = self.next_free_id();
        }
        let id = feature.id.clone();
        debug!("Appended feature — id={} total={}", id, self.features.len() + 1);
        self.features.push(feature);
        id
    }

    /// Drops the feature with `id`, returning it.
    pub fn remove(&mut self, id: &FeatureId) -> Option<Feature> {
        let index = self.features.iter().position(|f| &f.id == id)?;
        debug!("Removed feature — id={} total={}", id, self.features.len() - 1);
        Some(self.features.remove(index))
    }

    /// Moves the feature with `id`. Returns `false` when there is none.
    pub fn relocate(&mut self, id: &FeatureId, at: LatLon) -> bool {
        match self.features.iter_mut().find(|f| &f.id == id) {
            Some(feature) => {
                feature.coordinates = at;
                true
            }
            None => false,
        }
    }

    fn next_free_id(&self) -> FeatureId {
        let mut n = self.features.len();
        loop {
            let candidate = FeatureId::from(n);
            if self.get(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }
}

/// A GeoJSON file fetched at most once per page and kept in memory.
#[derive(Debug, Clone)]
pub struct StaticGeoJson {
    source: FeatureSource,
    cached: Option<FeatureStore>,
}

impl StaticGeoJson {
    pub fn new(source: FeatureSource) -> Self {
        Self {
            source,
            cached: None,
        }
    }

    pub fn store(&mut self) -> Result<&FeatureStore, LoadError> {
        if self.cached.is_none() {
            self.cached = Some(FeatureStore::load(&self.source)?);
        } else {
            debug!("Using cached GeoJSON document");
        }
        self.cached
            .as_ref()
            .ok_or_else(|| LoadError::Malformed("GeoJSON cache is empty".to_string()))
    }

    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    /// The resource location offered by the "download" link, unchanged.
    pub fn download_url(&self) -> String {
        match &self.source {
            FeatureSource::Url(url) => url.clone(),
            FeatureSource::File(path) => path.display().to_string(),
            FeatureSource::Inline(_) => String::new(),
        }
    }
}

// --- Normalization ---

/// A flat backend record, also used for GeoJSON `properties`. Spelling
/// variants are separate fields so a record carrying both never fails.
#[derive(Debug, Default, Deserialize)]
struct RawRecord {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    cuisine: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    rating: Option<Value>,
    #[serde(default)]
    lat: Option<Value>,
    #[serde(default)]
    lon: Option<Value>,
    #[serde(default)]
    lng: Option<Value>,
    /// `[lon, lat]`, as handed to `setLngLat`.
    #[serde(default)]
    coords: Option<Vec<f64>>,
    #[serde(default)]
    desc: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Vec<f64>,
}

fn normalize_record(index: usize, record: Value) -> Result<Feature, String> {
    if !record.is_object() {
        return Err(format!("expected an object, found {}", json_kind(&record)));
    }

    if record.get("geometry").is_some() {
        normalize_geojson_feature(index, record)
    } else {
        let raw: RawRecord = serde_json::from_value(record).map_err(|e| e.to_string())?;
        let coordinates = flat_coordinates(&raw)?;
        Ok(build_feature(index, None, raw, coordinates))
    }
}

fn normalize_geojson_feature(index: usize, mut record: Value) -> Result<Feature, String> {
    let geometry = record
        .get_mut("geometry")
        .map(Value::take)
        .filter(|g| !g.is_null())
        .ok_or("missing geometry")?;
    let geometry: RawGeometry = serde_json::from_value(geometry).map_err(|e| e.to_string())?;
    if geometry.kind != "Point" {
        return Err(format!("unsupported geometry type '{}'", geometry.kind));
    }
    if geometry.coordinates.len() < 2 {
        return Err("point has fewer than two coordinates".to_string());
    }
    let coordinates =
        LatLon::from_lon_lat([geometry.coordinates[0], geometry.coordinates[1]])
            .map_err(|e| e.to_string())?;

    let feature_id = record.get("id").and_then(id_string);
    let properties = match record.get_mut("properties").map(Value::take) {
        Some(Value::Null) | None => RawRecord::default(),
        Some(props) => serde_json::from_value(props).map_err(|e| e.to_string())?,
    };
    Ok(build_feature(index, feature_id, properties, coordinates))
}

fn flat_coordinates(raw: &RawRecord) -> Result<LatLon, String> {
    let lat = raw.lat.as_ref().and_then(number);
    let lon = raw.lon.as_ref().or(raw.lng.as_ref()).and_then(number);
    match (lat, lon, raw.coords.as_deref()) {
        (Some(lat), Some(lon), _) => LatLon::new(lat, lon).map_err(|e| e.to_string()),
        (_, _, Some([lon, lat, ..])) => LatLon::new(*lat, *lon).map_err(|e| e.to_string()),
        _ => Err("missing coordinates".to_string()),
    }
}

fn build_feature(
    index: usize,
    feature_id: Option<String>,
    raw: RawRecord,
    coordinates: LatLon,
) -> Feature {
    let id = feature_id
        .or_else(|| raw.id.as_ref().and_then(id_string))
        .map(FeatureId::new)
        .unwrap_or_else(|| FeatureId::from(index));

    Feature {
        id,
        coordinates,
        category: raw.cuisine.or(raw.category).filter(|c| !c.is_empty()),
        rating: raw.rating.as_ref().and_then(number),
        timestamp: raw
            .date
            .as_deref()
            .or(raw.timestamp.as_deref())
            .and_then(parse_date),
        display_name: raw.name.or(raw.city).or(raw.title),
        description: raw.desc.or(raw.description),
        link: raw.link.filter(|l| !l.is_empty()),
    }
}

/// Accepts `YYYY-MM-DD` and RFC 3339 timestamps. Blank strings are "no date".
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = chrono::DateTime::parse_from_rfc3339(text) {
        return Some(stamp.date_naive());
    }
    warn!("Ignoring unparseable date — value={}", text);
    None
}

/// Numbers may arrive as JSON numbers or numeric strings (Nominatim does this).
pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
