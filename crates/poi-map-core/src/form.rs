// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Coordinate hand-off to a server-rendered form.
//!
//! Map clicks, marker drags and geocode hits write into input fields named
//! by convention: `lat_<id>` / `lng_<id>` for existing rows and
//! `new_lat` / `new_lng` for the add-location row. The submission backend
//! parses exactly these names with six decimal places.

use crate::feature::{FeatureId, LatLon};
use crate::geocode::GeocodeCandidate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub trait FormSink {
    fn set_field(&mut self, name: &str, value: &str);
}

/// The food admin page says `lon`, the city and summit pages say `lng`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LonSpelling {
    #[default]
    Lng,
    Lon,
}

impl LonSpelling {
    fn as_str(self) -> &'static str {
        match self {
            Self::Lng => "lng",
            Self::Lon => "lon",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldNaming {
    #[serde(default)]
    pub lon_spelling: LonSpelling,
    /// Receives the geocoder's display name: `new_name`, `new_city`.
    pub name_field: String,
}

impl Default for FieldNaming {
    fn default() -> Self {
        Self {
            lon_spelling: LonSpelling::Lng,
            name_field: "new_name".to_string(),
        }
    }
}

impl FieldNaming {
    pub fn new_lat(&self) -> String {
        "new_lat".to_string()
    }

    pub fn new_lon(&self) -> String {
        format!("new_{}", self.lon_spelling.as_str())
    }

    pub fn lat_for(&self, id: &FeatureId) -> String {
        format!("lat_{}", id)
    }

    pub fn lon_for(&self, id: &FeatureId) -> String {
        format!("{}_{}", self.lon_spelling.as_str(), id)
    }
}

pub fn format_coordinate(value: f64) -> String {
    format!("{:.6}", value)
}

/// Map click: fill the add-location coordinates.
pub fn write_new_location(sink: &mut dyn FormSink, naming: &FieldNaming, at: LatLon) {
    sink.set_field(&naming.new_lat(), &format_coordinate(at.lat()));
    sink.set_field(&naming.new_lon(), &format_coordinate(at.lon()));
}

/// Marker drag end: update the hidden inputs of an existing row.
pub fn write_moved_feature(
    sink: &mut dyn FormSink,
    naming: &FieldNaming,
    id: &FeatureId,
    at: LatLon,
) {
    sink.set_field(&naming.lat_for(id), &format_coordinate(at.lat()));
    sink.set_field(&naming.lon_for(id), &format_coordinate(at.lon()));
}

/// Geocode hit: fill the add-location row including its name.
pub fn write_geocoded_location(
    sink: &mut dyn FormSink,
    naming: &FieldNaming,
    candidate: &GeocodeCandidate,
) {
    write_new_location(sink, naming, candidate.coordinates);
    sink.set_field(&naming.name_field, &candidate.display_name);
}

/// In-memory field values, in name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormFields(BTreeMap<String, String>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FormSink for FormFields {
    fn set_field(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_decimal_places() {
        assert_eq!(format_coordinate(37.78), "37.780000");
        assert_eq!(format_coordinate(-122.419412345), "-122.419412");
        assert_eq!(format_coordinate(0.0), "0.000000");
    }

    #[test]
    fn test_field_names() {
        let lng = FieldNaming::default();
        let lon = FieldNaming {
            lon_spelling: LonSpelling::Lon,
            name_field: "new_name".into(),
        };
        let id = FeatureId::new("7");
        assert_eq!(lng.new_lon(), "new_lng");
        assert_eq!(lon.new_lon(), "new_lon");
        assert_eq!(lng.lat_for(&id), "lat_7");
        assert_eq!(lng.lon_for(&id), "lng_7");
        assert_eq!(lon.lon_for(&id), "lon_7");
    }

    #[test]
    fn test_write_moved_feature() {
        let mut fields = FormFields::new();
        let at = LatLon::new(27.9881, 86.925).unwrap();
        write_moved_feature(&mut fields, &FieldNaming::default(), &FeatureId::new("3"), at);
        assert_eq!(fields.get("lat_3"), Some("27.988100"));
        assert_eq!(fields.get("lng_3"), Some("86.925000"));
    }
}
