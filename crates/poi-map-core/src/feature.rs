// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("coordinates out of range: lat={lat} lon={lon}")]
pub struct InvalidCoordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A validated WGS84 position. Latitude is always in [-90, 90] and
/// longitude in [-180, 180]; both are finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    lat: f64,
    lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Result<Self, InvalidCoordinates> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        if valid {
            Ok(Self { lat, lon })
        } else {
            Err(InvalidCoordinates { lat, lon })
        }
    }

    /// GeoJSON order is `[lon, lat]`.
    pub fn from_lon_lat(pair: [f64; 2]) -> Result<Self, InvalidCoordinates> {
        Self::new(pair[1], pair[0])
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureId(String);

impl FeatureId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<usize> for FeatureId {
    fn from(index: usize) -> Self {
        Self(index.to_string())
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One point of interest: a restaurant, a visited city, a summit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub coordinates: LatLon,
    /// Cuisine for food pages. `None` means unspecified.
    pub category: Option<String>,
    pub rating: Option<f64>,
    pub timestamp: Option<NaiveDate>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
}

impl Feature {
    pub fn new(id: impl Into<FeatureId>, coordinates: LatLon) -> Self {
        Self {
            id: id.into(),
            coordinates,
            category: None,
            rating: None,
            timestamp: None,
            display_name: None,
            description: None,
            link: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_timestamp(mut self, date: NaiveDate) -> Self {
        self.timestamp = Some(date);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn name_or_unknown(&self) -> &str {
        self.display_name.as_deref().unwrap_or("Unknown")
    }
}

impl From<&str> for FeatureId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for FeatureId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
