// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::feature::LatLon;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Smallest box around `points`; `None` when there are none.
    pub fn around<'a>(points: impl IntoIterator<Item = &'a LatLon>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self::new(first.lat(), first.lat(), first.lon(), first.lon());
        for p in points {
            bounds.min_lat = bounds.min_lat.min(p.lat());
            bounds.max_lat = bounds.max_lat.max(p.lat());
            bounds.min_lon = bounds.min_lon.min(p.lon());
            bounds.max_lon = bounds.max_lon.max(p.lon());
        }
        Some(bounds)
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    pub fn is_valid(&self) -> bool {
        [self.min_lat, self.max_lat, self.min_lon, self.max_lon]
            .iter()
            .all(|v| v.is_finite())
            && self.min_lat <= self.max_lat
            && self.min_lon <= self.max_lon
    }

    /// Grows each side by `ratio` of the box's extent, clamped to the globe.
    pub fn pad(&self, ratio: f64) -> Self {
        let lat_pad = (self.max_lat - self.min_lat).abs() * ratio;
        let lon_pad = (self.max_lon - self.min_lon).abs() * ratio;
        Self {
            min_lat: (self.min_lat - lat_pad).max(-90.0),
            max_lat: (self.max_lat + lat_pad).min(90.0),
            min_lon: (self.min_lon - lon_pad).max(-180.0),
            max_lon: (self.max_lon + lon_pad).min(180.0),
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}
