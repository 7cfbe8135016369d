// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::feature::LatLon;
use crate::form::{FieldNaming, LonSpelling};
use crate::geocode::NOMINATIM_SEARCH_URL;
use crate::marker::MarkerStyle;
use crate::timeline::LabelPolicy;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CARTO_LIGHT: &str = "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png";
const OPEN_TOPO: &str = "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png";
const MAPTILER_STREETS: &str = "https://api.maptiler.com/maps/streets/style.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read page config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse page config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid page config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    #[default]
    Food,
    FoodAdmin,
    Cities,
    Summits,
}

/// Everything that differed between the hand-copied map pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub kind: PageKind,
    pub tile_provider_url: String,
    pub attribution: String,
    /// `[lat, lon]`
    pub center: [f64; 2],
    pub zoom: f64,
    pub clustering_enabled: bool,
    pub label_zoom_threshold: f64,
    pub color_by_rating: bool,
    /// Pages without ratings start with no rating floor.
    pub rating_filter: bool,
    /// Admin pages make markers draggable, write form fields, and append
    /// geocoded locations to the store.
    pub admin: bool,
    /// Backend markers can be dragged to edit their row. The food admin
    /// page keeps them fixed.
    pub draggable_markers: bool,
    pub feature_source: String,
    pub geocoder_url: String,
    pub field_naming: FieldNaming,
    pub fit_bounds_padding: f64,
    pub search_zoom: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self::preset(PageKind::Food)
    }
}

impl PageConfig {
    pub fn preset(kind: PageKind) -> Self {
        let base = Self {
            kind,
            tile_provider_url: CARTO_LIGHT.to_string(),
            attribution: "&copy; OpenStreetMap contributors".to_string(),
            center: [20.0, 80.0],
            zoom: 2.0,
            clustering_enabled: false,
            label_zoom_threshold: 14.0,
            color_by_rating: false,
            rating_filter: false,
            admin: true,
            draggable_markers: true,
            feature_source: String::new(),
            geocoder_url: NOMINATIM_SEARCH_URL.to_string(),
            field_naming: FieldNaming::default(),
            fit_bounds_padding: 0.2,
            search_zoom: 12.0,
        };

        match kind {
            PageKind::Food => Self {
                tile_provider_url: MAPTILER_STREETS.to_string(),
                attribution: "&copy; MapTiler &copy; OpenStreetMap contributors".to_string(),
                center: [37.78, -122.42],
                zoom: 13.0,
                color_by_rating: true,
                rating_filter: true,
                admin: false,
                draggable_markers: false,
                feature_source: "http://127.0.0.1:5000/api/food".to_string(),
                ..base
            },
            PageKind::FoodAdmin => Self {
                draggable_markers: false,
                color_by_rating: true,
                rating_filter: true,
                feature_source: "http://127.0.0.1:5000/api/food".to_string(),
                field_naming: FieldNaming {
                    lon_spelling: LonSpelling::Lon,
                    name_field: "new_name".to_string(),
                },
                ..base
            },
            PageKind::Cities => Self {
                feature_source: "static/data/cities.geojson".to_string(),
                field_naming: FieldNaming {
                    lon_spelling: LonSpelling::Lng,
                    name_field: "new_city".to_string(),
                },
                ..base
            },
            PageKind::Summits => Self {
                tile_provider_url: OPEN_TOPO.to_string(),
                attribution: "Map data: &copy; OpenStreetMap, OpenTopoMap".to_string(),
                center: [30.0, 90.0],
                zoom: 4.0,
                feature_source: "static/data/summits.geojson".to_string(),
                ..base
            },
        }
    }

    pub fn default_path() -> PathBuf {
        crate::get_config_root().join("page.json")
    }

    /// Reads `path`, falling back to the `kind` preset when it does not exist.
    pub fn load(path: &Path, kind: PageKind) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(
                "No page config found; using preset — path={} kind={:?}",
                path.display(),
                kind
            );
            return Ok(Self::preset(kind));
        }
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        info!(
            "Loaded page config — path={} kind={:?}",
            path.display(),
            config.kind
        );
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.label_zoom_threshold.is_finite() || self.label_zoom_threshold < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "label_zoom_threshold must be a non-negative number, got {}",
                self.label_zoom_threshold
            )));
        }
        if !self.zoom.is_finite() || !self.search_zoom.is_finite() {
            return Err(ConfigError::Invalid("zoom levels must be finite".to_string()));
        }
        if !self.fit_bounds_padding.is_finite() || self.fit_bounds_padding < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "fit_bounds_padding must be non-negative, got {}",
                self.fit_bounds_padding
            )));
        }
        self.center()?;
        Ok(())
    }

    pub fn center(&self) -> Result<LatLon, ConfigError> {
        LatLon::new(self.center[0], self.center[1])
            .map_err(|e| ConfigError::Invalid(format!("center: {}", e)))
    }

    pub fn marker_style(&self) -> MarkerStyle {
        MarkerStyle {
            color_by_rating: self.color_by_rating,
            draggable: self.admin && self.draggable_markers,
        }
    }

    pub fn label_policy(&self) -> LabelPolicy {
        LabelPolicy::new(self.label_zoom_threshold)
    }
}
