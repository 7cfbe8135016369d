// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod bounds;
pub mod config;
pub mod feature;
pub mod filter;
pub mod form;
pub mod geocode;
pub mod marker;
pub mod page;
pub mod source;
pub mod timeline;

pub use config::{ConfigError, PageConfig, PageKind};
pub use feature::{Feature, FeatureId, LatLon};
pub use filter::{project, CategoryFilter, FilterState};
pub use geocode::{GeocodeCandidate, GeocodeError, Geocoder, NominatimGeocoder};
pub use marker::{MapWidget, MarkerHandle, MarkerSet};
pub use page::{MapPage, Notice, NoticeLevel, PageCommand, PageMessage};
pub use source::{FeatureSource, FeatureStore, LoadError, StaticGeoJson};

use std::path::PathBuf;

/// Per-user configuration directory, `./` when the platform has none.
pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("org", "poi-map", "poi-map")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
