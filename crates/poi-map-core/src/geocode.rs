// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::feature::LatLon;
use crate::source::number;
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";
const USER_AGENT: &str = concat!("poi-map/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Location not found.")]
    EmptyResult,
    #[error("empty search query")]
    BlankQuery,
    #[error("geocoding service failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("geocoding service returned malformed data: {0}")]
    Malformed(String),
}

impl GeocodeError {
    /// Zero hits and blank queries are ordinary outcomes, not failures.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Malformed(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeCandidate {
    pub display_name: String,
    pub coordinates: LatLon,
}

pub trait Geocoder {
    /// All candidates for `query`, in service order.
    fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError>;

    /// The first candidate. This is a first-match heuristic, not a
    /// best-match: ambiguous names resolve to whatever the service ranks
    /// first.
    fn first_match(&self, query: &str) -> Result<GeocodeCandidate, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodeError::BlankQuery);
        }
        self.search(query)?
            .into_iter()
            .next()
            .ok_or(GeocodeError::EmptyResult)
    }
}

#[derive(Debug, Deserialize)]
struct RawCandidate {
    lat: Value,
    lon: Value,
    #[serde(default)]
    display_name: String,
}

/// Nominatim-compatible search client.
pub struct NominatimGeocoder {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GeocodeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}?format=json&q={}",
            self.base_url,
            urlencoding::encode(query)
        )
    }
}

impl Geocoder for NominatimGeocoder {
    fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
        let url = self.search_url(query);
        info!("Geocoding — query={} url={}", query, url);

        let raw: Vec<RawCandidate> = self
            .client
            .get(&url)
            .send()?
            .error_for_status()?
            .json()
            .map_err(|e| GeocodeError::Malformed(e.to_string()))?;

        let candidates = candidates_from_raw(raw);
        debug!("Geocode results — query={} candidates={}", query, candidates.len());
        Ok(candidates)
    }
}

fn candidates_from_raw(raw: Vec<RawCandidate>) -> Vec<GeocodeCandidate> {
    raw.into_iter()
        .filter_map(|c| {
            let lat = number(&c.lat)?;
            let lon = number(&c.lon)?;
            match LatLon::new(lat, lon) {
                Ok(coordinates) => Some(GeocodeCandidate {
                    display_name: c.display_name,
                    coordinates,
                }),
                Err(e) => {
                    warn!("Skipping geocode candidate — name={} reason={}", c.display_name, e);
                    None
                }
            }
        })
        .collect()
}

/// Parses a raw search response body.
pub fn parse_candidates(body: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
    let raw: Vec<RawCandidate> =
        serde_json::from_str(body).map_err(|e| GeocodeError::Malformed(e.to_string()))?;
    Ok(candidates_from_raw(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<GeocodeCandidate>);

    impl Geocoder for Fixed {
        fn search(&self, _query: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_parse_nominatim_body() {
        let body = r#"[
            {"lat": "48.8588897", "lon": "2.3200410", "display_name": "Paris, France"},
            {"lat": 33.66, "lon": -95.55, "display_name": "Paris, Texas"},
            {"lat": "bogus", "lon": "0", "display_name": "Broken"}
        ]"#;
        let candidates = parse_candidates(body).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].display_name, "Paris, France");
        assert_eq!(candidates[0].coordinates.lat(), 48.8588897);
        assert_eq!(candidates[1].coordinates.lon(), -95.55);
    }

    #[test]
    fn test_first_match() {
        let geocoder = Fixed(parse_candidates(
            r#"[{"lat": "1", "lon": "2", "display_name": "A"},
                {"lat": "3", "lon": "4", "display_name": "B"}]"#,
        )
        .unwrap());
        assert_eq!(geocoder.first_match("x").unwrap().display_name, "A");
        assert!(matches!(
            geocoder.first_match("   "),
            Err(GeocodeError::BlankQuery)
        ));
        assert!(matches!(
            Fixed(Vec::new()).first_match("Paris"),
            Err(GeocodeError::EmptyResult)
        ));
    }

    #[test]
    fn test_search_url_encodes_query() {
        let geocoder = NominatimGeocoder::new(NOMINATIM_SEARCH_URL).unwrap();
        assert_eq!(
            geocoder.search_url("Café de Flore, Paris"),
            "https://nominatim.openstreetmap.org/search?format=json&q=Caf%C3%A9%20de%20Flore%2C%20Paris"
        );
    }

    #[test]
    fn test_empty_result_is_not_a_failure() {
        assert!(!GeocodeError::EmptyResult.is_failure());
        assert!(GeocodeError::Malformed("x".into()).is_failure());
    }
}
