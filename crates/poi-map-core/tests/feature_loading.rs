// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

mod common;

use common::FOOD_JSON;
use poi_map_core::{FeatureSource, FeatureStore, LoadError, StaticGeoJson};
use std::fs;

#[test]
fn test_load_flat_array_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("food.json");
    fs::write(&path, FOOD_JSON).unwrap();

    let store = FeatureStore::load(&FeatureSource::File(path)).unwrap();
    assert_eq!(store.len(), 4);

    let beijing = store.find_by_name("beijing duck house").unwrap();
    assert_eq!(beijing.id.as_str(), "1");
    assert_eq!(beijing.category.as_deref(), Some("Chinese"));
    assert_eq!(beijing.rating, Some(4.6));
    assert_eq!(beijing.description.as_deref(), Some("Peking duck"));
    assert_eq!(beijing.link.as_deref(), Some("https://maps.example/1"));
    assert_eq!(
        store.coordinates_for("Beijing Duck House").as_deref(),
        Some("39.9042, 116.4074")
    );
    assert!(store.coordinates_for("Atlantis").is_none());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = FeatureStore::load(&FeatureSource::File(dir.path().join("nope.json")));
    assert!(matches!(result, Err(LoadError::Io(_))));
}

#[test]
fn test_garbage_is_json_error() {
    let result = FeatureStore::load(&FeatureSource::Inline("not json".to_string()));
    assert!(matches!(result, Err(LoadError::Json(_))));
}

#[test]
fn test_bad_records_are_dropped_not_fatal() {
    let text = r#"[
        {"id": "ok", "name": "Fine", "lat": 10, "lon": 20},
        {"id": "nocoords", "name": "Lost"},
        {"id": "badlat", "name": "Off the globe", "lat": 123, "lon": 0},
        "a string",
        {"id": "ok", "name": "Duplicate", "lat": 1, "lon": 1},
        {"id": "strings", "name": "Stringly", "lat": "12.5", "lng": "-3.25", "rating": "4.1"},
        {"name": "Coords pair", "coords": [100.5, 13.75]}
    ]"#;

    let store = FeatureStore::from_json_str(text).unwrap();
    let names: Vec<_> = store
        .features()
        .iter()
        .map(|f| f.name_or_unknown().to_string())
        .collect();
    assert_eq!(names, vec!["Fine", "Stringly", "Coords pair"]);

    let stringly = store.find_by_name("Stringly").unwrap();
    assert_eq!(stringly.coordinates.lat(), 12.5);
    assert_eq!(stringly.coordinates.lon(), -3.25);
    assert_eq!(stringly.rating, Some(4.1));

    let pair = store.find_by_name("Coords pair").unwrap();
    assert_eq!(pair.coordinates.lat(), 13.75);
    assert_eq!(pair.coordinates.lon(), 100.5);
}

#[test]
fn test_geojson_feature_collection() {
    let text = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature",
             "geometry": {"type": "Point", "coordinates": [86.925, 27.988]},
             "properties": {"name": "Everest", "date": "2019-05-22T06:30:00Z"}},
            {"type": "Feature",
             "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]},
             "properties": {"name": "Ridge"}},
            {"type": "Feature", "geometry": null, "properties": {"name": "Nowhere"}}
        ]
    }"#;

    let store = FeatureStore::from_json_str(text).unwrap();
    assert_eq!(store.len(), 1);
    let everest = &store.features()[0];
    assert_eq!(everest.coordinates.lat(), 27.988);
    assert_eq!(everest.coordinates.lon(), 86.925);
    assert_eq!(
        everest.timestamp.map(|d| d.to_string()).as_deref(),
        Some("2019-05-22")
    );
    assert_eq!(everest.id.as_str(), "0");
}

#[test]
fn test_wrong_document_shape_is_malformed() {
    for text in [r#"{"type": "Feature"}"#, "42", r#"{"type": "FeatureCollection"}"#] {
        let result = FeatureStore::from_json_str(text);
        assert!(
            matches!(result, Err(LoadError::Malformed(_))),
            "{} should be malformed",
            text
        );
    }
}

#[test]
fn test_static_geojson_loads_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("summits.geojson");
    fs::write(
        &path,
        r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [86.925, 27.988]},
             "properties": {"name": "Everest"}}
        ]}"#,
    )
    .unwrap();

    let mut geojson = StaticGeoJson::new(FeatureSource::File(path.clone()));
    assert!(!geojson.is_cached());
    assert_eq!(geojson.download_url(), path.display().to_string());

    assert_eq!(geojson.store().unwrap().len(), 1);
    assert!(geojson.is_cached());

    // Served from memory once loaded.
    fs::remove_file(&path).unwrap();
    assert_eq!(geojson.store().unwrap().len(), 1);
}

#[test]
fn test_static_geojson_failure_is_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("late.geojson");

    let mut geojson = StaticGeoJson::new(FeatureSource::File(path.clone()));
    assert!(geojson.store().is_err());
    assert!(!geojson.is_cached());

    fs::write(&path, r#"{"type": "FeatureCollection", "features": []}"#).unwrap();
    assert!(geojson.store().unwrap().is_empty());
    assert!(geojson.is_cached());
}

#[test]
fn test_download_url_is_unchanged() {
    let url = "https://example.org/static/data/cities.geojson?v=2";
    let geojson = StaticGeoJson::new(FeatureSource::parse(url));
    assert_eq!(geojson.download_url(), url);
}
