// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

#![allow(dead_code)]

use chrono::NaiveDate;
use poi_map_core::bounds::BoundingBox;
use poi_map_core::marker::{MapWidget, MarkerHandle, MarkerOptions};
use poi_map_core::{Feature, LatLon};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetCall {
    Add(MarkerHandle),
    Remove(MarkerHandle),
    Popup(MarkerHandle, String),
    Opacity(MarkerHandle, f32),
    Open(MarkerHandle),
    FlyTo(LatLon, f64),
    Fit(BoundingBox),
    LabelScale(Option<f64>),
}

/// Map widget fake that records every call and tracks live markers.
#[derive(Debug, Default)]
pub struct RecordingWidget {
    next_handle: u64,
    pub live: BTreeMap<MarkerHandle, MarkerOptions>,
    pub calls: Vec<WidgetCall>,
}

impl RecordingWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn added(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, WidgetCall::Add(_)))
            .count()
    }

    pub fn removed(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, WidgetCall::Remove(_)))
            .count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl MapWidget for RecordingWidget {
    fn add_marker(&mut self, options: &MarkerOptions) -> MarkerHandle {
        self.next_handle += 1;
        let handle = MarkerHandle(self.next_handle);
        self.live.insert(handle, options.clone());
        self.calls.push(WidgetCall::Add(handle));
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        assert!(
            self.live.remove(&handle).is_some(),
            "removed a marker that is not on the map: {:?}",
            handle
        );
        self.calls.push(WidgetCall::Remove(handle));
    }

    fn set_popup(&mut self, handle: MarkerHandle, html: &str) {
        self.calls.push(WidgetCall::Popup(handle, html.to_string()));
    }

    fn set_opacity(&mut self, handle: MarkerHandle, opacity: f32) {
        self.calls.push(WidgetCall::Opacity(handle, opacity));
    }

    fn open_popup(&mut self, handle: MarkerHandle) {
        self.calls.push(WidgetCall::Open(handle));
    }

    fn fly_to(&mut self, center: LatLon, zoom: f64) {
        self.calls.push(WidgetCall::FlyTo(center, zoom));
    }

    fn fit_bounds(&mut self, bounds: &BoundingBox) {
        self.calls.push(WidgetCall::Fit(bounds.clone()));
    }

    fn set_label_scale(&mut self, scale: Option<f64>) {
        self.calls.push(WidgetCall::LabelScale(scale));
    }
}

/// Routes library logging to the test harness's captured output.
pub fn init_logging() {
    let _ = simplelog::TestLogger::init(
        simplelog::LevelFilter::Debug,
        simplelog::Config::default(),
    );
}

pub fn place(id: &str, lat: f64, lon: f64) -> Feature {
    Feature::new(id, LatLon::new(lat, lon).unwrap()).with_name(id)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub const FOOD_JSON: &str = r#"[
    {"id": 1, "name": "Beijing Duck House", "city": "Beijing", "cuisine": "Chinese", "rating": 4.6,
     "lat": 39.9042, "lon": 116.4074, "desc": "Peking duck", "link": "https://maps.example/1"},
    {"id": 2, "name": "Thamel Momo", "city": "Kathmandu", "cuisine": "Nepali", "rating": 3.2,
     "lat": 27.7172, "lon": 85.3240},
    {"id": 3, "name": "Sushi House", "cuisine": "Japanese", "rating": 4.5,
     "lat": 37.78, "lon": -122.42},
    {"id": 4, "name": "Taco Fiesta", "cuisine": "Mexican", "rating": 4.0,
     "lat": 37.77, "lon": -122.43}
]"#;
