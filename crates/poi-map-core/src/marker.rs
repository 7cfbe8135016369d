// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Marker reconciliation against a map widget.
//!
//! The widget (Leaflet, MapLibre, Mapbox, or a test fake) owns how a marker
//! looks once created. This module owns which features have a marker.

use crate::bounds::BoundingBox;
use crate::feature::{Feature, FeatureId, LatLon};
use log::debug;
use std::collections::HashMap;

/// Opaque widget-side marker reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerHandle(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerOptions {
    pub position: LatLon,
    pub color: String,
    pub draggable: bool,
    pub label: Option<String>,
}

/// The capabilities the core needs from a map library.
pub trait MapWidget {
    fn add_marker(&mut self, options: &MarkerOptions) -> MarkerHandle;
    fn remove_marker(&mut self, handle: MarkerHandle);
    /// `html` has already been escaped.
    fn set_popup(&mut self, handle: MarkerHandle, html: &str);
    fn set_opacity(&mut self, handle: MarkerHandle, opacity: f32);
    fn open_popup(&mut self, handle: MarkerHandle);
    fn fly_to(&mut self, center: LatLon, zoom: f64);
    fn fit_bounds(&mut self, bounds: &BoundingBox);
    /// `None` hides marker labels. Widgets without labels ignore this.
    fn set_label_scale(&mut self, _scale: Option<f64>) {}
}

pub const BASE_OPACITY: f32 = 0.8;
pub const EMPHASIS_OPACITY: f32 = 1.0;

pub const DEFAULT_MARKER_COLOR: &str = "#FF5722";
pub const SEARCH_MARKER_COLOR: &str = "#1976D2";

/// Three-step marker color by rating.
pub fn rating_color(rating: f64) -> &'static str {
    if rating >= 4.5 {
        "#2E7D32"
    } else if rating >= 4.0 {
        "#FFB300"
    } else {
        "#D32F2F"
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendBand {
    pub color: &'static str,
    pub label: &'static str,
}

pub const RATING_LEGEND: [LegendBand; 5] = [
    LegendBand { color: "#2E7D32", label: "4.5–5 ⭐" },
    LegendBand { color: "#558B2F", label: "4.0–4.4 ⭐" },
    LegendBand { color: "#FBC02D", label: "3.5–3.9 ⭐" },
    LegendBand { color: "#F57C00", label: "3.0–3.4 ⭐" },
    LegendBand { color: "#D32F2F", label: "<3 ⭐" },
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerStyle {
    pub color_by_rating: bool,
    pub draggable: bool,
}

impl MarkerStyle {
    pub fn color_for(&self, feature: &Feature) -> String {
        match feature.rating {
            Some(r) if self.color_by_rating => rating_color(r).to_string(),
            _ => DEFAULT_MARKER_COLOR.to_string(),
        }
    }

    pub fn options_for(&self, feature: &Feature) -> MarkerOptions {
        MarkerOptions {
            position: feature.coordinates,
            color: self.color_for(feature),
            draggable: self.draggable,
            label: feature.display_name.clone(),
        }
    }
}

/// Popup body for a feature. Every interpolated string is HTML-escaped,
/// since names and descriptions may come from a geocoder.
pub fn popup_html(feature: &Feature) -> String {
    let mut html = format!(
        "<strong>{}</strong>",
        html_escape::encode_text(feature.name_or_unknown())
    );
    if let Some(category) = &feature.category {
        html.push_str(&format!("<br>Cuisine: {}", html_escape::encode_text(category)));
    }
    if let Some(rating) = feature.rating {
        html.push_str(&format!("<br>⭐ {}", rating));
    }
    if let Some(date) = feature.timestamp {
        html.push_str(&format!("<br>{}", date.format("%Y-%m-%d")));
    }
    if let Some(desc) = &feature.description {
        html.push_str(&format!("<br><em>{}</em>", html_escape::encode_text(desc)));
    }
    if let Some(link) = &feature.link {
        html.push_str(&format!(
            "<br><a href=\"{}\" target=\"_blank\">Get Directions</a>",
            html_escape::encode_double_quoted_attribute(link)
        ));
    }
    html
}

/// Popup body for a geocoder hit.
pub fn search_popup_html(display_name: &str) -> String {
    format!("<b>{}</b>", html_escape::encode_text(display_name))
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMarker {
    pub feature: Feature,
    pub handle: MarkerHandle,
}

/// The markers currently on the map, one per visible feature, in
/// projection order.
#[derive(Debug, Default)]
pub struct MarkerSet {
    rendered: Vec<RenderedMarker>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the widget in line with `projected`.
    ///
    /// Markers for features that left the projection are removed, new ones
    /// are created, and markers whose feature is unchanged are kept as they
    /// are. A feature that kept its id but changed content is re-created.
    pub fn reconcile<W: MapWidget + ?Sized>(
        &mut self,
        projected: &[Feature],
        style: &MarkerStyle,
        widget: &mut W,
    ) {
        let mut previous: HashMap<FeatureId, RenderedMarker> = self
            .rendered
            .drain(..)
            .map(|m| (m.feature.id.clone(), m))
            .collect();

        let mut kept = 0usize;
        let mut created = 0usize;
        let mut next = Vec::with_capacity(projected.len());

        for feature in projected {
            match previous.remove(&feature.id) {
                Some(existing) if existing.feature == *feature => {
                    kept += 1;
                    next.push(existing);
                }
                stale => {
                    if let Some(stale) = stale {
                        widget.remove_marker(stale.handle);
                    }
                    let handle = create_marker(feature, style, widget);
                    created += 1;
                    next.push(RenderedMarker {
                        feature: feature.clone(),
                        handle,
                    });
                }
            }
        }

        let removed = previous.len();
        for (_, gone) in previous {
            widget.remove_marker(gone.handle);
        }

        debug!(
            "Reconciled markers — kept={} created={} removed={}",
            kept, created, removed
        );
        self.rendered = next;
    }

    /// Removes every marker from the widget.
    pub fn clear<W: MapWidget + ?Sized>(&mut self, widget: &mut W) {
        for marker in self.rendered.drain(..) {
            widget.remove_marker(marker.handle);
        }
    }

    pub fn rendered(&self) -> &[RenderedMarker] {
        &self.rendered
    }

    pub fn len(&self) -> usize {
        self.rendered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }

    pub fn handle_for(&self, id: &FeatureId) -> Option<MarkerHandle> {
        self.rendered
            .iter()
            .find(|m| &m.feature.id == id)
            .map(|m| m.handle)
    }

    pub fn feature_for(&self, handle: MarkerHandle) -> Option<&Feature> {
        self.rendered
            .iter()
            .find(|m| m.handle == handle)
            .map(|m| &m.feature)
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::around(self.rendered.iter().map(|m| &m.feature.coordinates))
    }
}

fn create_marker<W: MapWidget + ?Sized>(
    feature: &Feature,
    style: &MarkerStyle,
    widget: &mut W,
) -> MarkerHandle {
    let handle = widget.add_marker(&style.options_for(feature));
    widget.set_popup(handle, &popup_html(feature));
    widget.set_opacity(handle, BASE_OPACITY);
    handle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_color() {
        assert_eq!(rating_color(4.9), "#2E7D32");
        assert_eq!(rating_color(4.5), "#2E7D32");
        assert_eq!(rating_color(4.0), "#FFB300");
        assert_eq!(rating_color(3.9), "#D32F2F");
    }

    #[test]
    fn test_color_without_rating_uses_default() {
        let style = MarkerStyle {
            color_by_rating: true,
            ..MarkerStyle::default()
        };
        let f = Feature::new("1", LatLon::new(0.0, 0.0).unwrap());
        assert_eq!(style.color_for(&f), DEFAULT_MARKER_COLOR);
        assert_eq!(style.color_for(&f.with_rating(4.6)), "#2E7D32");
    }

    #[test]
    fn test_popup_escapes_text() {
        let f = Feature::new("1", LatLon::new(0.0, 0.0).unwrap())
            .with_name("<script>alert(1)</script>")
            .with_category("Thai & Lao")
            .with_link("https://example.com/?a=1&b=\"2\"");
        let html = popup_html(&f);
        assert!(html.starts_with("<strong>&lt;script&gt;alert(1)&lt;/script&gt;</strong>"));
        assert!(html.contains("Cuisine: Thai &amp; Lao"));
        assert!(html.contains("href=\"https://example.com/?a=1&amp;b=&quot;2&quot;\""));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_popup_omits_missing_fields() {
        let f = Feature::new("1", LatLon::new(0.0, 0.0).unwrap()).with_name("Beijing");
        assert_eq!(popup_html(&f), "<strong>Beijing</strong>");
        assert_eq!(search_popup_html("Paris & Co"), "<b>Paris &amp; Co</b>");
    }
}
