// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::feature::{Feature, FeatureId};
use log::debug;

/// The map side of timeline interaction. Kept as a trait so the list never
/// holds a reference to the widget.
pub trait MarkerFocus {
    /// Open the marker's popup, optionally panning to it.
    fn focus(&mut self, id: &FeatureId);
    fn emphasize(&mut self, id: &FeatureId, emphasized: bool);
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineItem {
    pub feature_id: FeatureId,
    pub title: String,
    /// `YYYY-MM-DD`, empty for undated features.
    pub date: String,
    pub active: bool,
}

impl TimelineItem {
    fn from_feature(feature: &Feature) -> Self {
        Self {
            feature_id: feature.id.clone(),
            title: feature.name_or_unknown().to_string(),
            date: feature
                .timestamp
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            active: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct Timeline {
    items: Vec<TimelineItem>,
    hovered: Option<usize>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the list from a projection. The active item survives if its
    /// feature is still visible.
    pub fn render(&mut self, projected: &[Feature]) {
        let active = self.active().map(|item| item.feature_id.clone());
        self.items = projected
            .iter()
            .map(|f| {
                let mut item = TimelineItem::from_feature(f);
                item.active = active.as_ref() == Some(&f.id);
                item
            })
            .collect();
        self.hovered = None;
        debug!("Rendered timeline — items={}", self.items.len());
    }

    pub fn items(&self) -> &[TimelineItem] {
        &self.items
    }

    pub fn active(&self) -> Option<&TimelineItem> {
        self.items.iter().find(|item| item.active)
    }

    pub fn hovered(&self) -> Option<&TimelineItem> {
        self.hovered.and_then(|i| self.items.get(i))
    }

    /// Makes `index` the only active item and focuses its marker.
    /// Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize, focus: &mut dyn MarkerFocus) -> bool {
        if index >= self.items.len() {
            return false;
        }
        for (i, item) in self.items.iter_mut().enumerate() {
            item.active = i == index;
        }
        focus.focus(&self.items[index].feature_id);
        true
    }

    pub fn hover(&mut self, index: usize, focus: &mut dyn MarkerFocus) {
        if self.hovered == Some(index) || index >= self.items.len() {
            return;
        }
        self.hover_end(focus);
        self.hovered = Some(index);
        focus.emphasize(&self.items[index].feature_id, true);
    }

    pub fn hover_end(&mut self, focus: &mut dyn MarkerFocus) {
        if let Some(item) = self.hovered.take().and_then(|i| self.items.get(i)) {
            focus.emphasize(&item.feature_id, false);
        }
    }
}

/// Zoom-dependent label visibility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPolicy {
    pub zoom_threshold: f64,
}

const LABEL_SCALE_STEP: f64 = 0.15;
const LABEL_SCALE_MAX: f64 = 2.0;

impl LabelPolicy {
    pub fn new(zoom_threshold: f64) -> Self {
        Self { zoom_threshold }
    }

    /// `None` hides labels; `Some(scale)` shows them at `scale` times the
    /// base size.
    pub fn label_scale(&self, zoom: f64) -> Option<f64> {
        if zoom < self.zoom_threshold {
            return None;
        }
        let scale = 1.0 + (zoom - self.zoom_threshold) * LABEL_SCALE_STEP;
        Some(scale.min(LABEL_SCALE_MAX))
    }
}
