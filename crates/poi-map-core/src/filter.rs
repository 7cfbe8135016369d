// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::feature::Feature;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// Drop-down values: the literal `"All"` selects everything.
    pub fn from_selection(value: &str) -> Self {
        if value == "All" {
            Self::All
        } else {
            Self::Only(value.to_string())
        }
    }

    pub fn matches(&self, category: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => category == Some(wanted.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub category: CategoryFilter,
    pub min_rating: f64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            category: CategoryFilter::All,
            min_rating: 0.0,
        }
    }
}

impl FilterState {
    pub fn new(category: CategoryFilter, min_rating: f64) -> Self {
        Self {
            category,
            min_rating,
        }
    }

    /// No rating floor at all, for pages whose features carry no ratings.
    pub fn unrestricted() -> Self {
        Self::new(CategoryFilter::All, f64::NEG_INFINITY)
    }

    pub fn matches(&self, feature: &Feature) -> bool {
        // A missing rating counts as -inf so it never clears a minimum.
        let rating = feature.rating.unwrap_or(f64::NEG_INFINITY);
        self.category.matches(feature.category.as_deref()) && rating >= self.min_rating
    }
}

/// The visible subset of `features` under `filter`.
///
/// When any visible feature is dated, the result is sorted by date with
/// undated features first; `sort_by` is stable so equal dates keep their
/// store order. Otherwise store order is kept as-is.
pub fn project(features: &[Feature], filter: &FilterState) -> Vec<Feature> {
    let mut visible: Vec<Feature> = features
        .iter()
        .filter(|f| filter.matches(f))
        .cloned()
        .collect();

    if visible.iter().any(|f| f.timestamp.is_some()) {
        visible.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    }

    log::debug!(
        "Projected features — total={} visible={} category={:?} min_rating={}",
        features.len(),
        visible.len(),
        filter.category,
        filter.min_rating
    );
    visible
}
