// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! The page view-model.
//!
//! One `MapPage` per map on screen. The host feeds it [`PageMessage`]s from
//! UI events and network completions; it answers with [`PageCommand`]s for
//! work the host has to run (fetches, lookups) and drives the widget
//! directly for everything else. Every accepted load and every filter change
//! re-runs projection, marker reconciliation and the timeline from the
//! current state.

use crate::config::PageConfig;
use crate::feature::{Feature, FeatureId, LatLon};
use crate::filter::{project, CategoryFilter, FilterState};
use crate::form::{self, FormFields};
use crate::geocode::{GeocodeCandidate, GeocodeError, Geocoder};
use crate::marker::{
    search_popup_html, MapWidget, MarkerHandle, MarkerOptions, MarkerSet, MarkerStyle,
    BASE_OPACITY, EMPHASIS_OPACITY, SEARCH_MARKER_COLOR,
};
use crate::source::{FeatureSource, FeatureStore, LoadError};
use crate::timeline::{MarkerFocus, Timeline};
use log::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug)]
pub enum PageMessage {
    LoadRequested,
    FeaturesLoaded(Ticket, Result<FeatureStore, LoadError>),
    CategoryChanged(String),
    MinRatingChanged(f64),
    TimelineSelected(usize),
    TimelineHovered(Option<usize>),
    ZoomChanged(f64),
    MapClicked(LatLon),
    MarkerDragged(MarkerHandle, LatLon),
    GeocodeRequested(String),
    GeocodeCompleted(Ticket, Result<GeocodeCandidate, GeocodeError>),
}

/// Work the host must perform and report back as a message.
#[derive(Debug, Clone, PartialEq)]
pub enum PageCommand {
    Load { ticket: Ticket, source: FeatureSource },
    Geocode { ticket: Ticket, query: String },
}

impl PageCommand {
    /// Runs the command to completion. Blocking; hosts call this off the
    /// event loop and post the returned message back.
    pub fn execute(self, geocoder: &dyn Geocoder) -> PageMessage {
        match self {
            Self::Load { ticket, source } => {
                PageMessage::FeaturesLoaded(ticket, FeatureStore::load(&source))
            }
            Self::Geocode { ticket, query } => {
                PageMessage::GeocodeCompleted(ticket, geocoder.first_match(&query))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-visible message: an alert, a toast, a console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub struct MapPage<W: MapWidget> {
    config: PageConfig,
    style: MarkerStyle,
    store: FeatureStore,
    filter: FilterState,
    projected: Vec<Feature>,
    markers: MarkerSet,
    timeline: Timeline,
    widget: W,
    form: FormFields,
    notices: Vec<Notice>,
    loading: bool,
    next_ticket: u64,
    latest_load: Option<Ticket>,
    latest_geocode: Option<Ticket>,
    search_marker: Option<MarkerHandle>,
    /// Geocoded feature appended on an admin page that has no form row yet.
    pending_new: Option<FeatureId>,
    fitted: bool,
    zoom: f64,
}

impl<W: MapWidget> MapPage<W> {
    pub fn new(config: PageConfig, mut widget: W) -> Self {
        let filter = if config.rating_filter {
            FilterState::default()
        } else {
            FilterState::unrestricted()
        };
        let zoom = config.zoom;
        widget.set_label_scale(config.label_policy().label_scale(zoom));
        Self {
            style: config.marker_style(),
            config,
            store: FeatureStore::default(),
            filter,
            projected: Vec::new(),
            markers: MarkerSet::new(),
            timeline: Timeline::new(),
            widget,
            form: FormFields::new(),
            notices: Vec::new(),
            loading: false,
            next_ticket: 0,
            latest_load: None,
            latest_geocode: None,
            search_marker: None,
            pending_new: None,
            fitted: false,
            zoom,
        }
    }

    pub fn update(&mut self, message: PageMessage) -> Option<PageCommand> {
        match message {
            PageMessage::LoadRequested => {
                let ticket = self.issue_ticket();
                self.latest_load = Some(ticket);
                self.loading = true;
                let source = FeatureSource::parse(&self.config.feature_source);
                info!("Requesting features — ticket={:?} source={:?}", ticket, source);
                return Some(PageCommand::Load { ticket, source });
            }
            PageMessage::FeaturesLoaded(ticket, result) => {
                if self.latest_load != Some(ticket) {
                    warn!(
                        "Ignoring superseded feature load — ticket={:?} latest={:?}",
                        ticket, self.latest_load
                    );
                    return None;
                }
                self.loading = false;
                match result {
                    Ok(store) => {
                        self.store = store;
                        if self.pending_new.take().is_some() {
                            self.remove_search_marker();
                        }
                        self.refresh();
                        self.fit_once();
                    }
                    Err(e) => {
                        error!("Error fetching features: {}", e);
                        self.store = FeatureStore::default();
                        self.pending_new = None;
                        self.remove_search_marker();
                        self.refresh();
                        self.notices
                            .push(Notice::error(format!("Error fetching features: {}", e)));
                    }
                }
            }
            PageMessage::CategoryChanged(selection) => {
                self.filter.category = CategoryFilter::from_selection(&selection);
                self.refresh();
            }
            PageMessage::MinRatingChanged(min_rating) => {
                self.filter.min_rating = min_rating;
                self.refresh();
            }
            PageMessage::TimelineSelected(index) => {
                let mut focus = WidgetFocus {
                    markers: &self.markers,
                    widget: &mut self.widget,
                };
                self.timeline.select(index, &mut focus);
            }
            PageMessage::TimelineHovered(index) => {
                let mut focus = WidgetFocus {
                    markers: &self.markers,
                    widget: &mut self.widget,
                };
                match index {
                    Some(i) => self.timeline.hover(i, &mut focus),
                    None => self.timeline.hover_end(&mut focus),
                }
            }
            PageMessage::ZoomChanged(zoom) => {
                self.zoom = zoom;
                let scale = self.config.label_policy().label_scale(zoom);
                self.widget.set_label_scale(scale);
            }
            PageMessage::MapClicked(at) => {
                if self.config.admin {
                    form::write_new_location(&mut self.form, &self.config.field_naming, at);
                }
            }
            PageMessage::MarkerDragged(handle, at) => self.marker_dragged(handle, at),
            PageMessage::GeocodeRequested(query) => {
                let query = query.trim();
                if query.is_empty() {
                    return None;
                }
                let ticket = self.issue_ticket();
                self.latest_geocode = Some(ticket);
                return Some(PageCommand::Geocode {
                    ticket,
                    query: query.to_string(),
                });
            }
            PageMessage::GeocodeCompleted(ticket, result) => {
                if self.latest_geocode != Some(ticket) {
                    warn!(
                        "Ignoring superseded geocode result — ticket={:?} latest={:?}",
                        ticket, self.latest_geocode
                    );
                    return None;
                }
                match result {
                    Ok(candidate) => self.show_geocoded(candidate),
                    Err(e) if e.is_failure() => {
                        error!("Geocoding error: {}", e);
                        self.notices.push(Notice::error(format!("Geocoding error: {}", e)));
                    }
                    Err(e) => {
                        info!("Geocode returned no candidates");
                        self.notices.push(Notice::info(e.to_string()));
                    }
                }
            }
        }
        None
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    fn refresh(&mut self) {
        let mut focus = WidgetFocus {
            markers: &self.markers,
            widget: &mut self.widget,
        };
        self.timeline.hover_end(&mut focus);

        self.projected = project(self.store.features(), &self.filter);
        self.markers
            .reconcile(&self.projected, &self.style, &mut self.widget);
        self.timeline.render(&self.projected);
        self.sync_pending_marker();
    }

    /// A pending geocoded feature is shown by its own marker when the filter
    /// lets it through, and by the search marker otherwise. Never both.
    fn sync_pending_marker(&mut self) {
        let Some(id) = self.pending_new.clone() else {
            return;
        };
        if self.markers.handle_for(&id).is_some() {
            self.remove_search_marker();
            return;
        }
        if self.search_marker.is_some() {
            return;
        }
        if let Some(feature) = self.store.get(&id) {
            let at = feature.coordinates;
            let name = feature.name_or_unknown().to_string();
            self.place_search_marker(at, &name);
        }
    }

    /// Admin pages frame all markers once, after the first load.
    fn fit_once(&mut self) {
        if self.fitted || !self.config.admin {
            return;
        }
        if let Some(bounds) = self.markers.bounds() {
            let padded = bounds.pad(self.config.fit_bounds_padding);
            if padded.is_valid() {
                self.widget.fit_bounds(&padded);
                self.fitted = true;
            }
        }
    }

    fn marker_dragged(&mut self, handle: MarkerHandle, at: LatLon) {
        if !self.config.admin {
            return;
        }
        let naming = &self.config.field_naming;
        let dragged = if self.search_marker == Some(handle) {
            self.pending_new.clone()
        } else {
            match self.markers.feature_for(handle) {
                Some(feature) if self.pending_new.as_ref() == Some(&feature.id) => {
                    Some(feature.id.clone())
                }
                Some(feature) if self.config.draggable_markers => {
                    form::write_moved_feature(&mut self.form, naming, &feature.id, at);
                    return;
                }
                Some(feature) => {
                    debug!("Ignoring drag on a fixed marker — id={}", feature.id);
                    return;
                }
                None => {
                    debug!("Drag on unknown marker — handle={:?}", handle);
                    return;
                }
            }
        };

        // Search marker or pending feature: refine the add-location row.
        form::write_new_location(&mut self.form, naming, at);
        if let Some(id) = dragged {
            self.store.relocate(&id, at);
        }
    }

    fn show_geocoded(&mut self, candidate: GeocodeCandidate) {
        info!(
            "Geocoded — name={} at={}",
            candidate.display_name, candidate.coordinates
        );
        let target = candidate.coordinates;

        self.remove_search_marker();
        let shown = if self.config.admin {
            form::write_geocoded_location(&mut self.form, &self.config.field_naming, &candidate);
            // Only one unsaved location at a time.
            if let Some(previous) = self.pending_new.take() {
                self.store.remove(&previous);
            }
            let feature = Feature::new(FeatureId::from(self.store.len()), target)
                .with_name(candidate.display_name.clone());
            let id = self.store.append(feature);
            self.pending_new = Some(id.clone());
            self.refresh();
            self.markers.handle_for(&id).or(self.search_marker)
        } else {
            Some(self.place_search_marker(target, &candidate.display_name))
        };

        if let Some(handle) = shown {
            self.widget.open_popup(handle);
        }
        self.widget.fly_to(target, self.config.search_zoom);
    }

    fn place_search_marker(&mut self, at: LatLon, display_name: &str) -> MarkerHandle {
        let handle = self.widget.add_marker(&MarkerOptions {
            position: at,
            color: SEARCH_MARKER_COLOR.to_string(),
            draggable: self.config.admin,
            label: None,
        });
        self.widget.set_popup(handle, &search_popup_html(display_name));
        self.search_marker = Some(handle);
        handle
    }

    fn remove_search_marker(&mut self) {
        if let Some(handle) = self.search_marker.take() {
            self.widget.remove_marker(handle);
        }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn projected(&self) -> &[Feature] {
        &self.projected
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn form(&self) -> &FormFields {
        &self.form
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn search_marker(&self) -> Option<MarkerHandle> {
        self.search_marker
    }

    /// Filter drop-down values: `"All"` followed by the loaded categories.
    pub fn category_options(&self) -> Vec<String> {
        std::iter::once("All".to_string())
            .chain(self.store.categories())
            .collect()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

/// Timeline callbacks routed to the widget through the rendered markers.
struct WidgetFocus<'a, W: MapWidget> {
    markers: &'a MarkerSet,
    widget: &'a mut W,
}

impl<W: MapWidget> MarkerFocus for WidgetFocus<'_, W> {
    fn focus(&mut self, id: &FeatureId) {
        if let Some(handle) = self.markers.handle_for(id) {
            self.widget.open_popup(handle);
        }
    }

    fn emphasize(&mut self, id: &FeatureId, emphasized: bool) {
        if let Some(handle) = self.markers.handle_for(id) {
            let opacity = if emphasized {
                EMPHASIS_OPACITY
            } else {
                BASE_OPACITY
            };
            self.widget.set_opacity(handle, opacity);
        }
    }
}
