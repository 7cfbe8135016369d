// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use poi_map_core::bounds::BoundingBox;
use poi_map_core::marker::{MarkerOptions, RATING_LEGEND};
use poi_map_core::{
    Geocoder, LatLon, MapPage, MapWidget, MarkerHandle, NominatimGeocoder, NoticeLevel,
    PageConfig, PageKind, PageMessage,
};
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Page config file (JSON)
    #[arg(short, long, env = "POI_MAP_CONFIG")]
    config: Option<PathBuf>,

    /// Preset used when the config file does not exist
    #[arg(short, long, value_enum, default_value_t = Preset::Food)]
    preset: Preset,

    /// Feature source URL or path, overriding the config
    #[arg(short, long)]
    source: Option<String>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Food,
    FoodAdmin,
    Cities,
    Summits,
}

impl From<Preset> for PageKind {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Food => PageKind::Food,
            Preset::FoodAdmin => PageKind::FoodAdmin,
            Preset::Cities => PageKind::Cities,
            Preset::Summits => PageKind::Summits,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the visible features in timeline order
    List {
        #[arg(long, default_value = "All")]
        category: String,
        #[arg(long)]
        min_rating: Option<f64>,
    },
    /// List the feature categories
    Categories,
    /// Print the coordinates of a feature by name
    Coords { name: String },
    /// Look up a place and show it on the page
    Geocode { query: String },
    /// Print the rating color legend
    Legend,
    /// Write the effective page config to disk
    Init,
}

/// Map widget that reports marker actions to the log and the terminal.
struct ConsoleWidget {
    next_handle: u64,
}

impl ConsoleWidget {
    fn new(config: &PageConfig) -> Self {
        info!(
            "Map ready — tiles={} clustering={} center={:?} zoom={}",
            config.tile_provider_url, config.clustering_enabled, config.center, config.zoom
        );
        debug!("Attribution: {}", config.attribution);
        Self { next_handle: 0 }
    }
}

impl MapWidget for ConsoleWidget {
    fn add_marker(&mut self, options: &MarkerOptions) -> MarkerHandle {
        self.next_handle += 1;
        debug!(
            "Add marker — handle={} at={} color={} draggable={}",
            self.next_handle, options.position, options.color, options.draggable
        );
        MarkerHandle(self.next_handle)
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        debug!("Remove marker — handle={}", handle.0);
    }

    fn set_popup(&mut self, handle: MarkerHandle, html: &str) {
        debug!("Popup — handle={} html={}", handle.0, html);
    }

    fn set_opacity(&mut self, handle: MarkerHandle, opacity: f32) {
        debug!("Opacity — handle={} opacity={}", handle.0, opacity);
    }

    fn open_popup(&mut self, handle: MarkerHandle) {
        info!("Open popup — handle={}", handle.0);
    }

    fn fly_to(&mut self, center: LatLon, zoom: f64) {
        println!("Map centred on {} at zoom {}", center, zoom);
    }

    fn fit_bounds(&mut self, bounds: &BoundingBox) {
        let (lat, lon) = bounds.center();
        info!(
            "Fit bounds — lat=[{}, {}] lon=[{}, {}] center={:.4}, {:.4}",
            bounds.min_lat, bounds.max_lat, bounds.min_lon, bounds.max_lon, lat, lon
        );
    }

    fn set_label_scale(&mut self, scale: Option<f64>) {
        debug!("Label scale — {:?}", scale);
    }
}

/// Feeds `message` to the page, running each returned command on a worker
/// thread and posting its result back, until the page settles.
fn run(
    page: &mut MapPage<ConsoleWidget>,
    message: PageMessage,
    geocoder: &Arc<NominatimGeocoder>,
) -> Result<()> {
    let mut next = Some(message);
    while let Some(message) = next.take() {
        if let Some(command) = page.update(message) {
            let (tx, rx) = mpsc::channel();
            let geocoder = Arc::clone(geocoder);
            thread::spawn(move || {
                let geocoder: &dyn Geocoder = &*geocoder;
                let _ = tx.send(command.execute(geocoder));
            });
            next = Some(rx.recv().context("Worker thread exited without a result")?);
        }
    }

    for notice in page.take_notices() {
        match notice.level {
            NoticeLevel::Info => println!("{}", notice.message),
            NoticeLevel::Error => eprintln!("{}", notice.message),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("Failed to initialise logging")?;

    let config_path = cli.config.unwrap_or_else(PageConfig::default_path);
    let mut config = PageConfig::load(&config_path, cli.preset.into())
        .with_context(|| format!("Failed to load page config from {:?}", config_path))?;
    if let Some(source) = cli.source {
        config.feature_source = source;
    }

    match &cli.command {
        Commands::Legend => {
            for band in RATING_LEGEND {
                println!("{}  {}", band.color, band.label);
            }
            return Ok(());
        }
        Commands::Init => {
            config
                .save(&config_path)
                .with_context(|| format!("Failed to write {:?}", config_path))?;
            println!("Wrote {:?} page config to {:?}", config.kind, config_path);
            return Ok(());
        }
        _ => {}
    }

    let geocoder = Arc::new(
        NominatimGeocoder::new(config.geocoder_url.clone())
            .context("Failed to create geocoding client")?,
    );
    let widget = ConsoleWidget::new(&config);
    let mut page = MapPage::new(config, widget);

    run(&mut page, PageMessage::LoadRequested, &geocoder)?;

    match &cli.command {
        Commands::List {
            category,
            min_rating,
        } => {
            run(&mut page, PageMessage::CategoryChanged(category.clone()), &geocoder)?;
            if let Some(min_rating) = min_rating {
                run(&mut page, PageMessage::MinRatingChanged(*min_rating), &geocoder)?;
            }

            println!(
                "{} of {} features from {}",
                page.projected().len(),
                page.store().len(),
                page.config().feature_source
            );
            for (index, (item, feature)) in page
                .timeline()
                .items()
                .iter()
                .zip(page.projected())
                .enumerate()
            {
                let rating = feature
                    .rating
                    .map(|r| format!("⭐ {}", r))
                    .unwrap_or_default();
                println!(
                    "{:>3}  {:<10}  {:<32}  {:<12}  {:<6}  {}",
                    index,
                    item.date,
                    item.title,
                    feature.category.as_deref().unwrap_or("-"),
                    rating,
                    feature.coordinates
                );
            }
        }
        Commands::Categories => {
            for category in page.category_options() {
                println!("{}", category);
            }
        }
        Commands::Coords { name } => match page.store().coordinates_for(name) {
            Some(coordinates) => println!("{}", coordinates),
            None => println!("No feature found named '{}'", name),
        },
        Commands::Geocode { query } => {
            run(&mut page, PageMessage::GeocodeRequested(query.clone()), &geocoder)?;
            for (field, value) in page.form().iter() {
                println!("{} = {}", field, value);
            }
        }
        Commands::Legend | Commands::Init => {}
    }

    Ok(())
}
