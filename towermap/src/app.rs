use crate::config::{AppConfig, OverlayConfig};
use crate::data_source::{Attribution, DataSource};
use crate::dataset::{FeatureCollection, MapFeature};
use crate::error::{Result, TowerMapError};
use crate::nav::NavPanel;
use crate::pick::{ClickDetector, PointerInput, Selection, SelectionChange};
use crate::surface::MapSurface;

/// A data source that could not be registered.
#[derive(Debug)]
pub struct FailedSource {
    /// Name of the source.
    pub name: String,
    /// Reason of the failure.
    pub error: TowerMapError,
}

/// What happened during [`TowerMapApp::bootstrap`].
#[derive(Debug, Default)]
pub struct BootstrapReport {
    /// Names of registered sources, in registration order.
    pub registered: Vec<String>,
    /// Sources that were skipped.
    pub failed: Vec<FailedSource>,
}

impl BootstrapReport {
    /// Returns true if every source was registered.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The tower map: data sources registered with a map engine, the selection and the nav panel.
pub struct TowerMapApp<S: MapSurface> {
    surface: S,
    config: AppConfig,
    detector: ClickDetector,
    selection: Selection,
    nav: NavPanel,
    attributions: Vec<Attribution>,
    overlays: Vec<FeatureCollection>,
}

impl<S: MapSurface> TowerMapApp<S> {
    /// Registers the basemap and the configured overlays with the surface.
    ///
    /// A source that cannot be loaded or is rejected by the surface is logged and reported, the
    /// rest of the sources are registered anyway.
    pub fn bootstrap(surface: S, config: AppConfig) -> (Self, BootstrapReport) {
        let mut app = Self {
            surface,
            detector: ClickDetector::new(config.max_click_move_px),
            selection: Selection::new(config.selection_property.clone()),
            nav: NavPanel::new(),
            attributions: vec![],
            overlays: vec![],
            config,
        };
        let mut report = BootstrapReport::default();

        if app.config.basemap.api_key.as_deref().map_or(true, str::is_empty) {
            log::warn!("No basemap API key configured, tile requests will likely be rejected");
        }
        let basemap = DataSource::vector_basemap(
            app.config.basemap.base_url.clone(),
            app.config.basemap.api_key.clone(),
        );
        app.register(basemap, &mut report);

        let overlays = app.config.overlays.clone();
        for overlay in &overlays {
            match load_overlay(overlay) {
                Ok(collection) => {
                    let source = DataSource::geojson(collection.clone(), &overlay.style_set);
                    if app.register(source, &mut report) {
                        app.overlays.push(collection);
                    }
                }
                Err(error) => {
                    log::warn!("Failed to load overlay '{}': {error}", overlay.name);
                    report.failed.push(FailedSource {
                        name: overlay.name.clone(),
                        error,
                    });
                }
            }
        }

        log::info!(
            "Map bootstrapped with {} sources, {} failed",
            report.registered.len(),
            report.failed.len()
        );

        (app, report)
    }

    fn register(&mut self, source: DataSource, report: &mut BootstrapReport) -> bool {
        let name = source.name.clone();
        let attribution = source.attribution.clone();

        match self.surface.add_data_source(source) {
            Ok(()) => {
                log::info!("Registered data source '{name}'");
                self.attributions.extend(attribution);
                report.registered.push(name);
                true
            }
            Err(error) => {
                log::warn!("Data source '{name}' was rejected: {error}");
                report.failed.push(FailedSource { name, error });
                false
            }
        }
    }

    /// Feeds a pointer event from the canvas. When the event completes a click, the objects
    /// under the pointer are picked and the selection is updated.
    pub fn handle_pointer(&mut self, input: PointerInput) -> Option<SelectionChange> {
        let position = self.detector.handle(input)?;
        let results = self.surface.intersect_map_objects(position);
        log::debug!("{} objects at {position:?}", results.len());

        Some(self.selection.apply(results, &mut self.surface))
    }

    /// Canvas was resized.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
    }

    /// Attributions of the registered sources, separated by ` | `.
    pub fn copyright_notice(&self) -> String {
        self.attributions
            .iter()
            .map(|a| a.label.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Selected feature of a registered overlay.
    pub fn selected_feature(&self) -> Option<&MapFeature> {
        let current = self.selection.current()?;
        self.overlays
            .iter()
            .find(|o| o.name() == current.source)?
            .get(current.feature)
    }

    /// Registered overlays with their annotated features.
    pub fn overlays(&self) -> &[FeatureCollection] {
        &self.overlays
    }

    /// Selection state.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Navigation panel.
    pub fn nav(&self) -> &NavPanel {
        &self.nav
    }

    /// Navigation panel.
    pub fn nav_mut(&mut self) -> &mut NavPanel {
        &mut self.nav
    }

    /// Configuration the app was started with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Map engine.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Map engine.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

fn load_overlay(overlay: &OverlayConfig) -> Result<FeatureCollection> {
    let text = overlay.read()?;
    let mut collection = FeatureCollection::from_geojson_str(&overlay.name, &text)?;
    let annotated = collection.annotate_bounding_boxes();
    log::info!(
        "Loaded overlay '{}': {} features, {annotated} with bounding boxes",
        overlay.name,
        collection.len()
    );

    Ok(collection)
}
