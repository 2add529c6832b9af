//! Tower coverage map viewer.
//!
//! Usage: `towermap-viewer [config.json]`. The basemap API key is read from `TOWERMAP_API_KEY`
//! when the configuration does not have one. Label fonts are loaded from `TOWERMAP_FONTS_DIR`,
//! the `fonts` folder of this crate and the system font folders, whichever exist.

use std::path::PathBuf;
use std::sync::Arc;

use galileo::control::{EventPropagation, MouseButton, UserEvent, UserEventHandler};
use galileo::render::text::text_service::TextService;
use galileo::render::text::RustybuzzRasterizer;
use galileo::{Map, MapBuilder};
use parking_lot::RwLock;
use towermap::{AppConfig, PointerInput, ScreenPoint, SelectionChange, TowerMapApp};

use crate::app::{SharedApp, ViewerApp};
use crate::surface::{GalileoSurface, LayerSlot};

mod app;
mod surface;
mod symbols;

const FONTS_DIR_ENV: &str = "TOWERMAP_FONTS_DIR";
const SYSTEM_FONT_DIRS: &[&str] = &[
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "C:\\Windows\\Fonts",
];

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    }
    .with_api_key_from_env();

    load_fonts();

    let options = config.map_options()?;
    let surface = GalileoSurface::new(
        options.theme,
        config.selection_property.clone(),
        config.pick_tolerance_px,
    );

    let (mut app, report) = TowerMapApp::bootstrap(surface, config);
    for failed in &report.failed {
        log::warn!("Data source '{}' is not shown: {}", failed.name, failed.error);
    }

    let mut builder = MapBuilder::default()
        .with_latlon(options.target.lat, options.target.lon)
        .with_z_level(options.zoom_level.round() as u32);
    for slot in app.surface_mut().take_layers() {
        builder = match slot {
            LayerSlot::Basemap(layer) => builder.with_layer(layer),
            LayerSlot::Coverage(layer) => builder.with_layer(layer),
            LayerSlot::Towers(layer) => builder.with_layer(layer),
        };
    }
    let map = builder.build();

    let app: SharedApp = Arc::new(RwLock::new(app));
    let handler = create_pick_handler(app.clone());

    galileo_egui::InitBuilder::new(map)
        .with_logging(false)
        .with_handlers([Box::new(handler) as Box<dyn UserEventHandler>])
        .with_app_builder(move |map_state| Box::new(ViewerApp::new(map_state, app)))
        .init()?;

    Ok(())
}

fn font_dirs() -> Vec<PathBuf> {
    std::env::var_os(FONTS_DIR_ENV)
        .map(PathBuf::from)
        .into_iter()
        .chain(std::iter::once(
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fonts"),
        ))
        .chain(SYSTEM_FONT_DIRS.iter().map(PathBuf::from))
        .filter(|dir| dir.is_dir())
        .collect()
}

fn load_fonts() {
    let text_service = TextService::initialize(RustybuzzRasterizer::default());

    let dirs = font_dirs();
    if dirs.is_empty() {
        log::warn!("No font folder found, tower labels will not be drawn. Set {FONTS_DIR_ENV}");
    }
    for dir in dirs {
        log::info!("Loading fonts from {}", dir.display());
        text_service.load_fonts(dir);
    }
}

fn create_pick_handler(app: SharedApp) -> impl UserEventHandler {
    move |ev: &UserEvent, map: &mut Map| {
        let input = match ev {
            UserEvent::ButtonPressed(MouseButton::Left, event) => PointerInput::MouseDown(
                ScreenPoint::new(event.screen_pointer_position.x, event.screen_pointer_position.y),
            ),
            UserEvent::ButtonReleased(MouseButton::Left, event) => PointerInput::MouseUp(
                ScreenPoint::new(event.screen_pointer_position.x, event.screen_pointer_position.y),
            ),
            _ => return EventPropagation::Propagate,
        };

        let mut app = app.write();
        app.surface_mut().set_view(map.view().clone());
        if let Some(SelectionChange::Selected { object, .. }) = app.handle_pointer(input) {
            log::info!("Selected feature {} of '{}'", object.feature.0, object.source);
            map.redraw();
        }

        EventPropagation::Propagate
    }
}
