//! Browser binding of the tower map.
//!
//! The host page creates its map engine and calls [`start`] with the canvas and the engine
//! object:
//!
//! ```js
//! import init, { start } from "./pkg/towermap_web.js";
//!
//! await init();
//! start("mapCanvas", mapEngine, JSON.stringify({ basemap: { api_key: KEY } }));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use towermap::{AppConfig, TowerMapApp};
use wasm_bindgen::prelude::*;

mod canvas;
mod dom;
mod error;
mod surface;

pub use canvas::CanvasRef;
pub use dom::{
    add_listener, bind_nav_panel, bind_pointer_events, bind_resize, show_copyright_notice,
};
pub use error::{Result, WebError};
pub use surface::{JsMap, JsMapSurface};

/// Starts the map application.
///
/// `canvas` is the id of the map canvas or the canvas element. `config` is an optional JSON
/// [`AppConfig`]; the defaults with the compiled in overlays are used when it is not given.
#[wasm_bindgen]
pub fn start(canvas: JsValue, map: JsMap, config: Option<String>) -> std::result::Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger is already initialized: {err}").into());
    }

    run(canvas, map, config).map_err(|err| {
        log::error!("Failed to start the map: {err}");
        err.into()
    })
}

fn run(canvas: JsValue, map: JsMap, config: Option<String>) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| WebError::Js("no global window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| WebError::Js("no document".into()))?;

    let config = match config {
        Some(text) => AppConfig::from_json_str(&text)?,
        None => AppConfig::default(),
    };
    let canvas = match CanvasRef::from_js(canvas)? {
        CanvasRef::Id(id) if id.is_empty() => CanvasRef::Id(config.canvas_id.clone()),
        canvas => canvas,
    }
    .resolve(&document)?;

    let surface = JsMapSurface::new(map);
    surface.configure(&config.map_options()?)?;

    let (app, report) = TowerMapApp::bootstrap(surface, config);
    for failed in &report.failed {
        log::warn!("Data source '{}' is not shown: {}", failed.name, failed.error);
    }
    show_copyright_notice(&document, &app.copyright_notice());

    let app = Rc::new(RefCell::new(app));
    bind_pointer_events(&canvas, &app)?;
    bind_resize(&window, &app)?;
    bind_nav_panel(&document, &app)?;

    Ok(())
}
