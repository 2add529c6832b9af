//! Towermap is the application layer of an interactive cell tower coverage map. It prepares
//! GeoJSON overlays, describes how the map should look and reacts to the user, while the actual
//! rendering is left to a map engine hidden behind the [`MapSurface`] trait.
//!
//! # Quick start
//!
//! ```no_run
//! use towermap::{AppConfig, TowerMapApp, MapSurface};
//!
//! # fn create_engine_surface() -> impl MapSurface { unimplemented!() }
//! let config = AppConfig::default().with_api_key_from_env();
//! let (app, report) = TowerMapApp::bootstrap(create_engine_surface(), config);
//! log::info!("{} sources registered, notice: {}", report.registered.len(), app.copyright_notice());
//! ```
//!
//! # Main components
//!
//! * [`FeatureCollection`] is a validated GeoJSON overlay. Polygon features get their
//!   [`GeoBox`] written into the `bbox` property before the overlay is handed to the engine.
//! * [`Theme`] is the declarative style of the map: a shader technique for coverage polygons
//!   and a labeled icon for towers.
//! * [`DataSource`] is what gets registered with the engine: the vector basemap or a GeoJSON
//!   overlay.
//! * [`ClickDetector`] and [`Selection`] turn raw pointer input into picks and a `selection`
//!   dynamic property on the engine.
//! * [`NavPanel`] is the state of the navigation side panel.
//!
//! [`TowerMapApp`] wires all of them to a [`MapSurface`].

mod app;
mod color;
pub mod config;
pub mod data_source;
pub mod dataset;
pub mod error;
pub mod geo_box;
pub mod nav;
pub mod pick;
pub mod properties;
pub mod surface;
pub mod theme;

pub use app::{BootstrapReport, FailedSource, TowerMapApp};
pub use color::Color;
pub use config::{AppConfig, BasemapConfig, OverlayConfig};
pub use data_source::{Attribution, DataSource, DataSourceDescriptor, DataSourceKind};
pub use dataset::{FeatureCollection, FeatureGeometry, FeatureId, MapFeature};
pub use error::{Result, TowerMapError};
pub use geo_box::{GeoBox, GeoPoint};
pub use nav::{NavPanel, NavState, NavStyle, ReturnState};
pub use pick::{canvas_position, ClickDetector, PointerInput, ScreenPoint, Selection, SelectionChange};
pub use properties::{FeatureProperties, PropertyValue};
pub use surface::{MapOptions, MapSurface, ObjectId, PickResult, UserData};
pub use theme::{GeometryKind, RadialGradient, Technique, Theme};
