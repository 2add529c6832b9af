//! Boundary between the application and the map engine.

use serde::Serialize;

use crate::data_source::DataSource;
use crate::dataset::{FeatureCollection, FeatureId};
use crate::error::Result;
use crate::geo_box::GeoPoint;
use crate::pick::ScreenPoint;
use crate::properties::FeatureProperties;
use crate::theme::Theme;

/// A map engine drawing into a canvas.
///
/// Implementations own tiles, rendering and the intersection tests against rendered geometry.
pub trait MapSurface {
    /// Registers a data source. The engine loads and draws it in the background.
    fn add_data_source(&mut self, source: DataSource) -> Result<()>;
    /// Resizes the drawing buffer to the canvas size.
    fn resize(&mut self, width: u32, height: u32);
    /// Objects under the canvas position, topmost first.
    fn intersect_map_objects(&self, position: ScreenPoint) -> Vec<PickResult>;
    /// Sets a property that style expressions of the theme can read.
    fn set_dynamic_property(&mut self, name: &str, values: Vec<String>);
}

/// Everything an engine needs to construct itself.
///
/// Serializes with camel case field names for engines living outside of Rust.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    /// Id of the canvas element the map draws into.
    pub canvas_id: String,
    /// Initial camera target.
    pub target: GeoPoint,
    /// Initial zoom level.
    pub zoom_level: f64,
    /// Maximum camera tilt in degrees.
    pub max_tilt_deg: f64,
    /// Style of the map.
    pub theme: Theme,
}

/// Identity of a feature registered with the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectId {
    /// Name of the data source.
    pub source: String,
    /// Feature inside the source.
    pub feature: FeatureId,
}

impl ObjectId {
    /// Creates a new id.
    pub fn new(source: impl Into<String>, feature: FeatureId) -> Self {
        Self {
            source: source.into(),
            feature,
        }
    }
}

/// Data attached to a pickable feature.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserData {
    /// Display name.
    pub name: Option<String>,
    /// All properties of the feature.
    pub properties: FeatureProperties,
}

impl From<FeatureProperties> for UserData {
    fn from(properties: FeatureProperties) -> Self {
        Self {
            name: properties.name().map(str::to_string),
            properties,
        }
    }
}

/// An object found under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct PickResult {
    /// Picked object.
    pub object: ObjectId,
    /// Data of the object. Objects without data (e.g. basemap geometry) are not selectable.
    pub user_data: Option<UserData>,
}

impl PickResult {
    /// Result for a feature of an overlay, carrying its properties as user data.
    pub fn for_feature(collection: &FeatureCollection, id: FeatureId) -> Option<Self> {
        let feature = collection.get(id)?;
        Some(Self {
            object: ObjectId::new(collection.name(), id),
            user_data: Some(feature.properties.clone().into()),
        })
    }

    /// Name of the picked object.
    pub fn name(&self) -> Option<&str> {
        self.user_data.as_ref()?.name.as_deref()
    }
}
