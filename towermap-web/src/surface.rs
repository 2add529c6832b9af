//! [`MapSurface`] over a map engine object living in JavaScript.
//!
//! The host page passes an object with the following methods:
//!
//! * `configure(options)`, where `options` is a serialized [`MapOptions`] with the theme, the
//!   camera target, zoom and tilt limit;
//! * `addDataSource(descriptor)`, where `descriptor` is a serialized [`DataSourceDescriptor`];
//! * `resize(width, height)`;
//! * `intersectMapObjects(x, y)`, returning an array of `{ dataSource, featureId, userData }`;
//! * `setDynamicProperty(name, values)`.
//!
//! [`DataSourceDescriptor`]: towermap::DataSourceDescriptor
//! [`MapOptions`]: towermap::MapOptions

use serde::Deserialize;
use serde_json::{Map, Value};
use towermap::{
    DataSource, FeatureId, FeatureProperties, MapOptions, MapSurface, ObjectId, PickResult,
    ScreenPoint, TowerMapError, UserData,
};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// Map engine object of the host page.
    #[derive(Debug, Clone)]
    pub type JsMap;

    #[wasm_bindgen(method, catch)]
    fn configure(this: &JsMap, options: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = addDataSource)]
    fn add_data_source(this: &JsMap, descriptor: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method)]
    fn resize(this: &JsMap, width: u32, height: u32);

    #[wasm_bindgen(method, js_name = intersectMapObjects)]
    fn intersect_map_objects(this: &JsMap, x: f64, y: f64) -> JsValue;

    #[wasm_bindgen(method, js_name = setDynamicProperty)]
    fn set_dynamic_property(this: &JsMap, name: &str, values: JsValue);
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsPickResult {
    data_source: String,
    feature_id: usize,
    #[serde(default)]
    user_data: Option<Map<String, Value>>,
}

impl JsPickResult {
    fn into_pick_result(self) -> PickResult {
        let user_data = self.user_data.and_then(|data| {
            FeatureProperties::from_json(data)
                .map_err(|err| {
                    log::warn!(
                        "Ignoring user data of feature {} of '{}': {err}",
                        self.feature_id,
                        self.data_source
                    )
                })
                .ok()
        });

        PickResult {
            object: ObjectId::new(self.data_source, FeatureId(self.feature_id)),
            user_data: user_data.map(UserData::from),
        }
    }
}

/// Map surface backed by a [`JsMap`].
#[derive(Debug, Clone)]
pub struct JsMapSurface {
    map: JsMap,
}

impl JsMapSurface {
    /// Wraps the engine object.
    pub fn new(map: JsMap) -> Self {
        Self { map }
    }

    /// Passes the theme and the initial camera to the engine. Must be called before any data
    /// source is added.
    pub fn configure(&self, options: &MapOptions) -> crate::Result<()> {
        let value = serde_wasm_bindgen::to_value(options)?;
        self.map.configure(value)?;
        log::info!(
            "Map configured at {:?}, zoom {}, max tilt {} deg",
            options.target,
            options.zoom_level,
            options.max_tilt_deg
        );

        Ok(())
    }
}

impl MapSurface for JsMapSurface {
    fn add_data_source(&mut self, source: DataSource) -> towermap::Result<()> {
        let name = source.name.clone();
        let data_source_error = |reason: String| TowerMapError::DataSource {
            name: name.clone(),
            reason,
        };

        let descriptor = serde_wasm_bindgen::to_value(&source.descriptor())
            .map_err(|err| data_source_error(err.to_string()))?;
        self.map
            .add_data_source(descriptor)
            .map_err(|err| data_source_error(format!("{err:?}")))
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.map.resize(width, height);
    }

    fn intersect_map_objects(&self, position: ScreenPoint) -> Vec<PickResult> {
        let value = self.map.intersect_map_objects(position.x, position.y);
        match serde_wasm_bindgen::from_value::<Vec<JsPickResult>>(value) {
            Ok(results) => results
                .into_iter()
                .map(JsPickResult::into_pick_result)
                .collect(),
            Err(err) => {
                log::error!("Failed to read intersection results: {err}");
                vec![]
            }
        }
    }

    fn set_dynamic_property(&mut self, name: &str, values: Vec<String>) {
        match serde_wasm_bindgen::to_value(&values) {
            Ok(values) => self.map.set_dynamic_property(name, values),
            Err(err) => log::error!("Failed to set dynamic property '{name}': {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn pick_result_with_user_data() {
        let result = JsPickResult {
            data_source: "towers".into(),
            feature_id: 3,
            user_data: Some(object(json!({"name": "Kilo", "id": 5}))),
        }
        .into_pick_result();

        assert_eq!(result.object, ObjectId::new("towers", FeatureId(3)));
        assert_eq!(result.name(), Some("Kilo"));
    }

    #[test]
    fn invalid_user_data_is_dropped() {
        let result = JsPickResult {
            data_source: "towers".into(),
            feature_id: 0,
            user_data: Some(object(json!({"visible": true}))),
        }
        .into_pick_result();

        assert_eq!(result.user_data, None);
    }
}
