#![allow(dead_code)]

use std::collections::HashMap;

use towermap::{
    DataSource, FeatureId, MapSurface, ObjectId, PickResult, Result, ScreenPoint, TowerMapError,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Surface that records every call and answers intersection queries with canned results.
#[derive(Default)]
pub struct RecordingSurface {
    pub sources: Vec<DataSource>,
    pub rejected: Vec<String>,
    pub sizes: Vec<(u32, u32)>,
    pub properties: Vec<(String, Vec<String>)>,
    pub queries: std::cell::RefCell<Vec<ScreenPoint>>,
    pub picks: HashMap<String, Vec<(String, FeatureId)>>,
}

impl RecordingSurface {
    pub fn rejecting(name: &str) -> Self {
        Self {
            rejected: vec![name.to_string()],
            ..Default::default()
        }
    }

    /// Makes the features of registered overlays pickable at the position.
    pub fn place(&mut self, position: ScreenPoint, objects: &[(&str, usize)]) {
        self.picks.insert(
            key(position),
            objects
                .iter()
                .map(|(source, feature)| (source.to_string(), FeatureId(*feature)))
                .collect(),
        );
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name.as_str()).collect()
    }
}

fn key(position: ScreenPoint) -> String {
    format!("{}:{}", position.x, position.y)
}

impl MapSurface for RecordingSurface {
    fn add_data_source(&mut self, source: DataSource) -> Result<()> {
        if self.rejected.contains(&source.name) {
            return Err(TowerMapError::DataSource {
                name: source.name,
                reason: "rejected by the test surface".to_string(),
            });
        }

        self.sources.push(source);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.sizes.push((width, height));
    }

    fn intersect_map_objects(&self, position: ScreenPoint) -> Vec<PickResult> {
        self.queries.borrow_mut().push(position);

        let Some(objects) = self.picks.get(&key(position)) else {
            return vec![];
        };

        objects
            .iter()
            .filter_map(|(source, feature)| {
                let source = self.sources.iter().find(|s| &s.name == source)?;
                match source.features() {
                    Some(collection) => PickResult::for_feature(collection, *feature),
                    None => Some(PickResult {
                        object: ObjectId::new(source.name.clone(), *feature),
                        user_data: None,
                    }),
                }
            })
            .collect()
    }

    fn set_dynamic_property(&mut self, name: &str, values: Vec<String>) {
        self.properties.push((name.to_string(), values));
    }
}
