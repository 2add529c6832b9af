//! [`MapSurface`] backed by galileo layers.

use std::sync::Arc;

use galileo::layer::vector_tile_layer::{VectorTileLayer, VectorTileLayerBuilder};
use galileo::layer::FeatureLayer;
use galileo::tile_schema::TileIndex;
use galileo::MapView;
use galileo_types::cartesian::Point2;
use galileo_types::geo::impls::GeoPoint2d;
use galileo_types::geo::{Crs, NewGeoPoint, Projection};
use galileo_types::geometry_type::CartesianSpace2d;
use galileo_types::impls::{ClosedContour, Polygon};
use parking_lot::RwLock;
use towermap::theme::{LabeledIconTechnique, Technique};
use towermap::{
    DataSource, DataSourceKind, FeatureCollection, FeatureGeometry, GeoPoint, GeometryKind,
    MapSurface, PickResult, RadialGradient, ScreenPoint, Theme, TowerMapError,
};

use crate::symbols::{CoverageArea, CoverageSymbol, TowerSite, TowerSymbol};

pub type CoverageLayer = FeatureLayer<Point2, CoverageArea, CoverageSymbol, CartesianSpace2d>;
pub type TowerLayer = FeatureLayer<Point2, TowerSite, TowerSymbol, CartesianSpace2d>;

/// Layer created for a registered data source, in registration order.
pub enum LayerSlot {
    Basemap(VectorTileLayer),
    Coverage(Arc<RwLock<CoverageLayer>>),
    Towers(Arc<RwLock<TowerLayer>>),
}

struct CoverageOverlay {
    source: Arc<FeatureCollection>,
    gradient: RadialGradient,
    layer: Arc<RwLock<CoverageLayer>>,
}

struct TowerOverlay {
    source: Arc<FeatureCollection>,
    technique: LabeledIconTechnique,
    layer: Arc<RwLock<TowerLayer>>,
}

/// Builds galileo layers for data sources and answers pick queries against them.
pub struct GalileoSurface {
    theme: Theme,
    selection_property: String,
    tolerance_px: f64,
    view: Option<MapView>,
    pending: Vec<LayerSlot>,
    coverage: Vec<CoverageOverlay>,
    towers: Vec<TowerOverlay>,
}

fn project(point: &GeoPoint) -> Option<Point2> {
    Crs::EPSG3857
        .get_projection::<GeoPoint2d, Point2>()?
        .project(&GeoPoint2d::latlon(point.lat, point.lon))
}

fn project_ring(ring: &[GeoPoint]) -> Option<ClosedContour<Point2>> {
    ring.iter()
        .map(project)
        .collect::<Option<Vec<_>>>()
        .map(ClosedContour::new)
}

impl GalileoSurface {
    pub fn new(theme: Theme, selection_property: String, tolerance_px: f64) -> Self {
        Self {
            theme,
            selection_property,
            tolerance_px,
            view: None,
            pending: vec![],
            coverage: vec![],
            towers: vec![],
        }
    }

    /// Layers created since the last call, to be added to the map.
    pub fn take_layers(&mut self) -> Vec<LayerSlot> {
        std::mem::take(&mut self.pending)
    }

    /// Updates the view used to convert screen positions for pick queries.
    pub fn set_view(&mut self, view: MapView) {
        self.view = Some(view);
    }

    fn rule(&self, source: &DataSource, kind: GeometryKind) -> Option<&Technique> {
        let style_set = source.style_set.as_deref()?;
        Some(&self.theme.resolve(style_set, kind)?.technique)
    }

    fn add_vector_tiles(&mut self, source: &DataSource) -> towermap::Result<()> {
        let Some(template) = source.url_template() else {
            return Ok(());
        };

        let layer = VectorTileLayerBuilder::new_rest(move |&index: &TileIndex| {
            template
                .replace("{z}", &index.z.to_string())
                .replace("{x}", &index.x.to_string())
                .replace("{y}", &index.y.to_string())
        })
        .with_file_cache_checked(".tile_cache")
        .build()
        .map_err(|err| TowerMapError::DataSource {
            name: source.name.clone(),
            reason: err.to_string(),
        })?;

        self.pending.push(LayerSlot::Basemap(layer));
        Ok(())
    }

    fn add_overlay(
        &mut self,
        source: &DataSource,
        collection: FeatureCollection,
    ) -> towermap::Result<()> {
        let missing_style = |kind: GeometryKind| TowerMapError::DataSource {
            name: source.name.clone(),
            reason: format!("theme has no style for {kind:?} features"),
        };
        let collection = Arc::new(collection);

        let has_polygons = collection.iter().any(|f| !f.geometry.is_point());
        let has_points = collection.iter().any(|f| f.geometry.is_point());

        let gradient = match self.rule(source, GeometryKind::Polygon) {
            Some(Technique::Shader(shader)) => Some(shader.gradient),
            Some(Technique::Fill(fill)) => Some(RadialGradient {
                center: fill.color,
                edge: fill.color,
            }),
            _ => None,
        };
        let technique = match self.rule(source, GeometryKind::Point) {
            Some(Technique::LabeledIcon(icon)) => Some(icon.clone()),
            _ => None,
        };

        if has_polygons {
            let gradient = gradient.ok_or_else(|| missing_style(GeometryKind::Polygon))?;
            let areas = collection
                .iter()
                .filter_map(|feature| match &feature.geometry {
                    FeatureGeometry::Polygon {
                        exterior,
                        interiors,
                    } => Some(CoverageArea {
                        id: feature.id,
                        name: feature.properties.name().map(str::to_string),
                        polygon: Polygon::new(
                            project_ring(exterior)?,
                            interiors.iter().filter_map(|r| project_ring(r)).collect(),
                        ),
                    }),
                    FeatureGeometry::Point(_) => None,
                })
                .collect();

            let layer = Arc::new(RwLock::new(FeatureLayer::new(
                areas,
                CoverageSymbol::new(gradient, None),
                Crs::EPSG3857,
            )));
            self.pending.push(LayerSlot::Coverage(layer.clone()));
            self.coverage.push(CoverageOverlay {
                source: collection.clone(),
                gradient,
                layer,
            });
        }

        if has_points {
            let technique = technique.ok_or_else(|| missing_style(GeometryKind::Point))?;
            let sites = collection
                .iter()
                .filter_map(|feature| match &feature.geometry {
                    FeatureGeometry::Point(point) => Some(TowerSite {
                        id: feature.id,
                        name: feature.properties.name().map(str::to_string),
                        label: feature
                            .properties
                            .get(&technique.text_property)
                            .map(|v| v.to_label())
                            .unwrap_or_default(),
                        position: project(point)?,
                    }),
                    FeatureGeometry::Polygon { .. } => None,
                })
                .collect();

            let layer = Arc::new(RwLock::new(FeatureLayer::new(
                sites,
                TowerSymbol::new(&technique, None),
                Crs::EPSG3857,
            )));
            self.pending.push(LayerSlot::Towers(layer.clone()));
            self.towers.push(TowerOverlay {
                source: collection,
                technique,
                layer,
            });
        }

        Ok(())
    }
}

impl MapSurface for GalileoSurface {
    fn add_data_source(&mut self, source: DataSource) -> towermap::Result<()> {
        match &source.kind {
            DataSourceKind::VectorTiles { .. } => self.add_vector_tiles(&source),
            DataSourceKind::GeoJson(collection) => {
                let collection = collection.clone();
                self.add_overlay(&source, collection)
            }
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        // The egui map widget follows its panel size on every frame.
        log::debug!("Map area resized to {width}x{height}");
    }

    fn intersect_map_objects(&self, position: ScreenPoint) -> Vec<PickResult> {
        let Some(view) = &self.view else {
            return vec![];
        };
        let Some(map_position) = view.screen_to_map(Point2::new(position.x, position.y)) else {
            return vec![];
        };
        let tolerance = view.resolution() * self.tolerance_px;

        // Towers are drawn on top of coverage areas.
        let towers = self.towers.iter().rev().flat_map(|overlay| {
            let ids: Vec<_> = overlay
                .layer
                .read()
                .get_features_at(&map_position, tolerance)
                .map(|(_, site)| site.id)
                .collect();
            ids.into_iter()
                .filter_map(|id| PickResult::for_feature(&overlay.source, id))
        });
        let coverage = self.coverage.iter().rev().flat_map(|overlay| {
            let ids: Vec<_> = overlay
                .layer
                .read()
                .get_features_at(&map_position, tolerance)
                .map(|(_, area)| area.id)
                .collect();
            ids.into_iter()
                .filter_map(|id| PickResult::for_feature(&overlay.source, id))
        });

        towers.chain(coverage).collect()
    }

    fn set_dynamic_property(&mut self, name: &str, values: Vec<String>) {
        if name != self.selection_property {
            log::debug!("Ignoring dynamic property '{name}'");
            return;
        }

        let selected = values.into_iter().next();
        for overlay in &self.coverage {
            overlay
                .layer
                .write()
                .set_symbol(CoverageSymbol::new(overlay.gradient, selected.clone()));
        }
        for overlay in &self.towers {
            overlay
                .layer
                .write()
                .set_symbol(TowerSymbol::new(&overlay.technique, selected.clone()));
        }
    }
}
