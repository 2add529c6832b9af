//! GeoJSON overlays shown on top of the basemap.

use geojson::GeoJson;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TowerMapError};
use crate::geo_box::{GeoBox, GeoPoint};
use crate::properties::FeatureProperties;

/// Index of a feature in its collection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(pub usize);

/// Geometry of a displayed feature.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    /// Single point, e.g. a tower site.
    Point(GeoPoint),
    /// Polygon with its outer ring and holes.
    Polygon {
        /// Outer ring.
        exterior: Vec<GeoPoint>,
        /// Holes.
        interiors: Vec<Vec<GeoPoint>>,
    },
}

impl FeatureGeometry {
    fn from_geojson(feature: usize, geometry: Option<geojson::Geometry>) -> Result<Self> {
        let unsupported = |name: &str| TowerMapError::UnsupportedGeometry {
            feature,
            geometry: name.to_string(),
        };

        let Some(geometry) = geometry else {
            return Err(unsupported("none"));
        };

        match geometry.value {
            geojson::Value::Point(position) => {
                Ok(Self::Point(GeoPoint::from_position(&position)?))
            }
            geojson::Value::Polygon(rings) => {
                let mut rings = rings.iter().map(|ring| {
                    ring.iter()
                        .map(|p| GeoPoint::from_position(p))
                        .collect::<Result<Vec<_>>>()
                });
                let exterior = rings.next().transpose()?.unwrap_or_default();
                let interiors = rings.collect::<Result<Vec<_>>>()?;

                Ok(Self::Polygon {
                    exterior,
                    interiors,
                })
            }
            geojson::Value::MultiPoint(_) => Err(unsupported("MultiPoint")),
            geojson::Value::LineString(_) => Err(unsupported("LineString")),
            geojson::Value::MultiLineString(_) => Err(unsupported("MultiLineString")),
            geojson::Value::MultiPolygon(_) => Err(unsupported("MultiPolygon")),
            geojson::Value::GeometryCollection(_) => Err(unsupported("GeometryCollection")),
        }
    }

    fn to_geojson(&self) -> geojson::Geometry {
        let value = match self {
            FeatureGeometry::Point(p) => geojson::Value::Point(p.to_position()),
            FeatureGeometry::Polygon {
                exterior,
                interiors,
            } => geojson::Value::Polygon(
                std::iter::once(exterior)
                    .chain(interiors.iter())
                    .map(|ring| ring.iter().map(GeoPoint::to_position).collect())
                    .collect(),
            ),
        };

        geojson::Geometry::new(value)
    }

    /// Iterates over every vertex of the geometry.
    pub fn points(&self) -> Box<dyn Iterator<Item = &GeoPoint> + '_> {
        match self {
            FeatureGeometry::Point(p) => Box::new(std::iter::once(p)),
            FeatureGeometry::Polygon {
                exterior,
                interiors,
            } => Box::new(exterior.iter().chain(interiors.iter().flatten())),
        }
    }

    /// Returns true for point geometries.
    pub fn is_point(&self) -> bool {
        matches!(self, FeatureGeometry::Point(_))
    }
}

/// A feature of an overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFeature {
    /// Index of the feature in the source file.
    pub id: FeatureId,
    /// Geometry.
    pub geometry: FeatureGeometry,
    /// Validated properties.
    pub properties: FeatureProperties,
}

/// A named, validated GeoJSON overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    name: String,
    features: Vec<MapFeature>,
}

impl FeatureCollection {
    /// Creates a collection from already built features.
    pub fn new(name: impl Into<String>, features: Vec<MapFeature>) -> Self {
        Self {
            name: name.into(),
            features,
        }
    }

    /// Parses and validates a GeoJSON document. A feature collection, a single feature or a bare
    /// geometry are accepted.
    pub fn from_geojson_str(name: impl Into<String>, text: &str) -> Result<Self> {
        let geojson: GeoJson = text.parse()?;
        let features = match geojson {
            GeoJson::FeatureCollection(collection) => collection.features,
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::Geometry(geometry) => vec![geojson::Feature::from(geometry)],
        };

        let features = features
            .into_iter()
            .enumerate()
            .map(|(index, feature)| {
                Ok(MapFeature {
                    id: FeatureId(index),
                    geometry: FeatureGeometry::from_geojson(index, feature.geometry)?,
                    properties: FeatureProperties::from_json(
                        feature.properties.unwrap_or_default(),
                    )?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(name, features))
    }

    /// Reads and parses a GeoJSON file.
    pub fn load(name: impl Into<String>, path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_geojson_str(name, &text)
    }

    /// Writes the bounding box of the outer ring of every polygon into its `bbox` property.
    ///
    /// Polygons with an empty outer ring are left untouched. Returns the number of annotated
    /// features.
    pub fn annotate_bounding_boxes(&mut self) -> usize {
        let mut annotated = 0;
        for feature in &mut self.features {
            let FeatureGeometry::Polygon { exterior, .. } = &feature.geometry else {
                continue;
            };

            match GeoBox::from_feature_ring(feature.id.0, exterior) {
                Ok(geo_box) => {
                    feature.properties.set_bbox(geo_box);
                    annotated += 1;
                }
                Err(err) => log::warn!("Skipping bbox of '{}': {err}", self.name),
            }
        }

        annotated
    }

    /// Converts the collection back to GeoJSON.
    pub fn to_geojson(&self) -> geojson::FeatureCollection {
        geojson::FeatureCollection {
            bbox: None,
            features: self
                .features
                .iter()
                .map(|feature| geojson::Feature {
                    bbox: None,
                    geometry: Some(feature.geometry.to_geojson()),
                    id: None,
                    properties: Some(feature.properties.to_json()),
                    foreign_members: None,
                })
                .collect(),
            foreign_members: None,
        }
    }

    /// Box around every vertex of the collection.
    pub fn bounds(&self) -> Option<GeoBox> {
        let mut points = self.features.iter().flat_map(|f| f.geometry.points());
        let mut geo_box = GeoBox::from_point(points.next()?);
        for point in points {
            geo_box.grow_to_contain(point);
        }

        Some(geo_box)
    }

    /// Name of the collection, used as the data source name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Feature by its id.
    pub fn get(&self, id: FeatureId) -> Option<&MapFeature> {
        self.features.get(id.0)
    }

    /// Iterates over features.
    pub fn iter(&self) -> impl Iterator<Item = &MapFeature> + '_ {
        self.features.iter()
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns true if the collection has no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;

    use super::*;

    const COVERAGE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"name": "Otaniemi"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[24.81, 60.18], [24.84, 60.18], [24.84, 60.19], [24.81, 60.18]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"name": "Tapiola", "bbox": [0, 0, 0, 0]},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[24.79, 60.17, 12.0], [24.81, 60.17, 15.0], [24.80, 60.18, 9.0], [24.79, 60.17, 12.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"id": 3},
                "geometry": {"type": "Point", "coordinates": [24.8, 60.2]}
            }
        ]
    }"#;

    #[test]
    fn parse_and_annotate() {
        let mut collection =
            FeatureCollection::from_geojson_str("coverage", COVERAGE).expect("valid geojson");
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.annotate_bounding_boxes(), 2);

        let first = collection.get(FeatureId(0)).expect("exists");
        assert_eq!(
            first.properties.bbox(),
            Some(GeoBox::new(24.81, 60.18, 24.84, 60.19))
        );

        let second = collection.get(FeatureId(1)).expect("exists");
        let bbox = second.properties.bbox().expect("annotated");
        assert_relative_eq!(bbox.west, 24.79);
        assert_relative_eq!(bbox.north, 60.18);

        let point = collection.get(FeatureId(2)).expect("exists");
        assert!(point.geometry.is_point());
        assert_eq!(point.properties.bbox(), None);
    }

    #[test]
    fn empty_ring_is_skipped() {
        let text = r#"{"type": "Polygon", "coordinates": [[]]}"#;
        let mut collection = FeatureCollection::from_geojson_str("empty", text).expect("valid");

        assert_eq!(collection.annotate_bounding_boxes(), 0);
        assert_eq!(collection.get(FeatureId(0)).and_then(|f| f.properties.bbox()), None);
    }

    #[test]
    fn unsupported_geometry() {
        let text = r#"{"type": "Feature", "properties": {}, "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}}"#;
        assert_matches!(
            FeatureCollection::from_geojson_str("lines", text),
            Err(TowerMapError::UnsupportedGeometry { feature: 0, geometry }) if geometry == "LineString"
        );
    }

    #[test]
    fn malformed_document() {
        assert_matches!(
            FeatureCollection::from_geojson_str("broken", "{\"type\": \"FeatureCollection\""),
            Err(TowerMapError::GeoJson(_))
        );
    }

    #[test]
    fn round_trip_keeps_geometry() {
        let mut collection =
            FeatureCollection::from_geojson_str("coverage", COVERAGE).expect("valid geojson");
        collection.annotate_bounding_boxes();

        let text = serde_json::to_string(&collection.to_geojson()).expect("serializable");
        let parsed = FeatureCollection::from_geojson_str("coverage", &text).expect("valid");

        assert_eq!(parsed, collection);
        assert_eq!(
            collection.bounds(),
            Some(GeoBox::new(24.79, 60.17, 24.84, 60.2))
        );
    }
}
