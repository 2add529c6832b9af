//! Sources of map data registered with the engine.

use serde::{Deserialize, Serialize};

use crate::dataset::FeatureCollection;

/// Copyright notice of a data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    /// Text shown on the map.
    pub label: String,
    /// Link to the terms of the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Attribution {
    /// Creates an attribution without a link.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            link: None,
        }
    }

    /// Adds a link to the attribution.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// Where the data of a source comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSourceKind {
    /// Remote vector tiles in OMV format.
    VectorTiles {
        /// URL without the tile path.
        base_url: String,
        /// Key appended to every tile request.
        api_key: Option<String>,
    },
    /// GeoJSON overlay held in memory.
    GeoJson(FeatureCollection),
}

/// A data source with the style set used to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSource {
    /// Unique name.
    pub name: String,
    /// Style set of the theme. Vector tiles use the default style of the theme when `None`.
    pub style_set: Option<String>,
    /// Copyright notice.
    pub attribution: Option<Attribution>,
    /// Data.
    pub kind: DataSourceKind,
}

/// Name of the basemap source.
pub const BASEMAP_NAME: &str = "basemap";

impl DataSource {
    /// HERE vector tile basemap.
    pub fn vector_basemap(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            name: BASEMAP_NAME.to_string(),
            style_set: None,
            attribution: Some(Attribution::new("© HERE").with_link("https://legal.here.com/terms")),
            kind: DataSourceKind::VectorTiles {
                base_url: base_url.into(),
                api_key: api_key.filter(|key| !key.is_empty()),
            },
        }
    }

    /// GeoJSON overlay named after the collection.
    pub fn geojson(collection: FeatureCollection, style_set: impl Into<String>) -> Self {
        Self {
            name: collection.name().to_string(),
            style_set: Some(style_set.into()),
            attribution: None,
            kind: DataSourceKind::GeoJson(collection),
        }
    }

    /// URL of the tile. `None` for sources that are not tiled.
    pub fn tile_url(&self, z: u32, x: u32, y: u32) -> Option<String> {
        self.url_with_tile_path(&format!("{z}/{x}/{y}"))
    }

    /// URL template with `{z}`, `{x}` and `{y}` placeholders.
    pub fn url_template(&self) -> Option<String> {
        self.url_with_tile_path("{z}/{x}/{y}")
    }

    fn url_with_tile_path(&self, tile_path: &str) -> Option<String> {
        let DataSourceKind::VectorTiles { base_url, api_key } = &self.kind else {
            return None;
        };

        let base_url = base_url.trim_end_matches('/');
        Some(match api_key {
            Some(key) => format!("{base_url}/{tile_path}/omv?apikey={key}"),
            None => format!("{base_url}/{tile_path}/omv"),
        })
    }

    /// Features of a GeoJSON source.
    pub fn features(&self) -> Option<&FeatureCollection> {
        match &self.kind {
            DataSourceKind::GeoJson(collection) => Some(collection),
            DataSourceKind::VectorTiles { .. } => None,
        }
    }

    /// Serializable form of the source for engines outside of Rust.
    pub fn descriptor(&self) -> DataSourceDescriptor {
        let (kind, url_template, data) = match &self.kind {
            DataSourceKind::VectorTiles { .. } => ("vector-tiles", self.url_template(), None),
            DataSourceKind::GeoJson(collection) => ("geojson", None, Some(collection.to_geojson())),
        };

        DataSourceDescriptor {
            name: self.name.clone(),
            kind: kind.to_string(),
            style_set_name: self.style_set.clone(),
            attribution: self.attribution.clone(),
            url_template,
            data,
        }
    }
}

/// Plain data description of a [`DataSource`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceDescriptor {
    /// Source name.
    pub name: String,
    /// `vector-tiles` or `geojson`.
    pub kind: String,
    /// Style set of the theme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_set_name: Option<String>,
    /// Copyright notice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<Attribution>,
    /// Tile URL template of vector tile sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_template: Option<String>,
    /// Features of GeoJSON sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<geojson::FeatureCollection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_URL: &str = "https://vector.hereapi.com/v2/vectortiles/base/mc";

    #[test]
    fn tile_urls() {
        let with_key = DataSource::vector_basemap(BASE_URL, Some("secret".into()));
        assert_eq!(
            with_key.tile_url(12, 2331, 1185).as_deref(),
            Some("https://vector.hereapi.com/v2/vectortiles/base/mc/12/2331/1185/omv?apikey=secret")
        );

        let without_key = DataSource::vector_basemap(format!("{BASE_URL}/"), Some(String::new()));
        assert_eq!(
            without_key.tile_url(0, 0, 0).as_deref(),
            Some("https://vector.hereapi.com/v2/vectortiles/base/mc/0/0/0/omv")
        );
        assert_eq!(
            without_key.url_template().as_deref(),
            Some("https://vector.hereapi.com/v2/vectortiles/base/mc/{z}/{x}/{y}/omv")
        );
        assert_eq!(
            without_key.attribution.map(|a| a.label),
            Some("© HERE".to_string())
        );
    }

    #[test]
    fn geojson_source() {
        let collection = FeatureCollection::from_geojson_str(
            "towers",
            r#"{"type": "Point", "coordinates": [24.8, 60.2]}"#,
        )
        .expect("valid geojson");
        let source = DataSource::geojson(collection, "geojson");

        assert_eq!(source.name, "towers");
        assert_eq!(source.tile_url(1, 1, 1), None);
        assert_eq!(source.features().map(|f| f.len()), Some(1));

        let descriptor = serde_json::to_value(source.descriptor()).expect("serializable");
        assert_eq!(descriptor["kind"], "geojson");
        assert_eq!(descriptor["styleSetName"], "geojson");
        assert_eq!(descriptor["data"]["type"], "FeatureCollection");
        assert!(descriptor.get("urlTemplate").is_none());
    }
}
