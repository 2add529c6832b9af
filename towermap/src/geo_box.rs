//! Geographic points and axis-aligned geographic boxes.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TowerMapError};

/// Point in geographic coordinates (degrees).
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Longitude.
    pub lon: f64,
    /// Latitude.
    pub lat: f64,
    /// Altitude, if the source had one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<f64>,
}

impl GeoPoint {
    /// Creates a point without altitude.
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self {
            lon,
            lat,
            alt: None,
        }
    }

    /// Reads a GeoJSON position: `[lon, lat]` or `[lon, lat, alt]`. Extra coordinates are
    /// ignored.
    pub fn from_position(position: &[f64]) -> Result<Self> {
        match position {
            [lon, lat] => Ok(Self::new(*lon, *lat)),
            [lon, lat, alt, ..] => Ok(Self {
                lon: *lon,
                lat: *lat,
                alt: Some(*alt),
            }),
            _ => Err(TowerMapError::InvalidPosition(position.len())),
        }
    }

    /// Converts the point back to a GeoJSON position.
    pub fn to_position(&self) -> Vec<f64> {
        match self.alt {
            Some(alt) => vec![self.lon, self.lat, alt],
            None => vec![self.lon, self.lat],
        }
    }
}

/// Axis-aligned geographic rectangle.
///
/// All arithmetic is planar. A ring crossing the antimeridian or a pole gets a box spanning the
/// "wrong" side of the globe; callers that need wrapping boxes must split such rings first.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoBox {
    /// Minimum longitude.
    pub west: f64,
    /// Minimum latitude.
    pub south: f64,
    /// Maximum longitude.
    pub east: f64,
    /// Maximum latitude.
    pub north: f64,
}

impl GeoBox {
    /// Creates a new box from its extents.
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Zero-area box at the given point.
    pub fn from_point(point: &GeoPoint) -> Self {
        Self::new(point.lon, point.lat, point.lon, point.lat)
    }

    /// Smallest box containing every point of the ring.
    ///
    /// Returns [`TowerMapError::EmptyRing`] with the feature index `0` for an empty ring; callers
    /// that know the feature index should use [`GeoBox::from_feature_ring`].
    pub fn from_ring(ring: &[GeoPoint]) -> Result<Self> {
        Self::from_feature_ring(0, ring)
    }

    /// Same as [`GeoBox::from_ring`], but reports `feature` in the error.
    pub fn from_feature_ring(feature: usize, ring: &[GeoPoint]) -> Result<Self> {
        let (first, rest) = ring
            .split_first()
            .ok_or(TowerMapError::EmptyRing { feature })?;

        let mut geo_box = Self::from_point(first);
        for point in rest {
            geo_box.grow_to_contain(point);
        }

        Ok(geo_box)
    }

    /// Expands the box so that it contains the point.
    pub fn grow_to_contain(&mut self, point: &GeoPoint) {
        self.west = self.west.min(point.lon);
        self.east = self.east.max(point.lon);
        self.south = self.south.min(point.lat);
        self.north = self.north.max(point.lat);
    }

    /// Smallest box containing both boxes.
    pub fn merge(&self, other: &GeoBox) -> Self {
        Self::new(
            self.west.min(other.west),
            self.south.min(other.south),
            self.east.max(other.east),
            self.north.max(other.north),
        )
    }

    /// Returns true if the point is inside the box or on its border.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.west <= point.lon
            && point.lon <= self.east
            && self.south <= point.lat
            && point.lat <= self.north
    }

    /// Center of the box.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.west + self.east) / 2.0,
            (self.south + self.north) / 2.0,
        )
    }

    /// Longitude span in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Latitude span in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// `[west, south, east, north]`, the layout of the GeoJSON `bbox` member.
    pub fn to_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    /// Inverse of [`GeoBox::to_array`].
    pub fn from_array([west, south, east, north]: [f64; 4]) -> Self {
        Self::new(west, south, east, north)
    }

    /// Normalized position of the point inside the box: `(0, 0)` is the south-west corner,
    /// `(1, 1)` the north-east one. A degenerate axis maps to `0.5`.
    pub fn feature_space(&self, point: &GeoPoint) -> (f64, f64) {
        let u = if self.width() > 0.0 {
            (point.lon - self.west) / self.width()
        } else {
            0.5
        };
        let v = if self.height() > 0.0 {
            (point.lat - self.south) / self.height()
        } else {
            0.5
        };

        (u, v)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;

    use super::*;

    fn ring() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(24.77, 60.20),
            GeoPoint::new(24.79, 60.19),
            GeoPoint::new(24.80, 60.21),
            GeoPoint::new(24.76, 60.22),
            GeoPoint::new(24.77, 60.20),
        ]
    }

    #[test]
    fn box_contains_every_vertex() {
        let ring = ring();
        let geo_box = GeoBox::from_ring(&ring).expect("ring is not empty");

        for point in &ring {
            assert!(geo_box.contains(point), "{point:?} is outside {geo_box:?}");
        }

        assert_relative_eq!(geo_box.west, 24.76);
        assert_relative_eq!(geo_box.south, 60.19);
        assert_relative_eq!(geo_box.east, 24.80);
        assert_relative_eq!(geo_box.north, 60.22);
    }

    #[test]
    fn point_order_does_not_matter() {
        let ring = ring();
        let mut reversed = ring.clone();
        reversed.reverse();

        assert_eq!(
            GeoBox::from_ring(&ring).expect("not empty"),
            GeoBox::from_ring(&reversed).expect("not empty")
        );
    }

    #[test]
    fn repeated_point_is_degenerate() {
        let point = GeoPoint::new(-3.5, 40.25);
        let geo_box = GeoBox::from_ring(&[point; 4]).expect("not empty");

        assert_eq!(geo_box, GeoBox::from_point(&point));
        assert_relative_eq!(geo_box.width(), 0.0);
        assert_relative_eq!(geo_box.height(), 0.0);
        assert_eq!(geo_box.feature_space(&point), (0.5, 0.5));
    }

    #[test]
    fn empty_ring_is_an_error() {
        assert_matches!(
            GeoBox::from_feature_ring(7, &[]),
            Err(TowerMapError::EmptyRing { feature: 7 })
        );
    }

    #[test]
    fn antimeridian_ring_is_planar() {
        let ring = [GeoPoint::new(179.0, 10.0), GeoPoint::new(-179.0, 11.0)];
        let geo_box = GeoBox::from_ring(&ring).expect("not empty");

        assert_relative_eq!(geo_box.width(), 358.0);
    }

    #[test]
    fn position_parsing() {
        assert_eq!(
            GeoPoint::from_position(&[1.0, 2.0]).expect("valid"),
            GeoPoint::new(1.0, 2.0)
        );
        assert_eq!(
            GeoPoint::from_position(&[1.0, 2.0, 3.0])
                .expect("valid")
                .alt,
            Some(3.0)
        );
        assert_matches!(
            GeoPoint::from_position(&[1.0]),
            Err(TowerMapError::InvalidPosition(1))
        );
    }

    #[test]
    fn array_layout() {
        let geo_box = GeoBox::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(geo_box.to_array(), [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(GeoBox::from_array(geo_box.to_array()), geo_box);
        assert_relative_eq!(geo_box.center().lon, 2.0);
        assert_relative_eq!(geo_box.center().lat, 3.0);
    }
}
