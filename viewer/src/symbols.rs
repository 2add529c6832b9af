//! Galileo symbols drawing the tower map theme.

use galileo::layer::feature_layer::Feature;
use galileo::render::point_paint::PointPaint;
use galileo::render::render_bundle::RenderBundle;
use galileo::render::text::TextStyle;
use galileo::render::PolygonPaint;
use galileo::symbol::Symbol;
use galileo::Color;
use galileo_types::cartesian::{CartesianPoint3d, Point2, Point3, Vector2};
use galileo_types::geometry::Geom;
use galileo_types::impls::{ClosedContour, Polygon};
use towermap::theme::LabeledIconTechnique;
use towermap::{FeatureId, RadialGradient};

/// Number of nested polygons approximating the radial gradient of a coverage area.
const GRADIENT_BANDS: usize = 12;

const SELECTED_COLOR: Color = Color::rgba(255, 140, 0, 255);
const TOWER_COLOR: Color = Color::rgba(30, 60, 140, 255);

pub fn to_galileo_color(color: towermap::Color) -> Color {
    Color::rgba(color.r(), color.g(), color.b(), color.a())
}

/// Coverage polygon in map coordinates.
pub struct CoverageArea {
    pub id: FeatureId,
    pub name: Option<String>,
    pub polygon: Polygon<Point2>,
}

impl Feature for CoverageArea {
    type Geom = Polygon<Point2>;

    fn geometry(&self) -> &Self::Geom {
        &self.polygon
    }
}

/// Tower site in map coordinates.
pub struct TowerSite {
    pub id: FeatureId,
    pub name: Option<String>,
    pub label: String,
    pub position: Point2,
}

impl Feature for TowerSite {
    type Geom = Point2;

    fn geometry(&self) -> &Self::Geom {
        &self.position
    }
}

/// Draws a coverage polygon as nested copies shrunk toward the center of its bounding box, each
/// painted with the gradient color at its distance from the center.
pub struct CoverageSymbol {
    gradient: RadialGradient,
    selected: Option<String>,
}

impl CoverageSymbol {
    pub fn new(gradient: RadialGradient, selected: Option<String>) -> Self {
        Self { gradient, selected }
    }
}

impl Symbol<CoverageArea> for CoverageSymbol {
    fn render(
        &self,
        feature: &CoverageArea,
        geometry: &Geom<Point3>,
        min_resolution: f64,
        bundle: &mut RenderBundle,
    ) {
        let Geom::Polygon(polygon) = geometry else {
            return;
        };

        let points = &polygon.outer_contour.points;
        let Some(first) = points.first() else {
            return;
        };

        let (mut min_x, mut min_y) = (first.x(), first.y());
        let (mut max_x, mut max_y) = (min_x, min_y);
        for p in points {
            min_x = min_x.min(p.x());
            min_y = min_y.min(p.y());
            max_x = max_x.max(p.x());
            max_y = max_y.max(p.y());
        }
        let (center_x, center_y) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);

        for band in 0..GRADIENT_BANDS {
            let scale = 1.0 - band as f64 / GRADIENT_BANDS as f64;
            let color = self.gradient.color_at(0.5 + scale / 2.0, 0.5);

            let ring = points
                .iter()
                .map(|p| {
                    Point3::new(
                        center_x + (p.x() - center_x) * scale,
                        center_y + (p.y() - center_y) * scale,
                        p.z(),
                    )
                })
                .collect();

            bundle.add_polygon(
                &Polygon::new(ClosedContour::new(ring), vec![]),
                &PolygonPaint {
                    color: to_galileo_color(color),
                },
                min_resolution,
            );
        }

        if self.selected.is_some() && self.selected == feature.name {
            bundle.add_polygon(
                &Polygon::new(ClosedContour::new(points.clone()), vec![]),
                &PolygonPaint {
                    color: SELECTED_COLOR.with_alpha(60),
                },
                min_resolution,
            );
        }
    }
}

/// Draws towers as circles with a label. The selected tower is highlighted.
pub struct TowerSymbol {
    size: f32,
    label_style: TextStyle,
    selected: Option<String>,
}

impl TowerSymbol {
    pub fn new(technique: &LabeledIconTechnique, selected: Option<String>) -> Self {
        Self {
            size: technique.screen_height * technique.icon_scale,
            label_style: TextStyle {
                font_family: vec!["DejaVu Sans".to_string(), "Noto Sans".to_string()],
                font_size: technique.size,
                font_color: to_galileo_color(technique.color),
                horizontal_alignment: Default::default(),
                vertical_alignment: Default::default(),
                weight: Default::default(),
                style: Default::default(),
                outline_width: 1.0,
                outline_color: Color::BLACK,
            },
            selected,
        }
    }
}

impl Symbol<TowerSite> for TowerSymbol {
    fn render(
        &self,
        feature: &TowerSite,
        geometry: &Geom<Point3>,
        min_resolution: f64,
        bundle: &mut RenderBundle,
    ) {
        let Geom::Point(point) = geometry else {
            return;
        };

        let is_selected = self.selected.is_some() && self.selected == feature.name;
        let color = if is_selected { SELECTED_COLOR } else { TOWER_COLOR };

        bundle.add_point(point, &PointPaint::circle(color, self.size), min_resolution);
        bundle.add_label(
            point,
            &feature.label,
            &self.label_style,
            Vector2::new(0.0, 0.0),
            false,
        );
    }
}
