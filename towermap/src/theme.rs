//! Declarative style of the map.
//!
//! A [`Theme`] maps style sets (named groups of rules referenced by data sources) to rendering
//! techniques. The JSON layout follows the one used by web map engines: camel case field names
//! and the technique name in the `technique` field of a rule.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{Result, TowerMapError};

const MAX_EXTENDS_DEPTH: usize = 8;

/// Name of the style set used by the GeoJSON overlays.
pub const GEOJSON_STYLE_SET: &str = "geojson";
/// Name of the icon image and texture used for tower points.
pub const TOWER_ICON: &str = "custom-icon";

const COVERAGE_VERTEX_SHADER: &str = r#"
varying vec2 vUv;
void main()
{
    vUv = uv;
    gl_Position = projectionMatrix * viewMatrix * modelMatrix * vec4( position, 1.0 );
}
"#;

const COVERAGE_FRAGMENT_SHADER: &str = r#"
varying vec2 vUv;
uniform vec2 u_resolution;
uniform vec2 u_mouse;
uniform float u_time;
void main() {
    vec2 u_c = vec2(0.5,0.5);
    float distanceFromLight = length(vUv - u_c);
    gl_FragColor = mix(vec4(1.0,0.0,0.0,1.0), vec4(0.429,1.0,0.0,.0), distanceFromLight*2.0);
}
"#;

/// Geometry type a rule applies to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryKind {
    /// Point features.
    Point,
    /// Polygon features.
    Polygon,
}

/// Complete theme.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Theme {
    /// Base theme. Local files are merged by [`Theme::load`], anything else is left for the engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    /// Style sets by name.
    pub styles: BTreeMap<String, Vec<StyleRule>>,
    /// Images available to techniques.
    pub images: BTreeMap<String, ImageDefinition>,
    /// Textures built from images.
    pub image_textures: Vec<ImageTexture>,
}

/// Rule of a style set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRule {
    /// Source layer the rule is restricted to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    /// Geometry type the rule applies to.
    pub when: GeometryKind,
    /// Higher values are drawn on top.
    #[serde(default)]
    pub render_order: u32,
    /// How features are drawn.
    #[serde(flatten)]
    pub technique: Technique,
}

/// Rendering technique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "technique", rename_all = "kebab-case")]
pub enum Technique {
    /// Custom shader program.
    Shader(ShaderTechnique),
    /// Icon with a text label.
    LabeledIcon(LabeledIconTechnique),
    /// Flat fill.
    Fill(FillTechnique),
}

/// Geometry primitive a shader is applied to.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Primitive {
    /// Triangulated polygon surface.
    #[default]
    Mesh,
    /// Polygon outlines.
    Line,
    /// Vertices only.
    Point,
}

/// How `uv` coordinates of a shaded primitive are computed.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextureCoordinateType {
    /// Relative to the feature bounding box: `(0, 0)` at south-west, `(1, 1)` at north-east.
    #[default]
    FeatureSpace,
    /// Relative to the tile.
    TileSpace,
}

/// GLSL sources of a shader technique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShaderParams {
    /// Vertex shader.
    pub vertex_shader: String,
    /// Fragment shader.
    pub fragment_shader: String,
}

/// Radial color ramp in feature space.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialGradient {
    /// Color at the feature center.
    pub center: Color,
    /// Color at distance 0.5 from the center (the middle of a bbox edge) and beyond.
    pub edge: Color,
}

impl RadialGradient {
    /// Color at the feature space position `(u, v)`.
    pub fn color_at(&self, u: f64, v: f64) -> Color {
        let distance = ((u - 0.5).powi(2) + (v - 0.5).powi(2)).sqrt();
        self.center.lerp(self.edge, distance * 2.0)
    }
}

/// Shader technique. The sources are passed to the engine verbatim and are never compiled here;
/// `gradient` is what the fragment shader paints, for engines that do not run GLSL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShaderTechnique {
    /// Primitive the shader is applied to.
    #[serde(default)]
    pub primitive: Primitive,
    /// Source of `uv` coordinates.
    #[serde(default)]
    pub texture_coordinate_type: TextureCoordinateType,
    /// Whether the output is alpha blended.
    #[serde(default)]
    pub transparent: bool,
    /// GLSL sources.
    pub params: ShaderParams,
    /// Color ramp produced by the shader. Defaults to the ramp of the coverage shader.
    #[serde(default = "coverage_gradient")]
    pub gradient: RadialGradient,
}

fn coverage_gradient() -> RadialGradient {
    RadialGradient {
        center: Color::RED,
        edge: Color::from_f32(0.429, 1.0, 0.0, 0.0),
    }
}

/// Icon with a label read from a feature property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledIconTechnique {
    /// Font size of the label.
    pub size: f32,
    /// Property holding the label text.
    pub text_property: String,
    /// Name of the texture of the icon.
    pub image_texture: String,
    /// Icon scale.
    #[serde(default = "one")]
    pub icon_scale: f32,
    /// Height of the icon on the screen in pixels.
    pub screen_height: f32,
    /// Scale factor applied with distance to the camera.
    #[serde(default = "one")]
    pub distance_scale: f32,
    /// Vertical offset of the icon in pixels.
    #[serde(default)]
    pub icon_y_offset: f32,
    /// Label color.
    pub color: Color,
}

/// Flat polygon fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillTechnique {
    /// Fill color.
    pub color: Color,
}

fn one() -> f32 {
    1.0
}

/// An image loaded by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDefinition {
    /// Where to load the image from.
    pub url: String,
    /// Load the image before the first frame.
    #[serde(default)]
    pub preload: bool,
}

/// Named texture built from an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageTexture {
    /// Name referenced by techniques.
    pub name: String,
    /// Key in [`Theme::images`].
    pub image: String,
}

impl Theme {
    /// The tower coverage theme: shaded coverage polygons and labeled tower icons on top of the
    /// given base theme.
    pub fn tower_default(extends: Option<String>) -> Self {
        let rules = vec![
            StyleRule {
                layer: Some(GEOJSON_STYLE_SET.to_string()),
                when: GeometryKind::Polygon,
                render_order: 10000,
                technique: Technique::Shader(ShaderTechnique {
                    primitive: Primitive::Mesh,
                    texture_coordinate_type: TextureCoordinateType::FeatureSpace,
                    transparent: true,
                    params: ShaderParams {
                        vertex_shader: COVERAGE_VERTEX_SHADER.to_string(),
                        fragment_shader: COVERAGE_FRAGMENT_SHADER.to_string(),
                    },
                    gradient: coverage_gradient(),
                }),
            },
            StyleRule {
                layer: None,
                when: GeometryKind::Point,
                render_order: 10001,
                technique: Technique::LabeledIcon(LabeledIconTechnique {
                    size: 16.0,
                    text_property: "id".to_string(),
                    image_texture: TOWER_ICON.to_string(),
                    icon_scale: 0.8,
                    screen_height: 32.0,
                    distance_scale: 1.0,
                    icon_y_offset: 25.0,
                    color: Color::WHITE,
                }),
            },
        ];

        Self {
            extends,
            styles: BTreeMap::from([(GEOJSON_STYLE_SET.to_string(), rules)]),
            images: BTreeMap::from([(
                TOWER_ICON.to_string(),
                ImageDefinition {
                    url: "./resources/icons/CellTower.svg".to_string(),
                    preload: true,
                },
            )]),
            image_textures: vec![ImageTexture {
                name: TOWER_ICON.to_string(),
                image: TOWER_ICON.to_string(),
            }],
        }
    }

    /// Parses a theme without resolving `extends`.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads a theme file and merges local base themes named by `extends`, relative to the file
    /// that references them.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_depth(path.as_ref(), 0)
    }

    fn load_with_depth(path: &Path, depth: usize) -> Result<Self> {
        if depth > MAX_EXTENDS_DEPTH {
            return Err(TowerMapError::Theme(format!(
                "theme extends chain is deeper than {MAX_EXTENDS_DEPTH} at {}",
                path.display()
            )));
        }

        let theme = Self::from_json_str(&std::fs::read_to_string(path)?)?;
        let Some(extends) = &theme.extends else {
            return Ok(theme);
        };

        if extends.starts_with("http://") || extends.starts_with("https://") {
            return Ok(theme);
        }

        let base_path = path.parent().unwrap_or(Path::new(".")).join(extends);
        if !base_path.is_file() {
            log::info!(
                "Base theme {} is not a local file, leaving it to the map engine",
                base_path.display()
            );
            return Ok(theme);
        }

        let base = Self::load_with_depth(&base_path, depth + 1)?;
        Ok(theme.merge_base(base))
    }

    /// Merges `base` under `self`: style sets, images and textures of `self` win over the ones
    /// with the same name in `base`. The result extends whatever `base` extends.
    pub fn merge_base(mut self, base: Theme) -> Theme {
        for (name, rules) in base.styles {
            self.styles.entry(name).or_insert(rules);
        }
        for (name, image) in base.images {
            self.images.entry(name).or_insert(image);
        }
        for texture in base.image_textures {
            if !self.image_textures.iter().any(|t| t.name == texture.name) {
                self.image_textures.push(texture);
            }
        }
        self.extends = base.extends;

        self
    }

    /// Checks that every texture and image reference resolves and shader sources are present.
    pub fn validate(&self) -> Result<()> {
        for texture in &self.image_textures {
            if !self.images.contains_key(&texture.image) {
                return Err(TowerMapError::Theme(format!(
                    "texture '{}' uses unknown image '{}'",
                    texture.name, texture.image
                )));
            }
        }

        for (set, rules) in &self.styles {
            for rule in rules {
                match &rule.technique {
                    Technique::LabeledIcon(icon) => {
                        if self.texture(&icon.image_texture).is_none() {
                            return Err(TowerMapError::Theme(format!(
                                "style set '{set}' uses unknown texture '{}'",
                                icon.image_texture
                            )));
                        }
                    }
                    Technique::Shader(shader) => {
                        if shader.params.vertex_shader.trim().is_empty()
                            || shader.params.fragment_shader.trim().is_empty()
                        {
                            return Err(TowerMapError::Theme(format!(
                                "style set '{set}' has a shader without sources"
                            )));
                        }
                    }
                    Technique::Fill(_) => {}
                }
            }
        }

        Ok(())
    }

    /// First rule of the style set that applies to the geometry kind.
    pub fn resolve(&self, style_set: &str, kind: GeometryKind) -> Option<&StyleRule> {
        self.styles.get(style_set)?.iter().find(|r| r.when == kind)
    }

    /// Texture by name.
    pub fn texture(&self, name: &str) -> Option<&ImageTexture> {
        self.image_textures.iter().find(|t| t.name == name)
    }

    /// Image of the texture with the given name.
    pub fn texture_image(&self, texture: &str) -> Option<&ImageDefinition> {
        self.images.get(&self.texture(texture)?.image)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("towermap-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    #[test]
    fn default_theme_is_valid() {
        let theme = Theme::tower_default(Some("base.json".into()));
        theme.validate().expect("default theme must be valid");

        let polygon = theme
            .resolve(GEOJSON_STYLE_SET, GeometryKind::Polygon)
            .expect("polygon rule");
        assert_eq!(polygon.render_order, 10000);
        assert_matches!(&polygon.technique, Technique::Shader(s) if s.transparent);

        let point = theme
            .resolve(GEOJSON_STYLE_SET, GeometryKind::Point)
            .expect("point rule");
        assert_matches!(&point.technique, Technique::LabeledIcon(i) if i.text_property == "id");
        assert_eq!(
            theme.texture_image(TOWER_ICON).map(|i| i.preload),
            Some(true)
        );
        assert!(theme.resolve("missing", GeometryKind::Point).is_none());
    }

    #[test]
    fn json_layout() {
        let theme = Theme::from_json_str(
            &json!({
                "styles": {
                    "geojson": [
                        {
                            "when": "Point",
                            "renderOrder": 3,
                            "technique": "labeled-icon",
                            "size": 12,
                            "textProperty": "name",
                            "imageTexture": "pin",
                            "screenHeight": 16,
                            "color": "#000000"
                        },
                        {"when": "Polygon", "technique": "fill", "color": "#00ff0080"}
                    ]
                },
                "images": {"pin": {"url": "pin.svg"}},
                "imageTextures": [{"name": "pin", "image": "pin"}]
            })
            .to_string(),
        )
        .expect("valid theme");

        theme.validate().expect("valid references");
        let rule = theme
            .resolve("geojson", GeometryKind::Point)
            .expect("point rule");
        let Technique::LabeledIcon(icon) = &rule.technique else {
            panic!("unexpected technique {:?}", rule.technique);
        };
        assert_eq!(icon.icon_scale, 1.0);
        assert_eq!(icon.icon_y_offset, 0.0);

        let text = serde_json::to_string(&theme).expect("serializable");
        assert_eq!(Theme::from_json_str(&text).expect("parsable"), theme);
    }

    #[test]
    fn broken_references() {
        let mut theme = Theme::tower_default(None);
        theme.image_textures.clear();
        assert_matches!(theme.validate(), Err(TowerMapError::Theme(_)));

        let mut theme = Theme::tower_default(None);
        theme.images.clear();
        assert_matches!(theme.validate(), Err(TowerMapError::Theme(_)));

        let mut theme = Theme::tower_default(None);
        for rule in theme.styles.values_mut().flatten() {
            if let Technique::Shader(shader) = &mut rule.technique {
                shader.params.fragment_shader = "  ".into();
            }
        }
        assert_matches!(theme.validate(), Err(TowerMapError::Theme(_)));
    }

    #[test]
    fn shader_rule_without_gradient() {
        let theme = Theme::from_json_str(
            &json!({
                "styles": {
                    "geojson": [{
                        "when": "Polygon",
                        "renderOrder": 10000,
                        "technique": "shader",
                        "primitive": "mesh",
                        "textureCoordinateType": "feature-space",
                        "transparent": true,
                        "params": {
                            "vertexShader": COVERAGE_VERTEX_SHADER,
                            "fragmentShader": COVERAGE_FRAGMENT_SHADER
                        }
                    }]
                }
            })
            .to_string(),
        )
        .expect("valid theme");

        let rule = theme
            .resolve(GEOJSON_STYLE_SET, GeometryKind::Polygon)
            .expect("polygon rule");
        let Technique::Shader(shader) = &rule.technique else {
            panic!("unexpected technique {:?}", rule.technique);
        };
        assert_eq!(shader.texture_coordinate_type, TextureCoordinateType::FeatureSpace);
        assert_eq!(shader.gradient, coverage_gradient());
        assert_eq!(shader.gradient.color_at(0.5, 0.5), Color::RED);
        theme.validate().expect("valid shader");
    }

    #[test]
    fn gradient_matches_shader_ramp() {
        let gradient = RadialGradient {
            center: Color::RED,
            edge: Color::rgba(0, 255, 0, 0),
        };

        assert_eq!(gradient.color_at(0.5, 0.5), Color::RED);
        assert_eq!(gradient.color_at(0.5, 1.0), Color::rgba(0, 255, 0, 0));
        assert_eq!(gradient.color_at(0.0, 0.0), Color::rgba(0, 255, 0, 0));
    }

    #[test]
    fn local_extends_are_merged() {
        let dir = temp_dir("extends");
        let base = json!({
            "extends": "https://example.com/streets.json",
            "styles": {
                "geojson": [{"when": "Polygon", "technique": "fill", "color": "#000000"}],
                "water": [{"when": "Polygon", "technique": "fill", "color": "#0000ff"}]
            },
            "images": {"custom-icon": {"url": "base.svg"}}
        });
        std::fs::write(dir.join("base.json"), base.to_string()).expect("write base");

        let mut own = Theme::tower_default(Some("base.json".into()));
        own.images.clear();
        std::fs::write(
            dir.join("theme.json"),
            serde_json::to_string(&own).expect("serializable"),
        )
        .expect("write theme");

        let theme = Theme::load(dir.join("theme.json")).expect("loadable");
        assert_eq!(
            theme.extends.as_deref(),
            Some("https://example.com/streets.json")
        );
        assert!(theme.styles.contains_key("water"));
        assert_eq!(theme.styles["geojson"].len(), 2);
        assert_eq!(theme.images["custom-icon"].url, "base.svg");
        theme.validate().expect("merged theme is valid");
    }

    #[test]
    fn extends_cycle_is_an_error() {
        let dir = temp_dir("cycle");
        std::fs::write(dir.join("a.json"), json!({"extends": "b.json"}).to_string())
            .expect("write a");
        std::fs::write(dir.join("b.json"), json!({"extends": "a.json"}).to_string())
            .expect("write b");

        assert_matches!(
            Theme::load(dir.join("a.json")),
            Err(TowerMapError::Theme(_))
        );
    }
}
