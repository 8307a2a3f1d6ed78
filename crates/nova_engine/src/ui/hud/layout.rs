//! GUI skin loading
//!
//! Skins live in one XML file with a `GUIs` root and one `gui` element per
//! skin:
//!
//! ```xml
//! <GUIs>
//!   <gui name="minimal" gfx="minimal">
//!     <offset><x>-90</x><y>0</y></offset>
//!     <radar type="circle"><x>70</x><y>70</y><w>65</w></radar>
//!     <nav><x>35</x><y>220</y><w>135</w><h>40</h></nav>
//!     <health>
//!       <shield><x>16</x><y>285</y><w>98</w><h>8</h></shield>
//!       ...
//!     </health>
//!     ...
//!   </gui>
//! </GUIs>
//! ```
//!
//! Coordinates are authored relative to the frame sprite, measured down from
//! its top edge. Loading happens in two steps: [`GuiDescriptor::parse`] keeps
//! the authored numbers, [`GuiDescriptor::resolve`] turns them into screen
//! pixels once the frame size, screen size and font heights are known.

use std::path::{Path, PathBuf};

use bitflags::bitflags;
use thiserror::Error;

use crate::assets::{AssetError, AssetSource, ImageData};
use crate::config::HudConfig;
use crate::foundation::math::Vec2;
use crate::render::{Font, RenderBackend, RenderError, Texture};

/// Root element of the GUI file
pub const GUI_ROOT: &str = "GUIs";
/// Element holding one skin
pub const GUI_TAG: &str = "gui";

/// GUI loading errors
#[derive(Error, Debug)]
pub enum HudError {
    /// GUI file or skin graphic could not be read
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// XML syntax error
    #[error("{}: {source}", .path.display())]
    Xml {
        /// GUI file
        path: PathBuf,
        /// Parser error
        source: roxmltree::Error,
    },

    /// Root element is not `GUIs`
    #[error("malformed {}: missing root element 'GUIs', found '{found}'", .path.display())]
    MissingRoot {
        /// GUI file
        path: PathBuf,
        /// Root element name found instead
        found: String,
    },

    /// Root element has no children
    #[error("malformed {}: does not contain elements", .path.display())]
    Empty {
        /// GUI file
        path: PathBuf,
    },

    /// No skin with the requested name
    #[error("GUI '{0}' not found")]
    NotFound(String),

    /// Skin without a `gfx` attribute
    #[error("GUI '{0}' has no gfx property")]
    MissingGfx(String),

    /// Backend rejected a skin graphic
    #[error("GUI graphic {}: {source}", .path.display())]
    Texture {
        /// Graphic path
        path: PathBuf,
        /// Backend error
        source: RenderError,
    },
}

bitflags! {
    /// Rectangle fields a GUI section is expected to provide
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RectFields: u8 {
        /// `<x>`
        const X = 1 << 0;
        /// `<y>`
        const Y = 1 << 1;
        /// `<w>`
        const W = 1 << 2;
        /// `<h>`
        const H = 1 << 3;
        /// `<x>` and `<y>`
        const POSITION = Self::X.bits() | Self::Y.bits();
        /// All four
        const RECT = Self::POSITION.bits() | Self::W.bits() | Self::H.bits();
    }
}

/// Screen rectangle; `(x, y)` is the top-left corner, `y` growing upwards
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub w: f32,
    /// Height
    pub h: f32,
}

impl Rect {
    /// Create a rectangle
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Top-left corner
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Radar outline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RadarShape {
    /// Rectangle anchored at its top-left corner
    Rectangle {
        /// Width
        width: f32,
        /// Height
        height: f32,
    },
    /// Circle anchored at its centre
    Circle {
        /// Radius
        radius: f32,
    },
}

/// Radar placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarLayout {
    /// Anchor: top-left corner for rectangles, centre for circles
    pub position: Vec2,
    /// Outline
    pub shape: RadarShape,
}

impl Default for RadarLayout {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            shape: RadarShape::Rectangle { width: 0.0, height: 0.0 },
        }
    }
}

impl RadarLayout {
    /// Screen position of the player, where radar offsets are measured from
    pub fn center(&self) -> Vec2 {
        match self.shape {
            RadarShape::Rectangle { width, height } => {
                Vec2::new(self.position.x + width / 2.0, self.position.y - height / 2.0)
            }
            RadarShape::Circle { .. } => self.position,
        }
    }

    /// Largest offset from the centre a blip may reach on each axis
    pub fn half_extents(&self) -> Vec2 {
        match self.shape {
            RadarShape::Rectangle { width, height } => Vec2::new(width / 2.0, height / 2.0),
            RadarShape::Circle { radius } => Vec2::new(radius, radius),
        }
    }
}

/// Anchors inside the target panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetLayout {
    /// Bottom-left corner of the ship picture
    pub gfx: Vec2,
    /// Pilot name line
    pub name: Vec2,
    /// Faction line
    pub faction: Vec2,
    /// Health line
    pub health: Vec2,
}

impl Default for TargetLayout {
    fn default() -> Self {
        Self {
            gfx: Vec2::zeros(),
            name: Vec2::zeros(),
            faction: Vec2::zeros(),
            health: Vec2::zeros(),
        }
    }
}

/// Sizes needed to turn authored coordinates into screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    /// Screen size
    pub screen: Vec2,
    /// Frame sprite size
    pub frame: Vec2,
    /// Default font line height
    pub default_font_height: f32,
    /// Small font line height
    pub small_font_height: f32,
    /// Height of a ship's target-panel picture
    pub ship_target_height: f32,
}

/// Authored radar description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadarKind {
    /// `type="rectangle"`
    Rectangle,
    /// `type="circle"`
    Circle,
}

/// A skin exactly as written in the GUI file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GuiDescriptor {
    /// Skin name
    pub name: String,
    /// Base name of the skin graphics
    pub gfx: String,
    /// Playfield offset
    pub offset: Rect,
    /// Radar outline type
    pub radar_kind: Option<RadarKind>,
    /// Radar rectangle; a circle's radius is in `w`
    pub radar: Rect,
    /// Navigation box
    pub nav: Rect,
    /// Shield bar
    pub shield: Rect,
    /// Armour bar
    pub armour: Rect,
    /// Energy bar
    pub energy: Rect,
    /// Secondary weapon box
    pub weapon: Rect,
    /// Target ship picture
    pub target_gfx: Rect,
    /// Target name line
    pub target_name: Rect,
    /// Target faction line
    pub target_faction: Rect,
    /// Target health line
    pub target_health: Rect,
    /// Misc box holding the credits
    pub misc: Rect,
}

/// Skin geometry in screen pixels
#[derive(Debug, Clone, PartialEq)]
pub struct HudGeometry {
    /// Bottom-left corner of the frame sprite
    pub frame: Vec2,
    /// Playfield offset, not relative to the frame
    pub offset: Vec2,
    /// Radar
    pub radar: RadarLayout,
    /// Navigation box, already lowered by one text line
    pub nav: Rect,
    /// Shield bar
    pub shield: Rect,
    /// Armour bar
    pub armour: Rect,
    /// Energy bar
    pub energy: Rect,
    /// Secondary weapon box, already lowered by one text line
    pub weapon: Rect,
    /// Target panel anchors
    pub target: TargetLayout,
    /// Misc box
    pub misc: Rect,
}

impl GuiDescriptor {
    /// Find and parse the skin called `name` in GUI file text
    ///
    /// # Errors
    ///
    /// [`HudError::Xml`] for malformed XML, [`HudError::MissingRoot`] or
    /// [`HudError::Empty`] for a bad root, [`HudError::NotFound`] when no skin
    /// has that name and [`HudError::MissingGfx`] when it lacks `gfx`.
    pub fn parse(xml: &str, path: &Path, name: &str) -> Result<Self, HudError> {
        let doc = roxmltree::Document::parse(xml).map_err(|source| HudError::Xml {
            path: path.to_path_buf(),
            source,
        })?;

        let root = doc.root_element();
        if root.tag_name().name() != GUI_ROOT {
            return Err(HudError::MissingRoot {
                path: path.to_path_buf(),
                found: root.tag_name().name().to_string(),
            });
        }
        if !root.children().any(|child| child.is_element()) {
            return Err(HudError::Empty { path: path.to_path_buf() });
        }

        let Some(node) = root
            .children()
            .filter(|child| child.has_tag_name(GUI_TAG))
            .find(|child| child.attribute("name") == Some(name))
        else {
            log::warn!("GUI '{}' not found in '{}'", name, path.display());
            return Err(HudError::NotFound(name.to_string()));
        };

        Self::parse_gui(node, name)
    }

    fn parse_gui(node: roxmltree::Node<'_, '_>, name: &str) -> Result<Self, HudError> {
        let gfx = node.attribute("gfx").ok_or_else(|| HudError::MissingGfx(name.to_string()))?;
        let mut gui = Self {
            name: name.to_string(),
            gfx: gfx.to_string(),
            ..Self::default()
        };

        for section in node.children().filter(roxmltree::Node::is_element) {
            match section.tag_name().name() {
                "offset" => gui.offset = parse_rect(section, RectFields::POSITION),
                "radar" => {
                    let kind = match section.attribute("type") {
                        Some("rectangle") => RadarKind::Rectangle,
                        Some("circle") => RadarKind::Circle,
                        _ => {
                            log::warn!("Radar for GUI '{}' is missing 'type' tag or has invalid 'type' tag", name);
                            RadarKind::Rectangle
                        }
                    };
                    let fields = match kind {
                        RadarKind::Rectangle => RectFields::RECT,
                        RadarKind::Circle => RectFields::POSITION | RectFields::W,
                    };
                    gui.radar_kind = Some(kind);
                    gui.radar = parse_rect(section, fields);
                }
                "nav" => gui.nav = parse_rect(section, RectFields::RECT),
                "health" => {
                    for bar in section.children().filter(roxmltree::Node::is_element) {
                        match bar.tag_name().name() {
                            "shield" => gui.shield = parse_rect(bar, RectFields::RECT),
                            "armour" => gui.armour = parse_rect(bar, RectFields::RECT),
                            "energy" => gui.energy = parse_rect(bar, RectFields::RECT),
                            _ => {}
                        }
                    }
                }
                "weapon" => gui.weapon = parse_rect(section, RectFields::RECT),
                "target" => {
                    for part in section.children().filter(roxmltree::Node::is_element) {
                        match part.tag_name().name() {
                            "gfx" => gui.target_gfx = parse_rect(part, RectFields::POSITION),
                            "name" => gui.target_name = parse_rect(part, RectFields::POSITION),
                            "faction" => gui.target_faction = parse_rect(part, RectFields::POSITION),
                            "health" => gui.target_health = parse_rect(part, RectFields::POSITION),
                            _ => {}
                        }
                    }
                }
                "misc" => gui.misc = parse_rect(section, RectFields::RECT),
                _ => {}
            }
        }

        Ok(gui)
    }

    /// Convert authored coordinates to screen pixels.
    ///
    /// The frame sits in the top-right corner of the screen. Every section
    /// except `offset` is shifted by the frame origin and flipped about the
    /// frame's top edge.
    pub fn resolve(&self, metrics: &LayoutMetrics) -> HudGeometry {
        let frame = metrics.screen - metrics.frame;
        let relativize = |rect: &Rect| Rect {
            x: rect.x + frame.x,
            y: frame.y + metrics.frame.y - rect.y,
            ..*rect
        };
        let lowered = |rect: &Rect, by: f32| {
            let mut rect = relativize(rect);
            rect.y -= by;
            rect
        };

        let radar_anchor = relativize(&self.radar);
        let radar = RadarLayout {
            position: radar_anchor.position(),
            shape: match self.radar_kind.unwrap_or(RadarKind::Rectangle) {
                RadarKind::Rectangle => RadarShape::Rectangle {
                    width: self.radar.w,
                    height: self.radar.h,
                },
                RadarKind::Circle => RadarShape::Circle { radius: self.radar.w },
            },
        };

        HudGeometry {
            frame,
            offset: self.offset.position(),
            radar,
            nav: lowered(&self.nav, metrics.default_font_height),
            shield: relativize(&self.shield),
            armour: relativize(&self.armour),
            energy: relativize(&self.energy),
            weapon: lowered(&self.weapon, metrics.default_font_height),
            target: TargetLayout {
                gfx: lowered(&self.target_gfx, metrics.ship_target_height).position(),
                name: lowered(&self.target_name, metrics.default_font_height).position(),
                faction: lowered(&self.target_faction, metrics.small_font_height).position(),
                health: lowered(&self.target_health, metrics.small_font_height).position(),
            },
            misc: relativize(&self.misc),
        }
    }
}

/// Read `<x>`, `<y>`, `<w>`, `<h>` children of `parent`.
///
/// Requested fields that are missing and unrequested fields that are present
/// are both reported as warnings; missing fields read as zero.
fn parse_rect(parent: roxmltree::Node<'_, '_>, wanted: RectFields) -> Rect {
    let section = parent.tag_name().name();
    let mut rect = Rect::default();
    let mut found = RectFields::empty();

    for child in parent.children().filter(roxmltree::Node::is_element) {
        let (field, slot) = match child.tag_name().name() {
            "x" => (RectFields::X, &mut rect.x),
            "y" => (RectFields::Y, &mut rect.y),
            "w" => (RectFields::W, &mut rect.w),
            "h" => (RectFields::H, &mut rect.h),
            _ => continue,
        };
        let tag = child.tag_name().name();

        if !wanted.contains(field) {
            log::warn!("Extra parameter '{}' found for GUI node '{}'", tag, section);
            continue;
        }

        let text = child.text().unwrap_or("").trim();
        *slot = text.parse().unwrap_or_else(|_| {
            log::warn!("Invalid number '{}' for '{}' in GUI node '{}'", text, tag, section);
            0.0
        });
        found |= field;
    }

    for (field, tag) in [(RectFields::X, "x"), (RectFields::Y, "y"), (RectFields::W, "w"), (RectFields::H, "h")] {
        if wanted.contains(field) && !found.contains(field) {
            log::warn!("Missing parameter '{}' for GUI node '{}'", tag, section);
        }
    }

    rect
}

/// Frame and target-marker textures of a skin
#[derive(Debug, Clone, PartialEq)]
pub struct HudGraphics {
    /// Frame drawn over the HUD area
    pub frame: Texture,
    /// 2x2 corner sheet around the targeted pilot
    pub target_pilot: Texture,
    /// 2x2 corner sheet around the targeted planet
    pub target_planet: Texture,
}

impl HudGraphics {
    /// Load `<gfx>.png`, `<gfx>_pilot.png` and `<gfx>_planet.png` from `dir`
    ///
    /// # Errors
    ///
    /// Fails if an image cannot be read or decoded, or the backend rejects
    /// it. Textures already created are released first.
    pub fn load(
        source: &dyn AssetSource,
        backend: &mut dyn RenderBackend,
        dir: &Path,
        gfx: &str,
    ) -> Result<Self, HudError> {
        let frame = load_texture(source, backend, &dir.join(format!("{}.png", gfx)), 1, 1)?;

        let target_pilot = match load_texture(source, backend, &dir.join(format!("{}_pilot.png", gfx)), 2, 2) {
            Ok(texture) => texture,
            Err(e) => {
                backend.release_texture(frame.handle);
                return Err(e);
            }
        };

        let target_planet = match load_texture(source, backend, &dir.join(format!("{}_planet.png", gfx)), 2, 2) {
            Ok(texture) => texture,
            Err(e) => {
                backend.release_texture(frame.handle);
                backend.release_texture(target_pilot.handle);
                return Err(e);
            }
        };

        Ok(Self { frame, target_pilot, target_planet })
    }

    /// Free all three textures
    pub fn release(self, backend: &mut dyn RenderBackend) {
        backend.release_texture(self.frame.handle);
        backend.release_texture(self.target_pilot.handle);
        backend.release_texture(self.target_planet.handle);
    }
}

fn load_texture(
    source: &dyn AssetSource,
    backend: &mut dyn RenderBackend,
    path: &Path,
    columns: u32,
    rows: u32,
) -> Result<Texture, HudError> {
    let image = ImageData::from_source(source, path)?;
    backend
        .create_texture(&image, columns, rows)
        .map_err(|source| HudError::Texture { path: path.to_path_buf(), source })
}

/// A loaded skin: resolved geometry plus its graphics
#[derive(Debug, Clone, PartialEq)]
pub struct HudLayout {
    /// Skin name
    pub name: String,
    /// Screen-space geometry
    pub geometry: HudGeometry,
    /// Skin textures, owned by the layout
    pub graphics: HudGraphics,
}

impl HudLayout {
    /// Load the skin `name` from the configured GUI file
    ///
    /// # Errors
    ///
    /// Any [`HudError`] from reading the GUI file, selecting the skin or
    /// loading its graphics.
    pub fn load(
        source: &dyn AssetSource,
        backend: &mut dyn RenderBackend,
        config: &HudConfig,
        name: &str,
    ) -> Result<Self, HudError> {
        log::debug!("Loading GUI '{}' from {}", name, config.gui_data.display());
        let xml = source.read_to_string(&config.gui_data)?;
        let descriptor = GuiDescriptor::parse(&xml, &config.gui_data, name)?;

        let graphics = HudGraphics::load(source, backend, &config.gui_gfx_dir, &descriptor.gfx)?;
        let metrics = LayoutMetrics {
            screen: backend.screen_size(),
            frame: Vec2::new(graphics.frame.width, graphics.frame.height),
            default_font_height: backend.font_height(Font::Default),
            small_font_height: backend.font_height(Font::Small),
            ship_target_height: config.ship_target_size[1],
        };

        Ok(Self {
            name: descriptor.name.clone(),
            geometry: descriptor.resolve(&metrics),
            graphics,
        })
    }

    /// Free the skin textures
    pub fn release(self, backend: &mut dyn RenderBackend) {
        self.graphics.release(backend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::DirectorySource;
    use crate::render::HeadlessBackend;
    use approx::assert_relative_eq;
    use std::fs;
    use tempfile::tempdir;

    const GUI_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GUIs>
  <gui name="simple" gfx="simple">
    <offset><x>-90</x><y>0</y></offset>
    <radar type="rectangle"><x>10</x><y>10</y><w>130</w><h>120</h></radar>
    <nav><x>20</x><y>200</y><w>120</w><h>40</h></nav>
    <health>
      <shield><x>10</x><y>280</y><w>100</w><h>8</h></shield>
      <armour><x>10</x><y>295</y><w>100</w><h>8</h></armour>
      <energy><x>10</x><y>310</y><w>100</w><h>8</h></energy>
    </health>
    <weapon><x>20</x><y>330</y><w>120</w><h>40</h></weapon>
    <target>
      <gfx><x>10</x><y>380</y></gfx>
      <name><x>10</x><y>480</y></name>
      <faction><x>10</x><y>500</y></faction>
      <health><x>10</x><y>515</y></health>
    </target>
    <misc><x>10</x><y>540</y><w>130</w><h>40</h></misc>
  </gui>
  <gui name="round" gfx="round">
    <radar type="circle"><x>75</x><y>75</y><w>60</w><h>60</h></radar>
  </gui>
  <gui name="odd" gfx="odd">
    <radar type="hexagon"><x>5</x><y>5</y><w>40</w><h>30</h></radar>
  </gui>
</GUIs>
"#;

    fn metrics(screen: Vec2) -> LayoutMetrics {
        LayoutMetrics {
            screen,
            frame: Vec2::new(150.0, 600.0),
            default_font_height: 12.0,
            small_font_height: 10.0,
            ship_target_height: 96.0,
        }
    }

    #[test]
    fn test_relativization() {
        let mut gui = GuiDescriptor::default();
        gui.misc = Rect::new(10.0, 10.0, 5.0, 5.0);

        let geometry = gui.resolve(&metrics(Vec2::new(800.0, 600.0)));
        assert_eq!(geometry.frame, Vec2::new(650.0, 0.0));
        assert_eq!(geometry.misc, Rect::new(660.0, 590.0, 5.0, 5.0));

        let wide = gui.resolve(&metrics(Vec2::new(1024.0, 768.0)));
        assert_eq!(wide.frame, Vec2::new(874.0, 168.0));
        assert_eq!(wide.misc, Rect::new(884.0, 168.0 + 600.0 - 10.0, 5.0, 5.0));
    }

    #[test]
    fn test_text_nudges() {
        let gui = GuiDescriptor::parse(GUI_XML, Path::new("dat/gui.xml"), "simple").unwrap();
        let geometry = gui.resolve(&metrics(Vec2::new(800.0, 600.0)));

        assert_eq!(geometry.offset, Vec2::new(-90.0, 0.0));
        assert_eq!(geometry.nav, Rect::new(670.0, 600.0 - 200.0 - 12.0, 120.0, 40.0));
        assert_eq!(geometry.weapon.y, 600.0 - 330.0 - 12.0);
        assert_eq!(geometry.shield, Rect::new(660.0, 320.0, 100.0, 8.0));
        assert_eq!(geometry.target.gfx, Vec2::new(660.0, 600.0 - 380.0 - 96.0));
        assert_eq!(geometry.target.name, Vec2::new(660.0, 600.0 - 480.0 - 12.0));
        assert_eq!(geometry.target.faction, Vec2::new(660.0, 600.0 - 500.0 - 10.0));
        assert_eq!(geometry.target.health, Vec2::new(660.0, 600.0 - 515.0 - 10.0));
    }

    #[test]
    fn test_radar_shapes() {
        let screen = Vec2::new(800.0, 600.0);

        let rect = GuiDescriptor::parse(GUI_XML, Path::new("gui.xml"), "simple").unwrap().resolve(&metrics(screen));
        assert_eq!(rect.radar.shape, RadarShape::Rectangle { width: 130.0, height: 120.0 });
        assert_eq!(rect.radar.position, Vec2::new(660.0, 590.0));
        assert_eq!(rect.radar.center(), Vec2::new(725.0, 530.0));

        let round = GuiDescriptor::parse(GUI_XML, Path::new("gui.xml"), "round").unwrap().resolve(&metrics(screen));
        assert_eq!(round.radar.shape, RadarShape::Circle { radius: 60.0 });
        assert_eq!(round.radar.center(), Vec2::new(725.0, 525.0));
        assert_relative_eq!(round.radar.half_extents().x, 60.0);

        let odd = GuiDescriptor::parse(GUI_XML, Path::new("gui.xml"), "odd").unwrap();
        assert_eq!(odd.radar_kind, Some(RadarKind::Rectangle));
        assert_eq!(odd.radar, Rect::new(5.0, 5.0, 40.0, 30.0));
    }

    #[test]
    fn test_circle_radar_ignores_height() {
        let gui = GuiDescriptor::parse(GUI_XML, Path::new("gui.xml"), "round").unwrap();
        assert_eq!(gui.radar.h, 0.0);
    }

    #[test]
    fn test_missing_gui_and_bad_root() {
        assert!(matches!(
            GuiDescriptor::parse(GUI_XML, Path::new("gui.xml"), "fancy"),
            Err(HudError::NotFound(name)) if name == "fancy"
        ));
        assert!(matches!(
            GuiDescriptor::parse("<Ships><gui name=\"a\" gfx=\"a\"/></Ships>", Path::new("gui.xml"), "a"),
            Err(HudError::MissingRoot { .. })
        ));
        assert!(matches!(
            GuiDescriptor::parse("<GUIs></GUIs>", Path::new("gui.xml"), "a"),
            Err(HudError::Empty { .. })
        ));
        assert!(matches!(
            GuiDescriptor::parse("<GUIs><gui name=\"a\"/></GUIs>", Path::new("gui.xml"), "a"),
            Err(HudError::MissingGfx(_))
        ));
        assert!(matches!(
            GuiDescriptor::parse("<GUIs><gui>", Path::new("gui.xml"), "a"),
            Err(HudError::Xml { .. })
        ));
    }

    fn write_skin(root: &Path, gfx: &str) {
        fs::create_dir_all(root.join("dat")).unwrap();
        fs::create_dir_all(root.join("gfx/gui")).unwrap();
        fs::write(root.join("dat/gui.xml"), GUI_XML).unwrap();
        image::RgbaImage::new(150, 600).save(root.join(format!("gfx/gui/{}.png", gfx))).unwrap();
        image::RgbaImage::new(32, 32).save(root.join(format!("gfx/gui/{}_pilot.png", gfx))).unwrap();
        image::RgbaImage::new(64, 64).save(root.join(format!("gfx/gui/{}_planet.png", gfx))).unwrap();
    }

    #[test]
    fn test_load_uses_frame_size_and_fonts() {
        let root = tempdir().unwrap();
        write_skin(root.path(), "simple");

        let source = DirectorySource::new([root.path()]);
        let mut backend = HeadlessBackend::new(800.0, 600.0);
        let layout = HudLayout::load(&source, &mut backend, &HudConfig::default(), "simple").unwrap();

        assert_eq!(layout.geometry.frame, Vec2::new(650.0, 0.0));
        assert_eq!(layout.graphics.target_planet.sprite_width(), 32.0);
        assert_eq!(layout.geometry.nav.y, 600.0 - 200.0 - backend.font_height(Font::Default));
        assert_eq!(backend.texture_count(), 3);

        layout.release(&mut backend);
        assert_eq!(backend.texture_count(), 0);
    }

    #[test]
    fn test_nudges_follow_backend_fonts() {
        let root = tempdir().unwrap();
        write_skin(root.path(), "simple");

        let source = DirectorySource::new([root.path()]);
        let mut backend = HeadlessBackend::new(800.0, 600.0);
        backend.set_font_heights(20.0, 14.0);
        let layout = HudLayout::load(&source, &mut backend, &HudConfig::default(), "simple").unwrap();

        let geometry = &layout.geometry;
        assert_eq!(geometry.nav.y, 600.0 - 200.0 - 20.0);
        assert_eq!(geometry.weapon.y, 600.0 - 330.0 - 20.0);
        assert_eq!(geometry.target.name, Vec2::new(660.0, 600.0 - 480.0 - 20.0));
        assert_eq!(geometry.target.faction, Vec2::new(660.0, 600.0 - 500.0 - 14.0));
        assert_eq!(geometry.target.health, Vec2::new(660.0, 600.0 - 515.0 - 14.0));
    }

    #[test]
    fn test_missing_graphic_releases_loaded_ones() {
        let root = tempdir().unwrap();
        write_skin(root.path(), "simple");
        fs::remove_file(root.path().join("gfx/gui/simple_planet.png")).unwrap();

        let source = DirectorySource::new([root.path()]);
        let mut backend = HeadlessBackend::new(800.0, 600.0);
        let result = HudLayout::load(&source, &mut backend, &HudConfig::default(), "simple");

        assert!(matches!(result, Err(HudError::Asset(AssetError::NotFound(_)))));
        assert_eq!(backend.texture_count(), 0);
    }
}
