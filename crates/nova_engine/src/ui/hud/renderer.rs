//! Per-frame HUD drawing
//!
//! Draw order: planet target marker, pilot target marker, the player's ship,
//! frame, radar, navigation panel, health bars, secondary weapon, target
//! panel, credits, messages.

use std::time::Duration;

use crate::config::HudConfig;
use crate::foundation::math::Vec2;
use crate::render::{colors, Color, Font, RenderBackend, StateGuard, Texture};
use super::layout::{HudGeometry, HudGraphics, HudLayout, RadarShape, Rect};
use super::state::HudState;
use super::world::{PilotView, WorldQuery};

/// Offsets of the `+` marking the player at the radar centre
const PLAYER_GLYPH: [(f32, f32); 9] = [
    (0.0, 2.0),
    (0.0, 1.0),
    (0.0, 0.0),
    (0.0, -1.0),
    (0.0, -2.0),
    (2.0, 0.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (-2.0, 0.0),
];

/// Gap between a panel's top edge and its heading
const HEADING_GAP: f32 = 5.0;
/// Gap between a panel's top edge and its second line, above the font height
const SECOND_LINE_GAP: f32 = 10.0;
/// Horizontal padding inside the misc box
const MISC_PADDING: f32 = 10.0;
/// Message line spacing as a multiple of the font height
const MESSAGE_LINE_SPACING: f32 = 1.2;

/// Credits as shown in the misc box: `500`, `1.50K`, `2.50M`
pub fn format_credits(credits: u64) -> String {
    if credits >= 1_000_000 {
        format!("{:.2}M", credits as f64 / 1_000_000.0)
    } else if credits >= 1_000 {
        format!("{:.2}K", credits as f64 / 1_000.0)
    } else {
        credits.to_string()
    }
}

/// Whether a blip at `offset` from the radar centre, with half-size
/// `half_size`, is drawn.
///
/// Rectangles accept blips that overlap the edge by up to their own size.
/// Circles test the centre only and exclude the boundary itself.
pub fn in_radar_range(shape: &RadarShape, offset: Vec2, half_size: Vec2) -> bool {
    match *shape {
        RadarShape::Rectangle { width, height } => {
            offset.x.abs() <= width / 2.0 + half_size.x && offset.y.abs() <= height / 2.0 + half_size.y
        }
        RadarShape::Circle { radius } => offset.norm_squared() < radius * radius,
    }
}

/// Quad around a blip, clamped to the radar extents, in screen pixels
fn blip_quad(center: Vec2, extents: Vec2, offset: Vec2, half_size: Vec2) -> [Vec2; 4] {
    let left = (offset.x - half_size.x).max(-extents.x);
    let right = (offset.x + half_size.x).min(extents.x);
    let top = (offset.y + half_size.y).min(extents.y);
    let bottom = (offset.y - half_size.y).max(-extents.y);

    [
        center + Vec2::new(left, top),
        center + Vec2::new(right, top),
        center + Vec2::new(right, bottom),
        center + Vec2::new(left, bottom),
    ]
}

/// Fraction of a maximum, 0 when the maximum is not positive
fn fraction(current: f32, max: f32) -> f32 {
    if max > 0.0 {
        (current / max).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Draws one skin from live state
pub struct HudRenderer<'a> {
    geometry: &'a HudGeometry,
    graphics: &'a HudGraphics,
    config: &'a HudConfig,
}

impl<'a> HudRenderer<'a> {
    /// Create a renderer for a loaded skin
    pub fn new(layout: &'a HudLayout, config: &'a HudConfig) -> Self {
        Self {
            geometry: &layout.geometry,
            graphics: &layout.graphics,
            config,
        }
    }

    /// Draw a whole frame
    pub fn render(
        &self,
        state: &mut HudState,
        world: &dyn WorldQuery,
        backend: &mut dyn RenderBackend,
        now: Duration,
    ) {
        self.render_background(state, world, backend);
        self.render_overlay(state, world, backend, now);
    }

    /// Draw the planet target marker, below ships
    pub fn render_background(&self, state: &mut HudState, world: &dyn WorldQuery, backend: &mut dyn RenderBackend) {
        let Some(index) = state.planet_target() else {
            return;
        };
        let Some(planet) = world.planets().get(index) else {
            log::debug!("Planet target {} no longer exists", index);
            state.set_planet_target(None);
            return;
        };

        let color = if world.are_enemies(world.player().faction, planet.faction) {
            colors::HOSTILE
        } else {
            colors::NEUTRAL
        };
        blit_corners(backend, &self.graphics.target_planet, planet.position, planet.sprite_size, color);
    }

    /// Draw the pilot target marker, the player and every HUD element
    pub fn render_overlay(
        &self,
        state: &mut HudState,
        world: &dyn WorldQuery,
        backend: &mut dyn RenderBackend,
        now: Duration,
    ) {
        // Forget a target that has left the system or died
        let target = state.pilot_target().and_then(|id| world.pilot(id));
        if target.is_none() && state.pilot_target().is_some() {
            state.set_pilot_target(None);
        }

        if let Some(pilot) = target {
            let color = pilot_color(pilot);
            let size = pilot.sprite_size * self.config.pilot_marker_scale;
            blit_corners(backend, &self.graphics.target_pilot, pilot.position, size, color);
        }
        world.render_player(backend);

        let mut hud = StateGuard::new(backend);
        hud.blit_static(&self.graphics.frame, self.geometry.frame, None);

        self.render_radar(&mut *hud, state, world, target);
        self.render_nav(&mut *hud, state, world);
        self.render_health(&mut *hud, world.player());
        self.render_weapon(&mut *hud, world.player());
        self.render_target(&mut *hud, target);
        self.render_credits(&mut *hud, world.credits());
        self.render_messages(&mut *hud, state, now);
    }

    fn render_radar(
        &self,
        backend: &mut dyn RenderBackend,
        state: &HudState,
        world: &dyn WorldQuery,
        target: Option<&PilotView>,
    ) {
        let radar = &self.geometry.radar;
        let center = radar.center();
        let extents = radar.half_extents();
        let resolution = state.radar_resolution();
        let player = world.player().position;
        let blip_size = |sprite: Vec2, scale: f32| {
            let size = sprite * (scale / 2.0) / resolution;
            Vec2::new(size.x.max(1.0), size.y.max(1.0))
        };

        for planet in world.planets() {
            let offset = (planet.position - player) / resolution;
            let size = blip_size(planet.sprite_size, 1.0);
            if in_radar_range(&radar.shape, offset, size) {
                backend.fill_quad(blip_quad(center, extents, offset, size), colors::FRIEND);
            }
        }

        let projectiles: Vec<Vec2> = world
            .projectiles()
            .iter()
            .map(|position| (position - player) / resolution)
            .filter(|offset| in_radar_range(&radar.shape, *offset, Vec2::zeros()))
            .map(|offset| center + offset)
            .collect();
        if !projectiles.is_empty() {
            backend.draw_points(&projectiles, colors::RADAR_WEAPON);
        }

        let mut draw_pilot = |pilot: &PilotView, color: Color| {
            let offset = (pilot.position - player) / resolution;
            let size = blip_size(pilot.sprite_size, self.config.pilot_marker_scale);
            if in_radar_range(&radar.shape, offset, size) {
                backend.fill_quad(blip_quad(center, extents, offset, size), color);
            }
        };
        for pilot in world.pilots() {
            if Some(pilot.id) != target.map(|t| t.id) {
                draw_pilot(pilot, pilot_color(pilot));
            }
        }
        if let Some(pilot) = target {
            draw_pilot(pilot, colors::RADAR_TARGET);
        }

        let glyph: Vec<Vec2> = PLAYER_GLYPH.iter().map(|&(x, y)| center + Vec2::new(x, y)).collect();
        backend.draw_points(&glyph, colors::RADAR_PLAYER);
    }

    fn render_nav(&self, backend: &mut dyn RenderBackend, state: &mut HudState, world: &dyn WorldQuery) {
        let nav = &self.geometry.nav;
        let heading_at = Vec2::new(nav.x, nav.y - HEADING_GAP);
        let detail_at = Vec2::new(nav.x, nav.y - SECOND_LINE_GAP - backend.font_height(Font::Small));

        if let Some(index) = state.planet_target() {
            if let Some(planet) = world.planets().get(index) {
                backend.print_mid(Font::Default, nav.w, heading_at, Some(colors::CONSOLE), "Land");
                backend.print_mid(Font::Small, nav.w, detail_at, None, &planet.name);
                return;
            }
            state.set_planet_target(None);
        }

        if let Some(index) = state.hyperspace_target() {
            if let Some(jump) = world.jumps().get(index) {
                let color = world.can_hyperspace().then_some(colors::CONSOLE);
                backend.print_mid(Font::Default, nav.w, heading_at, color, "Hyperspace");
                backend.print_mid(Font::Small, nav.w, detail_at, None, &jump.name);
                return;
            }
            log::debug!("Hyperspace target {} no longer exists", index);
            state.set_hyperspace_target(None);
        }

        backend.print_mid(Font::Default, nav.w, heading_at, Some(colors::CONSOLE), "Navigation");
        backend.print_mid(Font::Small, nav.w, detail_at, Some(colors::GREY), "Off");
    }

    fn render_health(&self, backend: &mut dyn RenderBackend, player: &PilotView) {
        render_bar(backend, &self.geometry.shield, fraction(player.shield, player.shield_max), colors::SHIELD);
        render_bar(backend, &self.geometry.armour, fraction(player.armour, player.armour_max), colors::ARMOUR);
        render_bar(backend, &self.geometry.energy, fraction(player.energy, player.energy_max), colors::ENERGY);
    }

    fn render_weapon(&self, backend: &mut dyn RenderBackend, player: &PilotView) {
        let weapon = &self.geometry.weapon;
        let default_height = backend.font_height(Font::Default);
        let second_line = Vec2::new(weapon.x, weapon.y - SECOND_LINE_GAP - default_height);

        let Some(secondary) = &player.secondary else {
            backend.print_mid(
                Font::Default,
                weapon.w,
                Vec2::new(weapon.x, weapon.y - HEADING_GAP),
                Some(colors::CONSOLE),
                "Secondary",
            );
            backend.print_mid(Font::Small, weapon.w, second_line, Some(colors::GREY), "None");
            return;
        };

        let fitting_font = |backend: &dyn RenderBackend, text: &str| {
            if backend.text_width(Font::Default, text) > weapon.w {
                Font::Small
            } else {
                Font::Default
            }
        };

        match &secondary.ammo {
            None => {
                let font = fitting_font(&*backend, &secondary.name);
                let y = weapon.y - (weapon.h - backend.font_height(font)) / 2.0;
                backend.print_mid(font, weapon.w, Vec2::new(weapon.x, y), Some(colors::CONSOLE), &secondary.name);
            }
            Some(ammo) => {
                let font = fitting_font(&*backend, &ammo.name);
                backend.print_mid(
                    font,
                    weapon.w,
                    Vec2::new(weapon.x, weapon.y - HEADING_GAP),
                    Some(colors::CONSOLE),
                    &ammo.name,
                );
                backend.print_mid(Font::Small, weapon.w, second_line, None, &ammo.quantity.to_string());
            }
        }
    }

    fn render_target(&self, backend: &mut dyn RenderBackend, target: Option<&PilotView>) {
        let layout = &self.geometry.target;

        let Some(pilot) = target else {
            let [width, height] = self.config.ship_target_size;
            let y = layout.gfx.y + (height - backend.font_height(Font::Default)) / 2.0;
            backend.print_mid(Font::Default, width, Vec2::new(layout.gfx.x, y), Some(colors::GREY), "No Target");
            return;
        };

        if let Some(picture) = &pilot.target_graphic {
            backend.blit_static(picture, layout.gfx, None);
        }
        backend.print(Font::Default, layout.name, None, &pilot.name);
        backend.print(Font::Small, layout.faction, None, &pilot.faction_name);

        let status = if pilot.is_disabled() {
            "Disabled".to_string()
        } else if pilot.shield > pilot.shield_max / 100.0 {
            format!("Shield: {:.0}%", fraction(pilot.shield, pilot.shield_max) * 100.0)
        } else {
            format!("Armour: {:.0}%", fraction(pilot.armour, pilot.armour_max) * 100.0)
        };
        backend.print(Font::Small, layout.health, None, &status);
    }

    fn render_credits(&self, backend: &mut dyn RenderBackend, credits: u64) {
        let misc = &self.geometry.misc;
        let y = misc.y - MISC_PADDING - backend.font_height(Font::Default);
        backend.print(Font::Default, Vec2::new(misc.x + MISC_PADDING, y), Some(colors::CONSOLE), "Credits:");

        let amount = format_credits(credits);
        let width = backend.text_width(Font::Small, &amount);
        backend.print(Font::Small, Vec2::new(misc.x + misc.w - MISC_PADDING - width, y), None, &amount);
    }

    fn render_messages(&self, backend: &mut dyn RenderBackend, state: &mut HudState, now: Duration) {
        let messages = state.messages_mut();
        messages.expire(now);

        let [x, y] = self.config.message_anchor;
        let line_height = backend.font_height(Font::Default) * MESSAGE_LINE_SPACING;
        let capacity = messages.capacity();

        for (slot, message) in messages.iter().enumerate() {
            if message.is_blank() {
                continue;
            }
            let row = (capacity - 1 - slot) as f32;
            backend.print(Font::Default, Vec2::new(x, y + line_height * row), None, message.text());
        }
    }
}

/// Radar and marker colour of a pilot that is not the current target
fn pilot_color(pilot: &PilotView) -> Color {
    if pilot.is_disabled() {
        colors::INERT
    } else if pilot.is_hostile() {
        colors::HOSTILE
    } else {
        colors::NEUTRAL
    }
}

/// Four corner sprites around a box centred on `position`
fn blit_corners(backend: &mut dyn RenderBackend, sheet: &Texture, position: Vec2, size: Vec2, color: Color) {
    let mut corner = Vec2::new(position.x - size.x / 2.0, position.y + size.y / 2.0);
    backend.blit_sprite(sheet, corner, 0, 0, color);
    corner.x += size.x;
    backend.blit_sprite(sheet, corner, 1, 0, color);
    corner.y -= size.y;
    backend.blit_sprite(sheet, corner, 1, 1, color);
    corner.x -= size.x;
    backend.blit_sprite(sheet, corner, 0, 1, color);
}

/// Bar filled left to right, hanging down from the rect's top edge
fn render_bar(backend: &mut dyn RenderBackend, rect: &Rect, fill: f32, color: Color) {
    let width = fill * rect.w;
    backend.fill_quad(
        [
            Vec2::new(rect.x, rect.y),
            Vec2::new(rect.x + width, rect.y),
            Vec2::new(rect.x + width, rect.y - rect.h),
            Vec2::new(rect.x, rect.y - rect.h),
        ],
        color,
    );
}
