//! User interface
//!
//! Only the in-flight HUD lives here; menus and dialogs belong to the game.

pub mod hud;

pub use hud::{Hud, HudError, HudLayout, HudState, NavAction, WorldQuery};
