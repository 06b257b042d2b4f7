//! Presentation surface interface
//!
//! The core only ever issues two draw commands: a full-width filled row and a
//! scaled sprite blit. Pixel formats, buffer flips and windows live behind
//! the [`Renderer`] trait.

use bytemuck::{Pod, Zeroable};
use glam::IVec2;
use serde::{Deserialize, Serialize};

/// 24-bit colour
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    /// Transparent key used by sprite sheets
    pub const MAGENTA: Rgb = Rgb::new(255, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a colour from unbounded channel values, saturating into 0..=255
    pub fn saturating(r: f64, g: f64, b: f64) -> Self {
        // `as u8` saturates and maps NaN to zero
        Self::new(r as u8, g as u8, b as u8)
    }
}

/// Opaque sprite handle supplied by the host
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpriteId(pub u32);

/// A sprite, or a single source row (band) of it
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpriteRef {
    pub id: SpriteId,
    pub band: Option<u32>,
}

impl SpriteRef {
    pub fn band(id: SpriteId, band: u32) -> Self {
        Self {
            id,
            band: Some(band),
        }
    }
}

impl From<SpriteId> for SpriteRef {
    fn from(id: SpriteId) -> Self {
        Self { id, band: None }
    }
}

/// Draw target for a frame
pub trait Renderer {
    /// Fill `width_px` pixels of `row`, starting at column 0
    fn fill_row(&mut self, row: i32, color: Rgb, width_px: i32);

    /// Blit `sprite` scaled to `size` with its top-left corner at `origin`
    fn draw_scaled_sprite(&mut self, sprite: SpriteRef, origin: IVec2, size: IVec2);
}

/// A recorded draw command
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DrawCommand {
    FillRow {
        row: i32,
        color: Rgb,
        width_px: i32,
    },
    Sprite {
        sprite: SpriteRef,
        origin: IVec2,
        size: IVec2,
    },
}

/// Renderer that only records what it was asked to draw
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    pub commands: Vec<DrawCommand>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Rows filled, in issue order
    pub fn filled_rows(&self) -> Vec<i32> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRow { row, .. } => Some(*row),
                DrawCommand::Sprite { .. } => None,
            })
            .collect()
    }

    /// Sprite draws for one handle, ignoring banded slices
    pub fn sprites(&self, id: SpriteId) -> Vec<(IVec2, IVec2)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Sprite {
                    sprite,
                    origin,
                    size,
                } if sprite.id == id && sprite.band.is_none() => Some((*origin, *size)),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for CommandLog {
    fn fill_row(&mut self, row: i32, color: Rgb, width_px: i32) {
        self.commands.push(DrawCommand::FillRow {
            row,
            color,
            width_px,
        });
    }

    fn draw_scaled_sprite(&mut self, sprite: SpriteRef, origin: IVec2, size: IVec2) {
        self.commands.push(DrawCommand::Sprite {
            sprite,
            origin,
            size,
        });
    }
}
