//! Grid of renderer canvases.

use core::fmt;
use core::str::FromStr;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::canvas::{self, ColorMode};
use crate::color::Color;
use crate::geometry::{Point, Size};
use crate::preview::{RenderError, SharedRender};

const DEFAULT_MAX_TILE: usize = 2;
const DEFAULT_SAVE_NAME: &str = "fontwall.png";

/// Whether tiles fill rows (left to right) or columns (top to bottom).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallMode {
    #[default]
    Horizontal,
    Vertical,
}

impl WallMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

impl FromStr for WallMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "horizontal" => Ok(Self::Horizontal),
            "vertical" => Ok(Self::Vertical),
            other => Err(format!("unknown wall mode: {other:?}")),
        }
    }
}

impl fmt::Display for WallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canvas size and tile origins, in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WallLayout {
    pub canvas: Size,
    pub origins: Vec<Point>,
}

/// Tile `sizes` into lines of at most `max_tile`.
///
/// Horizontal lines are rows as wide as their tiles combined and as tall as
/// their tallest tile, stacked downward. Vertical lines are the transpose.
pub fn plan_wall(sizes: &[Size], max_tile: usize, mode: WallMode) -> WallLayout {
    let per_line = max_tile.max(1);
    let mut origins = Vec::with_capacity(sizes.len());
    // (main, cross): main runs along a line, cross stacks lines.
    let mut cross = 0u32;
    let mut main_extent = 0u32;

    for line in sizes.chunks(per_line) {
        let mut main = 0u32;
        let mut thickness = 0u32;
        for size in line {
            let (along, across) = match mode {
                WallMode::Horizontal => (size.width, size.height),
                WallMode::Vertical => (size.height, size.width),
            };
            origins.push(match mode {
                WallMode::Horizontal => Point::new(main as i32, cross as i32),
                WallMode::Vertical => Point::new(cross as i32, main as i32),
            });
            main = main.saturating_add(along);
            thickness = thickness.max(across);
        }
        main_extent = main_extent.max(main);
        cross = cross.saturating_add(thickness);
    }

    let canvas = match mode {
        WallMode::Horizontal => Size::new(main_extent, cross),
        WallMode::Vertical => Size::new(cross, main_extent),
    };
    WallLayout { canvas, origins }
}

/// Renderer canvases pasted side by side on one white image.
#[derive(Debug)]
pub struct FontWall {
    renderers: Vec<SharedRender>,
    max_tile: usize,
    mode: WallMode,
    canvas: RgbaImage,
}

impl FontWall {
    /// Two tiles per row.
    pub fn new(renderers: Vec<SharedRender>) -> Self {
        Self::with_layout(renderers, DEFAULT_MAX_TILE, WallMode::Horizontal)
    }

    pub fn with_layout(renderers: Vec<SharedRender>, max_tile: usize, mode: WallMode) -> Self {
        let mut wall = Self {
            renderers,
            max_tile,
            mode,
            canvas: RgbaImage::new(0, 0),
        };
        wall.draw();
        wall
    }

    pub fn renderers(&self) -> &[SharedRender] {
        &self.renderers
    }

    pub fn max_tile(&self) -> usize {
        self.max_tile
    }

    pub fn mode(&self) -> WallMode {
        self.mode
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn set_max_tile(&mut self, max_tile: usize) {
        self.max_tile = max_tile;
        self.draw();
    }

    pub fn set_mode(&mut self, mode: WallMode) {
        self.mode = mode;
        self.draw();
    }

    /// Rebuild the wall from the renderers' current canvases.
    pub fn draw(&mut self) {
        let tiles: Vec<RgbaImage> = self
            .renderers
            .iter()
            .map(|renderer| renderer.borrow().image().clone())
            .collect();
        let sizes: Vec<Size> = tiles.iter().map(canvas::size_of).collect();
        let layout = plan_wall(&sizes, self.max_tile, self.mode);

        let mut wall = canvas::blank(layout.canvas, Color::WHITE);
        for (tile, origin) in tiles.iter().zip(&layout.origins) {
            canvas::paste(&mut wall, tile, *origin);
        }
        log::debug!(
            "wall of {} tiles, {} per line {}, is {}",
            tiles.len(),
            self.max_tile.max(1),
            self.mode,
            layout.canvas
        );
        self.canvas = wall;
    }

    /// Defaults to `fontwall.png` in the working directory.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf, RenderError> {
        let path = path.map_or_else(|| PathBuf::from(DEFAULT_SAVE_NAME), Path::to_path_buf);
        canvas::save(&self.canvas, ColorMode::Rgb, &path).map_err(|source| {
            RenderError::Save {
                path: path.clone(),
                source,
            }
        })?;
        Ok(path)
    }

    pub fn show(&self) -> Result<PathBuf, RenderError> {
        canvas::show(&self.canvas, ColorMode::Rgb, "fontwall").map_err(RenderError::Show)
    }
}
