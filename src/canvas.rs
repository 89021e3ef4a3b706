//! Raster helpers shared by every component that owns a canvas.

use core::fmt;
use core::str::FromStr;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::color::Color;
use crate::geometry::{Point, Size};

/// Pixel format used when a canvas leaves the crate (save, export).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorMode {
    #[default]
    #[serde(rename = "RGB")]
    Rgb,
    #[serde(rename = "RGBA")]
    Rgba,
    #[serde(rename = "L")]
    Luma,
}

impl ColorMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rgb => "RGB",
            Self::Rgba => "RGBA",
            Self::Luma => "L",
        }
    }

    /// Convert an RGBA canvas into this mode.
    pub fn export(self, canvas: &RgbaImage) -> DynamicImage {
        let image = DynamicImage::ImageRgba8(canvas.clone());
        match self {
            Self::Rgb => DynamicImage::ImageRgb8(image.to_rgb8()),
            Self::Rgba => image,
            Self::Luma => DynamicImage::ImageLuma8(image.to_luma8()),
        }
    }
}

impl FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RGB" => Ok(Self::Rgb),
            "RGBA" => Ok(Self::Rgba),
            "L" => Ok(Self::Luma),
            other => Err(format!("unsupported color mode: {other}")),
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn blank(size: Size, color: Color) -> RgbaImage {
    RgbaImage::from_pixel(size.width, size.height, color.to_rgba())
}

pub(crate) fn size_of(image: &RgbaImage) -> Size {
    Size::new(image.width(), image.height())
}

/// Copy `src` onto `dst` at `origin`, replacing pixels and clipping at the edges.
pub(crate) fn paste(dst: &mut RgbaImage, src: &RgbaImage, origin: Point) {
    imageops::replace(dst, src, origin.x as i64, origin.y as i64);
}

pub(crate) fn resize(image: &RgbaImage, size: Size) -> RgbaImage {
    if size_of(image) == size {
        return image.clone();
    }
    imageops::resize(image, size.width.max(1), size.height.max(1), FilterType::Lanczos3)
}

/// Largest size with the source aspect ratio that fits inside `target`.
pub(crate) fn fit_inside(src: Size, target: Size) -> Size {
    let src_w = src.width.max(1) as u64;
    let src_h = src.height.max(1) as u64;
    let target_w = target.width.max(1) as u64;
    let target_h = target.height.max(1) as u64;

    let width_limited = target_w * src_h <= target_h * src_w;
    if width_limited {
        let scaled_h = ((target_w * src_h) / src_w).clamp(1, target_h);
        Size::new(target_w as u32, scaled_h as u32)
    } else {
        let scaled_w = ((target_h * src_w) / src_h).clamp(1, target_w);
        Size::new(scaled_w as u32, target_h as u32)
    }
}

/// Horizontal line `width` pixels thick centered on `y`, spanning the canvas.
pub(crate) fn draw_hline(canvas: &mut RgbaImage, y: i32, width: u32, color: Color) {
    if width == 0 || canvas.width() == 0 {
        return;
    }
    let top = y - (width / 2) as i32;
    let rect = imageproc::rect::Rect::at(0, top).of_size(canvas.width(), width);
    imageproc::drawing::draw_filled_rect_mut(canvas, rect, color.to_rgba());
}

/// Write `canvas` to `path`. The format follows the extension; PNG when there is none.
pub(crate) fn save(canvas: &RgbaImage, mode: ColorMode, path: &Path) -> image::ImageResult<()> {
    let image = mode.export(canvas);
    if path.extension().is_none() {
        image.save_with_format(path, ImageFormat::Png)?;
    } else {
        image.save(path)?;
    }
    log::info!(
        "saved {}x{} {} image to {}",
        canvas.width(),
        canvas.height(),
        mode,
        path.display()
    );
    Ok(())
}

static SHOW_NONCE: AtomicUsize = AtomicUsize::new(0);

/// Write `canvas` to a temporary PNG and hand it to the platform image viewer.
pub(crate) fn show(canvas: &RgbaImage, mode: ColorMode, label: &str) -> io::Result<PathBuf> {
    let nonce = SHOW_NONCE.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!(
        "{label}-{}-{nonce}.png",
        std::process::id()
    ));
    save(canvas, mode, &path).map_err(io::Error::other)?;
    viewer_command(&path).spawn()?;
    Ok(path)
}

fn viewer_command(path: &Path) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}
