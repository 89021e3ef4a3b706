//! Text measurement on top of a bound font face.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::font::BoundFont;
use crate::geometry::{BoundingBox, Point, Size};

/// Extra pixels between consecutive lines of multi-line text.
pub const LINE_SPACING: u32 = 4;

/// Horizontal alignment of lines relative to the widest line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl FromStr for TextAlign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(format!("unknown text alignment: {other:?}")),
        }
    }
}

impl fmt::Display for TextAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel size of a single line of text.
pub fn text_size(font: &BoundFont, text: &str) -> Size {
    font.measure(text).size()
}

/// Pixel size of `text` laid out line by line, as it will be drawn.
pub fn multiline_text_size(font: &BoundFont, text: &str) -> Size {
    multiline_bbox(font, text).size()
}

fn multiline_bbox(font: &BoundFont, text: &str) -> BoundingBox {
    let advance = line_advance(font);
    text.split('\n')
        .enumerate()
        .map(|(idx, line)| font.measure(line).translate(0, line_top(idx, advance)))
        .fold(BoundingBox::default(), BoundingBox::union)
}

fn line_advance(font: &BoundFont) -> i32 {
    i32::try_from(font.line_height().saturating_add(LINE_SPACING)).unwrap_or(i32::MAX)
}

fn line_top(idx: usize, advance: i32) -> i32 {
    i32::try_from(idx)
        .unwrap_or(i32::MAX)
        .saturating_mul(advance)
}

/// One positioned line of a multi-line text block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineLayout<'a> {
    pub text: &'a str,
    /// Offset of the line origin from the block origin.
    pub offset: Point,
}

/// Split `text` into lines and offset each one for `align`.
pub fn layout_lines<'a>(font: &BoundFont, text: &'a str, align: TextAlign) -> Vec<LineLayout<'a>> {
    let advance = line_advance(font);
    let widths: Vec<(&str, i32)> = text
        .split('\n')
        .map(|line| (line, font.measure(line).size().width as i32))
        .collect();
    let block_width = widths.iter().map(|(_, width)| *width).max().unwrap_or(0);

    widths
        .into_iter()
        .enumerate()
        .map(|(idx, (line, width))| {
            let dx = match align {
                TextAlign::Left => 0,
                TextAlign::Center => (block_width - width) / 2,
                TextAlign::Right => block_width - width,
            };
            LineLayout {
                text: line,
                offset: Point::new(dx, line_top(idx, advance)),
            }
        })
        .collect()
}
