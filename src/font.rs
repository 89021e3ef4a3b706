use ab_glyph::{point, Font, FontArc, InvalidFont, PxScale, ScaleFont};
use core::fmt;
use image::{Rgba, RgbaImage};
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::geometry::{BoundingBox, Point};

/// Family and style names reported by a face.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FontName {
    pub family: String,
    pub style: String,
}

impl FontName {
    pub fn new(family: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            style: style.into(),
        }
    }
}

impl fmt::Display for FontName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.style.is_empty() {
            f.write_str(&self.family)
        } else {
            write!(f, "{} {}", self.family, self.style)
        }
    }
}

/// Measurement and rasterization capability of a single font face.
///
/// Sizes are pixel heights. All methods take one line of text; multi-line
/// layout is handled by [`crate::multiline_text_size`] and [`crate::layout_lines`].
pub trait FontFace: fmt::Debug {
    fn name(&self) -> FontName;

    /// Ink box of `line` drawn with its top-left origin at `(0, 0)`.
    fn measure(&self, size: u32, line: &str) -> BoundingBox;

    /// Distance between the tops of two consecutive lines, without extra spacing.
    fn line_height(&self, size: u32) -> u32;

    fn draw_line(&self, canvas: &mut RgbaImage, size: u32, origin: Point, line: &str, color: Rgba<u8>);
}

/// A face bound to one pixel size.
///
/// Changing size derives a new binding; the shared face is never mutated.
#[derive(Clone, Debug)]
pub struct BoundFont {
    face: Rc<dyn FontFace>,
    size: u32,
}

impl BoundFont {
    pub fn new(face: Rc<dyn FontFace>, size: u32) -> Self {
        Self { face, size }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn face(&self) -> &Rc<dyn FontFace> {
        &self.face
    }

    pub fn name(&self) -> FontName {
        self.face.name()
    }

    pub fn resized(&self, size: u32) -> Self {
        Self {
            face: Rc::clone(&self.face),
            size,
        }
    }

    pub fn measure(&self, line: &str) -> BoundingBox {
        self.face.measure(self.size, line)
    }

    pub fn line_height(&self) -> u32 {
        self.face.line_height(self.size)
    }

    pub fn draw_line(&self, canvas: &mut RgbaImage, origin: Point, line: &str, color: Rgba<u8>) {
        self.face.draw_line(canvas, self.size, origin, line, color);
    }
}

/// Error returned when a font face cannot be loaded.
#[derive(Debug)]
pub enum FontError {
    Io { path: PathBuf, source: io::Error },
    InvalidFont,
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "unable to read font {}: {}", path.display(), source)
            }
            Self::InvalidFont => write!(f, "font data is not a valid TrueType/OpenType face"),
        }
    }
}

impl std::error::Error for FontError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidFont => None,
        }
    }
}

impl From<InvalidFont> for FontError {
    fn from(_: InvalidFont) -> Self {
        Self::InvalidFont
    }
}

/// TrueType/OpenType face rasterized through `ab_glyph` and `imageproc`.
#[derive(Clone)]
pub struct TrueTypeFace {
    font: FontArc,
    name: FontName,
    path: Option<PathBuf>,
}

impl TrueTypeFace {
    /// Load a face from a font file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut face = Self::from_bytes(data)?;
        if face.name.family.is_empty() {
            face.name.family = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        face.path = Some(path.to_path_buf());
        Ok(face)
    }

    /// Load a face from in-memory font data (first face of a collection).
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, FontError> {
        let name = read_face_name(&data);
        let font = FontArc::try_from_vec(data)?;
        Ok(Self {
            font,
            name,
            path: None,
        })
    }

    /// Load a face and share it for use in renderers.
    pub fn open_shared(path: impl AsRef<Path>) -> Result<Rc<dyn FontFace>, FontError> {
        Ok(Rc::new(Self::open(path)?))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn scale(size: u32) -> PxScale {
        PxScale::from(size.max(1) as f32)
    }
}

impl fmt::Debug for TrueTypeFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrueTypeFace")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish()
    }
}

impl FontFace for TrueTypeFace {
    fn name(&self) -> FontName {
        self.name.clone()
    }

    fn measure(&self, size: u32, line: &str) -> BoundingBox {
        let scale = Self::scale(size);
        let scaled = self.font.as_scaled(scale);
        let mut caret = 0.0f32;
        let mut previous = None;
        let mut ink: Option<ab_glyph::Rect> = None;

        // Glyphs sit on the ascent line, matching where draw_text_mut puts them.
        for ch in line.chars() {
            let glyph_id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, glyph_id);
            }
            let glyph = glyph_id.with_scale_and_position(scale, point(caret, scaled.ascent()));
            caret += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                ink = Some(match ink {
                    Some(acc) => ab_glyph::Rect {
                        min: point(acc.min.x.min(bounds.min.x), acc.min.y.min(bounds.min.y)),
                        max: point(acc.max.x.max(bounds.max.x), acc.max.y.max(bounds.max.y)),
                    },
                    None => bounds,
                });
            }
        }

        match ink {
            Some(rect) => BoundingBox::new(
                rect.min.x.floor().min(0.0) as i32,
                rect.min.y.floor() as i32,
                rect.max.x.ceil().max(caret.ceil()) as i32,
                rect.max.y.ceil() as i32,
            ),
            // No ink: the advance by the ascent.
            None => BoundingBox::new(0, 0, caret.ceil() as i32, scaled.ascent().ceil() as i32),
        }
    }

    fn line_height(&self, size: u32) -> u32 {
        let scaled = self.font.as_scaled(Self::scale(size));
        (scaled.height() + scaled.line_gap()).ceil().max(1.0) as u32
    }

    fn draw_line(&self, canvas: &mut RgbaImage, size: u32, origin: Point, line: &str, color: Rgba<u8>) {
        // Text grows right and down from the origin.
        let outside = origin.x >= canvas.width() as i32 || origin.y >= canvas.height() as i32;
        if line.is_empty() || outside {
            return;
        }
        imageproc::drawing::draw_text_mut(
            canvas,
            color,
            origin.x,
            origin.y,
            Self::scale(size),
            &self.font,
            line,
        );
    }
}

fn read_face_name(data: &[u8]) -> FontName {
    let Ok(face) = ttf_parser::Face::parse(data, 0) else {
        return FontName::default();
    };
    let lookup = |name_id: u16| {
        face.names()
            .into_iter()
            .filter(|name| name.name_id == name_id)
            .find_map(|name| name.to_string())
            .unwrap_or_default()
    };
    FontName::new(
        lookup(ttf_parser::name_id::FAMILY),
        lookup(ttf_parser::name_id::SUBFAMILY),
    )
}
