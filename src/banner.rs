//! Banner and logo renderers built on [`FontPreview`].

use core::fmt;
use core::str::FromStr;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::canvas;
use crate::font::FontFace;
use crate::geometry::Size;
use crate::position::{resolve, Placement};
use crate::preview::{FontPreview, PreviewOptions, Render, RenderError, RenderKind};

/// Canvas size of a freshly built [`FontLogo`].
pub const LOGO_DEFAULT_SIZE: Size = Size::new(100, 100);

const LANDSCAPE: Size = Size::new(1653, 560);
const LOGO_TEXT_SIZE: u32 = 64;

const LETTERS: &str = "a b c d e f";
const ALPHA: &str = "Aa Bb Cc Dd Ee Ff";
const PARAGRAPH: &str = "Lorem ipsum dolor sit amet,\n\
consectetur adipiscing elit,\n\
sed do eiusmod tempor incididunt\n\
ut labore et dolore magna aliqua.";

/// Banner canvas shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
    Custom(Size),
}

impl Orientation {
    pub fn dimension(self) -> Size {
        match self {
            Self::Landscape => LANDSCAPE,
            Self::Portrait => Size::new(LANDSCAPE.height, LANDSCAPE.width),
            Self::Custom(size) => size,
        }
    }
}

impl From<Size> for Orientation {
    fn from(value: Size) -> Self {
        Self::Custom(value)
    }
}

impl From<(u32, u32)> for Orientation {
    fn from(value: (u32, u32)) -> Self {
        Self::Custom(value.into())
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "landscape" => Ok(Self::Landscape),
            "portrait" => Ok(Self::Portrait),
            other => Err(format!("unknown orientation: {other:?}")),
        }
    }
}

/// Which text a banner shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerMode {
    #[default]
    Letters,
    Alpha,
    #[serde(rename = "fontname")]
    FontName,
    Paragraph,
    /// Keep whatever text was configured.
    Literal,
    #[serde(rename = "none")]
    Blank,
}

impl BannerMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Letters => "letters",
            Self::Alpha => "alpha",
            Self::FontName => "fontname",
            Self::Paragraph => "paragraph",
            Self::Literal => "literal",
            Self::Blank => "none",
        }
    }

    fn text_for(self, face: &dyn FontFace) -> Option<String> {
        match self {
            Self::Letters => Some(LETTERS.to_string()),
            Self::Alpha => Some(ALPHA.to_string()),
            Self::FontName => Some(face.name().family),
            Self::Paragraph => Some(PARAGRAPH.to_string()),
            Self::Literal => None,
            Self::Blank => Some(String::new()),
        }
    }
}

impl FromStr for BannerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "letters" => Ok(Self::Letters),
            "alpha" => Ok(Self::Alpha),
            "fontname" => Ok(Self::FontName),
            "paragraph" => Ok(Self::Paragraph),
            "literal" => Ok(Self::Literal),
            "none" | "blank" => Ok(Self::Blank),
            other => Err(format!("unknown banner mode: {other:?}")),
        }
    }
}

impl fmt::Display for BannerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
struct Overlay {
    id: OverlayId,
    image: RgbaImage,
    placement: Placement,
}

/// Handle to one overlay added to a [`FontBanner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OverlayId(u64);

/// Wide preview strip that can carry other images on top of its text.
#[derive(Clone, Debug)]
pub struct FontBanner {
    preview: FontPreview,
    orientation: Orientation,
    mode: BannerMode,
    overlays: Vec<Overlay>,
    next_overlay: u64,
}

impl FontBanner {
    pub fn new(face: Rc<dyn FontFace>) -> Self {
        Self::with_options(
            face,
            Orientation::Landscape,
            BannerMode::Letters,
            PreviewOptions::default(),
        )
    }

    /// Build a banner. `options.dimension` is replaced by the orientation size.
    pub fn with_options(
        face: Rc<dyn FontFace>,
        orientation: Orientation,
        mode: BannerMode,
        mut options: PreviewOptions,
    ) -> Self {
        options.dimension = orientation.dimension();
        if let Some(text) = mode.text_for(face.as_ref()) {
            options.text = text;
        }
        Self {
            preview: FontPreview::with_options(face, options),
            orientation,
            mode,
            overlays: Vec::new(),
            next_overlay: 0,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn mode(&self) -> BannerMode {
        self.mode
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    /// Switch to a preset or custom size; `placement` also moves the text when given.
    pub fn set_orientation(
        &mut self,
        orientation: impl Into<Orientation>,
        placement: Option<Placement>,
    ) -> Result<(), RenderError> {
        self.orientation = orientation.into();
        self.preview.resize_canvas(self.orientation.dimension());
        if let Some(placement) = placement {
            self.preview.place(placement);
        }
        self.draw()
    }

    pub fn set_mode(&mut self, mode: BannerMode) -> Result<(), RenderError> {
        self.mode = mode;
        if let Some(text) = mode.text_for(self.preview.font().face().as_ref()) {
            self.preview.replace_text(&text);
        }
        self.draw()
    }

    /// Overlay the current canvas of `other`. It is kept and re-applied on every redraw.
    pub fn add_image(
        &mut self,
        other: &dyn Render,
        placement: impl Into<Placement>,
    ) -> Result<OverlayId, RenderError> {
        self.push_overlay(other.image().clone(), placement.into())
    }

    /// Overlay an image file, as [`FontBanner::add_image`].
    pub fn add_image_file(
        &mut self,
        path: impl AsRef<Path>,
        placement: impl Into<Placement>,
    ) -> Result<OverlayId, RenderError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| RenderError::Overlay {
            path: PathBuf::from(path),
            source,
        })?;
        self.push_overlay(image.to_rgba8(), placement.into())
    }

    pub fn clear_images(&mut self) -> Result<(), RenderError> {
        self.overlays.clear();
        self.draw()
    }

    /// Drop one overlay. Returns `false` when `id` is not on this banner.
    pub fn remove_image(&mut self, id: OverlayId) -> Result<bool, RenderError> {
        let Some(idx) = self.overlays.iter().position(|overlay| overlay.id == id) else {
            return Ok(false);
        };
        let removed = self.overlays.remove(idx);
        if let Err(err) = self.draw() {
            self.overlays.insert(idx, removed);
            return Err(err);
        }
        Ok(true)
    }

    fn push_overlay(
        &mut self,
        image: RgbaImage,
        placement: Placement,
    ) -> Result<OverlayId, RenderError> {
        let id = OverlayId(self.next_overlay);
        self.next_overlay = self.next_overlay.wrapping_add(1);
        self.overlays.push(Overlay {
            id,
            image,
            placement,
        });
        if let Err(err) = self.draw() {
            self.overlays.pop();
            return Err(err);
        }
        Ok(id)
    }

    fn apply_overlays(&mut self) {
        let target = self.preview.dimension();
        let mut image = std::mem::take(self.preview.image_mut());
        for overlay in &self.overlays {
            let mut size = canvas::size_of(&overlay.image);
            let scaled;
            let source = if target.is_exceeded_by(size) {
                size = canvas::fit_inside(size, target);
                log::warn!(
                    "overlay of {} scaled to {} to fit banner {}",
                    canvas::size_of(&overlay.image),
                    size,
                    target
                );
                scaled = canvas::resize(&overlay.image, size);
                &scaled
            } else {
                &overlay.image
            };
            let origin = resolve(overlay.placement, target, size);
            canvas::paste(&mut image, source, origin);
        }
        *self.preview.image_mut() = image;
    }
}

impl Render for FontBanner {
    fn kind(&self) -> RenderKind {
        RenderKind::Banner
    }

    fn preview(&self) -> &FontPreview {
        &self.preview
    }

    fn preview_mut(&mut self) -> &mut FontPreview {
        &mut self.preview
    }

    fn draw(&mut self) -> Result<(), RenderError> {
        self.preview.render()?;
        self.apply_overlays();
        Ok(())
    }

    fn as_banner_mut(&mut self) -> Option<&mut FontBanner> {
        Some(self)
    }
}

impl fmt::Display for FontBanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.preview, f)
    }
}

/// Small square preview, usually placed on a page header.
#[derive(Clone, Debug)]
pub struct FontLogo {
    preview: FontPreview,
}

impl FontLogo {
    pub fn new(face: Rc<dyn FontFace>, text: &str) -> Self {
        Self::with_options(
            face,
            PreviewOptions {
                font_size: LOGO_TEXT_SIZE,
                text: text.to_string(),
                dimension: LOGO_DEFAULT_SIZE,
                ..PreviewOptions::default()
            },
        )
    }

    pub fn with_options(face: Rc<dyn FontFace>, options: PreviewOptions) -> Self {
        Self {
            preview: FontPreview::with_options(face, options),
        }
    }

    pub fn new_size(&mut self, size: Size) -> Result<(), RenderError> {
        self.set_dimension(size)
    }
}

impl Render for FontLogo {
    fn kind(&self) -> RenderKind {
        RenderKind::Logo
    }

    fn preview(&self) -> &FontPreview {
        &self.preview
    }

    fn preview_mut(&mut self) -> &mut FontPreview {
        &mut self.preview
    }

    fn draw(&mut self) -> Result<(), RenderError> {
        self.preview.render()
    }
}

impl fmt::Display for FontLogo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.preview, f)
    }
}
