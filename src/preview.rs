use core::fmt;
use image::{DynamicImage, RgbaImage};
use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::banner::FontBanner;
use crate::canvas::{self, ColorMode};
use crate::color::Color;
use crate::font::{BoundFont, FontFace};
use crate::geometry::{Point, Size};
use crate::metrics::{layout_lines, multiline_text_size, TextAlign};
use crate::position::{resolve, Placement};

/// Smallest font size auto-shrink will reach.
pub const MIN_FONT_SIZE: u32 = 1;
/// Decrement applied per auto-shrink step.
pub const FONT_SIZE_STEP: u32 = 2;

const DEFAULT_FONT_SIZE: u32 = 64;
const DEFAULT_TEXT: &str = "a b c d e f";
const DEFAULT_DIMENSION: Size = Size::new(700, 327);
const DEFAULT_SAVE_NAME: &str = "fontpreview.png";

/// Construction options for [`FontPreview`].
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewOptions {
    pub font_size: u32,
    pub text: String,
    pub color_mode: ColorMode,
    pub background: Color,
    pub foreground: Color,
    pub dimension: Size,
    pub placement: Placement,
    pub align: TextAlign,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            text: DEFAULT_TEXT.to_string(),
            color_mode: ColorMode::Rgb,
            background: Color::WHITE,
            foreground: Color::BLACK,
            dimension: DEFAULT_DIMENSION,
            placement: Placement::default(),
            align: TextAlign::Left,
        }
    }
}

/// Renderer variant, checked when renderers are assigned to page slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderKind {
    Preview,
    Banner,
    Logo,
}

impl RenderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Preview => "preview",
            Self::Banner => "banner",
            Self::Logo => "logo",
        }
    }
}

impl fmt::Display for RenderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised while producing or persisting a canvas.
#[derive(Debug)]
pub enum RenderError {
    Background {
        path: PathBuf,
        source: image::ImageError,
    },
    Overlay {
        path: PathBuf,
        source: image::ImageError,
    },
    Save {
        path: PathBuf,
        source: image::ImageError,
    },
    Show(io::Error),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Background { path, source } => {
                write!(f, "background image {} failed: {}", path.display(), source)
            }
            Self::Overlay { path, source } => {
                write!(f, "overlay image {} failed: {}", path.display(), source)
            }
            Self::Save { path, source } => {
                write!(f, "unable to save {}: {}", path.display(), source)
            }
            Self::Show(err) => write!(f, "unable to display image: {}", err),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Background { source, .. }
            | Self::Overlay { source, .. }
            | Self::Save { source, .. } => Some(source),
            Self::Show(err) => Some(err),
        }
    }
}

/// Shared handle to any renderer. Pages and walls hold these without owning the renderer.
pub type SharedRender = Rc<RefCell<dyn Render>>;

/// Wrap a renderer for sharing; the typed handle coerces to [`SharedRender`].
pub fn shared<R: Render + 'static>(renderer: R) -> Rc<RefCell<R>> {
    Rc::new(RefCell::new(renderer))
}

/// Capability set shared by previews, banners and logos.
///
/// Every setter rebuilds the canvas; nothing is patched in place.
pub trait Render: fmt::Debug {
    fn kind(&self) -> RenderKind;
    fn preview(&self) -> &FontPreview;
    fn preview_mut(&mut self) -> &mut FontPreview;

    /// Regenerate the canvas from the current state.
    fn draw(&mut self) -> Result<(), RenderError>;

    fn as_banner_mut(&mut self) -> Option<&mut FontBanner> {
        None
    }

    fn image(&self) -> &RgbaImage {
        self.preview().image()
    }

    fn to_image(&self) -> DynamicImage {
        let preview = self.preview();
        preview.color_mode().export(preview.image())
    }

    fn draw_aligned(&mut self, align: TextAlign) -> Result<(), RenderError> {
        self.set_align(align)
    }

    fn set_align(&mut self, align: TextAlign) -> Result<(), RenderError> {
        self.preview_mut().align = align;
        self.draw()
    }

    /// Rebind the font at `size`, shrinking it until the text fits, then redraw.
    fn set_font_size(&mut self, size: u32) -> Result<(), RenderError> {
        self.preview_mut().rebind_font_size(size);
        self.draw()
    }

    fn set_text_position(&mut self, placement: Placement) -> Result<(), RenderError> {
        self.preview_mut().place(placement);
        self.draw()
    }

    fn set_text(&mut self, text: &str) -> Result<(), RenderError> {
        self.preview_mut().replace_text(text);
        self.draw()
    }

    fn set_dimension(&mut self, dimension: Size) -> Result<(), RenderError> {
        self.preview_mut().resize_canvas(dimension);
        self.draw()
    }

    fn set_colors(&mut self, foreground: Color, background: Color) -> Result<(), RenderError> {
        let preview = self.preview_mut();
        preview.foreground = foreground;
        preview.background = background;
        self.draw()
    }

    fn set_color_mode(&mut self, mode: ColorMode) -> Result<(), RenderError> {
        self.preview_mut().color_mode = mode;
        self.draw()
    }

    /// Use an image file as background instead of the flat color. `None` restores the color.
    /// A file that fails to load leaves the previous background in place.
    fn set_background_image(&mut self, path: Option<PathBuf>) -> Result<(), RenderError> {
        let previous = std::mem::replace(&mut self.preview_mut().background_image, path);
        if let Err(err) = self.draw() {
            self.preview_mut().background_image = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Persist the current canvas. Defaults to `fontpreview.png` in the working directory.
    fn save(&self, path: Option<&Path>) -> Result<PathBuf, RenderError> {
        let path = path.map_or_else(|| PathBuf::from(DEFAULT_SAVE_NAME), Path::to_path_buf);
        let preview = self.preview();
        canvas::save(preview.image(), preview.color_mode(), &path).map_err(|source| {
            RenderError::Save {
                path: path.clone(),
                source,
            }
        })?;
        Ok(path)
    }

    fn show(&self) -> Result<PathBuf, RenderError> {
        let preview = self.preview();
        canvas::show(preview.image(), preview.color_mode(), "fontpreview").map_err(RenderError::Show)
    }
}

/// Sample text rendered with one font onto a canvas.
#[derive(Clone, Debug)]
pub struct FontPreview {
    font: BoundFont,
    text: String,
    foreground: Color,
    background: Color,
    color_mode: ColorMode,
    background_image: Option<PathBuf>,
    dimension: Size,
    placement: Placement,
    position: Point,
    align: TextAlign,
    image: RgbaImage,
}

impl FontPreview {
    pub fn new(face: Rc<dyn FontFace>) -> Self {
        Self::with_options(face, PreviewOptions::default())
    }

    pub fn with_options(face: Rc<dyn FontFace>, options: PreviewOptions) -> Self {
        let mut preview = Self {
            font: BoundFont::new(face, options.font_size.max(MIN_FONT_SIZE)),
            text: options.text,
            foreground: options.foreground,
            background: options.background,
            color_mode: options.color_mode,
            background_image: None,
            dimension: options.dimension,
            placement: options.placement,
            position: Point::default(),
            align: options.align,
            image: RgbaImage::new(0, 0),
        };
        if let Placement::Literal(point) = preview.placement {
            preview.position = point;
        }
        preview.relayout();
        preview.image = preview.render_flat();
        preview
    }

    pub fn font(&self) -> &BoundFont {
        &self.font
    }

    pub fn font_size(&self) -> u32 {
        self.font.size()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn foreground(&self) -> Color {
        self.foreground
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn background_image(&self) -> Option<&Path> {
        self.background_image.as_deref()
    }

    pub fn dimension(&self) -> Size {
        self.dimension
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Resolved top-left coordinate of the text block.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn align(&self) -> TextAlign {
        self.align
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub(crate) fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    /// Measured size of the text block at the current font size.
    pub fn text_size(&self) -> Size {
        multiline_text_size(&self.font, &self.text)
    }

    pub(crate) fn relayout(&mut self) {
        if self.placement.is_anchor() {
            self.position = resolve(self.placement, self.dimension, self.text_size());
        }
    }

    pub(crate) fn rebind_font_size(&mut self, size: u32) {
        self.font = self.font.resized(size.max(MIN_FONT_SIZE));
        self.shrink_to_fit();
        self.relayout();
    }

    fn shrink_to_fit(&mut self) {
        let requested = self.font.size();
        let mut measured = self.text_size();
        while self.dimension.is_exceeded_by(measured) && self.font.size() > MIN_FONT_SIZE {
            let next = self
                .font
                .size()
                .saturating_sub(FONT_SIZE_STEP)
                .max(MIN_FONT_SIZE);
            self.font = self.font.resized(next);
            measured = self.text_size();
        }
        if self.font.size() != requested {
            log::debug!(
                "shrunk font from {} to {} to fit {} (text {})",
                requested,
                self.font.size(),
                self.dimension,
                measured
            );
        }
    }

    pub(crate) fn place(&mut self, placement: Placement) {
        self.placement = placement;
        match placement {
            Placement::Literal(point) => self.position = point,
            Placement::Anchor(_) => self.relayout(),
        }
    }

    pub(crate) fn replace_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.relayout();
    }

    pub(crate) fn resize_canvas(&mut self, dimension: Size) {
        self.dimension = dimension;
        self.relayout();
    }

    /// Rebuild the canvas: background first, then the text block.
    pub(crate) fn render(&mut self) -> Result<(), RenderError> {
        let mut image = match &self.background_image {
            Some(path) => {
                let loaded = image::open(path).map_err(|source| RenderError::Background {
                    path: path.clone(),
                    source,
                })?;
                canvas::resize(&loaded.to_rgba8(), self.dimension)
            }
            None => canvas::blank(self.dimension, self.background),
        };
        self.paint_text(&mut image);
        self.image = image;
        Ok(())
    }

    fn render_flat(&self) -> RgbaImage {
        let mut image = canvas::blank(self.dimension, self.background);
        self.paint_text(&mut image);
        image
    }

    fn paint_text(&self, image: &mut RgbaImage) {
        let color = self.foreground.to_rgba();
        for line in layout_lines(&self.font, &self.text, self.align) {
            let origin = self.position.offset(line.offset.x, line.offset.y);
            self.font.draw_line(image, origin, line.text, color);
        }
    }
}

impl Render for FontPreview {
    fn kind(&self) -> RenderKind {
        RenderKind::Preview
    }

    fn preview(&self) -> &FontPreview {
        self
    }

    fn preview_mut(&mut self) -> &mut FontPreview {
        self
    }

    fn draw(&mut self) -> Result<(), RenderError> {
        self.render()
    }
}

impl fmt::Display for FontPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "font_name:{},font_size:{},text:{},text_position:{},dimension:{}",
            self.font.name(),
            self.font.size(),
            self.text,
            self.position,
            self.dimension
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Anchor;
    use crate::test_support::{fixed_face, temp_dir};
    use image::Rgba;

    fn preview_with(text: &str, dimension: Size) -> FontPreview {
        FontPreview::with_options(
            fixed_face(),
            PreviewOptions {
                text: text.to_string(),
                dimension,
                ..PreviewOptions::default()
            },
        )
    }

    #[test]
    fn construct_centers_text_and_renders() {
        let preview = FontPreview::new(fixed_face());
        assert_eq!(preview.image().dimensions(), (700, 327));
        assert_eq!(preview.text_size(), Size::new(352, 64));
        assert_eq!(preview.position(), Point::new(174, 131));
        assert_eq!(*preview.image().get_pixel(174, 131), Rgba([0, 0, 0, 255]));
        assert_eq!(*preview.image().get_pixel(0, 0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn fitting_font_size_is_kept() {
        let mut preview = FontPreview::new(fixed_face());
        preview.set_font_size(70).expect("set font size");
        assert_eq!(preview.font_size(), 70);
        assert_eq!(preview.position(), Point::new(157, 128));
    }

    #[test]
    fn oversized_font_shrinks_in_steps_until_it_fits() {
        let mut preview = preview_with("abcdefghij", Size::new(100, 50));
        preview.set_font_size(64).expect("set font size");
        assert_eq!(preview.font_size(), 20);
        assert!(!preview.dimension().is_exceeded_by(preview.text_size()));
    }

    #[test]
    fn shrink_converges_on_repeated_requests() {
        let mut preview = preview_with("abcdefghij", Size::new(100, 50));
        let mut sizes = Vec::new();
        for _ in 0..3 {
            preview.set_font_size(63).expect("set font size");
            sizes.push(preview.font_size());
        }
        assert!(sizes.iter().all(|size| *size == sizes[0]));
        assert!(sizes[0] <= 63);
        assert!(!preview.dimension().is_exceeded_by(preview.text_size()));
    }

    #[test]
    fn shrink_stops_at_floor_when_nothing_fits() {
        let mut preview = preview_with("abcdefghij", Size::new(1, 1));
        preview.set_font_size(9).expect("set font size");
        assert_eq!(preview.font_size(), MIN_FONT_SIZE);
    }

    #[test]
    fn literal_position_survives_font_changes() {
        let mut preview = FontPreview::new(fixed_face());
        preview
            .set_text_position(Placement::from((100, 100)))
            .expect("set literal position");
        preview.set_font_size(40).expect("set font size");
        assert_eq!(preview.position(), Point::new(100, 100));
    }

    #[test]
    fn anchored_position_tracks_text_changes() {
        let mut preview = FontPreview::new(fixed_face());
        preview
            .set_text_position(Anchor::RightBelow.into())
            .expect("set anchor");
        preview.set_text("unittest").expect("set text");
        assert_eq!(preview.text(), "unittest");
        assert_eq!(preview.position(), Point::new(700 - 8 * 32, 327 - 64));
    }

    #[test]
    fn set_dimension_regenerates_canvas() {
        let mut preview = FontPreview::new(fixed_face());
        preview
            .set_dimension(Size::new(1000, 1000))
            .expect("set dimension");
        assert_eq!(preview.image().dimensions(), (1000, 1000));
        assert_eq!(preview.position(), Point::new(324, 468));
    }

    #[test]
    fn colors_apply_on_redraw() {
        let mut preview = FontPreview::new(fixed_face());
        preview
            .set_colors(Color::from((253, 194, 45)), "#269cc3".parse().expect("hex"))
            .expect("set colors");
        assert_eq!(*preview.image().get_pixel(0, 0), Rgba([0x26, 0x9c, 0xc3, 255]));
        let at_text = preview.position();
        assert_eq!(
            *preview.image().get_pixel(at_text.x as u32, at_text.y as u32),
            Rgba([253, 194, 45, 255])
        );
    }

    #[test]
    fn right_aligned_lines_share_right_edge() {
        let mut preview = preview_with("ab\nabcd", Size::new(300, 200));
        preview
            .set_text_position(Anchor::LeftTop.into())
            .expect("set anchor");
        preview.draw_aligned(TextAlign::Right).expect("draw aligned");
        let image = preview.image();
        // First line spans x 64..128, second 0..128 at size 64.
        assert_eq!(image.get_pixel(10, 10).0[0], 255);
        assert_eq!(image.get_pixel(100, 10).0[0], 0);
        assert_eq!(image.get_pixel(10, 80).0[0], 0);
    }

    #[test]
    fn background_image_fills_canvas() {
        let dir = temp_dir("preview-bg");
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let bg_path = dir.join("bg.png");
        RgbaImage::from_pixel(10, 10, Rgba([0, 200, 0, 255]))
            .save(&bg_path)
            .expect("write background");

        let mut preview = FontPreview::new(fixed_face());
        preview
            .set_background_image(Some(bg_path.clone()))
            .expect("set background image");
        assert_eq!(preview.image().dimensions(), (700, 327));
        assert_eq!(*preview.image().get_pixel(2, 2), Rgba([0, 200, 0, 255]));
        assert_eq!(preview.background_image(), Some(bg_path.as_path()));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_background_image_is_reported() {
        let mut preview = FontPreview::new(fixed_face());
        let err = preview
            .set_background_image(Some(PathBuf::from("/no/such/background.png")))
            .expect_err("missing background");
        assert!(matches!(err, RenderError::Background { .. }));
    }

    #[test]
    fn failed_background_image_keeps_renderer_drawable() {
        let mut preview = FontPreview::new(fixed_face());
        let before = preview.image().clone();
        preview
            .set_background_image(Some(PathBuf::from("/no/such/background.png")))
            .expect_err("missing background");
        assert_eq!(preview.background_image(), None);
        assert_eq!(preview.image().as_raw(), before.as_raw());

        preview.set_font_size(40).expect("redraw after failed background");
        preview.set_text("still drawable").expect("set text");
        assert_eq!(preview.font_size(), 40);
    }

    #[test]
    fn literal_position_at_coordinate_limit_draws_nothing() {
        let mut preview = FontPreview::with_options(
            fixed_face(),
            PreviewOptions {
                text: "a\nb".to_string(),
                ..PreviewOptions::default()
            },
        );
        preview
            .set_text_position(Placement::from((0, i32::MAX)))
            .expect("place at limit");
        assert_eq!(preview.position(), Point::new(0, i32::MAX));
        assert!(preview.image().pixels().all(|pixel| pixel.0 == [255, 255, 255, 255]));

        preview
            .set_text_position(Placement::from((i32::MIN, i32::MIN)))
            .expect("place at lower limit");
        assert_eq!(preview.position(), Point::new(i32::MIN, i32::MIN));
    }

    #[test]
    fn save_writes_current_canvas() {
        let dir = temp_dir("preview-save");
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let preview = FontPreview::new(fixed_face());
        let path = dir.join("out.png");
        let written = preview.save(Some(path.as_path())).expect("save preview");
        assert_eq!(written, path);
        let reopened = image::open(&path).expect("reopen");
        assert_eq!((reopened.width(), reopened.height()), (700, 327));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn display_lists_font_and_layout() {
        let preview = FontPreview::new(fixed_face());
        assert_eq!(
            preview.to_string(),
            "font_name:Fixed Regular,font_size:64,text:a b c d e f,text_position:(174, 131),dimension:700x327"
        );
    }
}
