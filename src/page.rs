//! Page composition: header, optional logo, body and footer stacked per a template.

use core::fmt;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::banner::OverlayId;
use crate::canvas::{self, ColorMode};
use crate::color::Color;
use crate::geometry::{Point, Size};
use crate::position::Anchor;
use crate::preview::{RenderError, RenderKind, SharedRender};
use crate::template::{Band, PageTemplate};

/// Size a logo is reduced to when it does not fit its header.
pub const LOGO_FALLBACK_SIZE: Size = Size::new(75, 75);

const DEFAULT_DIMENSION: Size = Size::new(2480, 3508);
const DEFAULT_SAVE_NAME: &str = "fontpage.png";

/// Shared handle to a page, as stored in booklets.
pub type SharedPage = Rc<RefCell<FontPage>>;

/// Renderer slot on a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageSlot {
    Header,
    Logo,
    Body,
    Footer,
}

impl PageSlot {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Logo => "logo",
            Self::Body => "body",
            Self::Footer => "footer",
        }
    }
}

impl fmt::Display for PageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line drawn across the page at the band seams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Separator {
    pub color: Color,
    pub width: u32,
}

impl Default for Separator {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 5,
        }
    }
}

#[derive(Debug)]
pub enum PageError {
    KindMismatch {
        slot: PageSlot,
        expected: RenderKind,
        found: RenderKind,
    },
    MissingBand(Band),
    MissingHeader,
    Render(RenderError),
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KindMismatch {
                slot,
                expected,
                found,
            } => write!(f, "{} must be a {} renderer, not a {}", slot, expected, found),
            Self::MissingBand(band) => write!(f, "page has no {} renderer", band),
            Self::MissingHeader => write!(f, "a logo needs a header to sit on"),
            Self::Render(err) => write!(f, "render error: {}", err),
        }
    }
}

impl std::error::Error for PageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RenderError> for PageError {
    fn from(err: RenderError) -> Self {
        Self::Render(err)
    }
}

/// One composed page.
///
/// Renderers are shared, not owned: the same banner may sit in several slots
/// or on several pages. The page owns only its composed canvas.
#[derive(Debug)]
pub struct FontPage {
    template: Option<PageTemplate>,
    dimension: Size,
    header: Option<SharedRender>,
    logo: Option<SharedRender>,
    /// Overlay the logo occupies on the current header.
    logo_overlay: Option<OverlayId>,
    body: Option<SharedRender>,
    footer: Option<SharedRender>,
    canvas: RgbaImage,
}

impl Default for FontPage {
    fn default() -> Self {
        Self::with_dimension(DEFAULT_DIMENSION)
    }
}

impl FontPage {
    /// A4 at 300 dpi, no template.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimension(dimension: Size) -> Self {
        Self {
            template: None,
            dimension,
            header: None,
            logo: None,
            logo_overlay: None,
            body: None,
            footer: None,
            canvas: canvas::blank(dimension, Color::WHITE),
        }
    }

    /// Page whose height follows the template.
    pub fn with_template(template: PageTemplate) -> Self {
        let mut page =
            Self::with_dimension(Size::new(DEFAULT_DIMENSION.width, template.page_height()));
        page.template = Some(template);
        page
    }

    pub fn into_shared(self) -> SharedPage {
        Rc::new(RefCell::new(self))
    }

    pub fn template(&self) -> Option<&PageTemplate> {
        self.template.as_ref()
    }

    pub fn set_template(&mut self, template: PageTemplate) {
        self.dimension.height = template.page_height();
        self.template = Some(template);
    }

    pub fn dimension(&self) -> Size {
        self.dimension
    }

    /// Takes effect on the next [`FontPage::draw`]; renderers already assigned are refit then.
    pub fn set_dimension(&mut self, dimension: Size) {
        self.dimension = dimension;
    }

    pub fn header(&self) -> Option<&SharedRender> {
        self.header.as_ref()
    }

    pub fn logo(&self) -> Option<&SharedRender> {
        self.logo.as_ref()
    }

    pub fn body(&self) -> Option<&SharedRender> {
        self.body.as_ref()
    }

    pub fn footer(&self) -> Option<&SharedRender> {
        self.footer.as_ref()
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Header must be a banner so it can carry the logo.
    ///
    /// A logo already on the page moves from the old header to the new one.
    pub fn set_header(&mut self, header: SharedRender) -> Result<(), PageError> {
        expect_kind(PageSlot::Header, &header, RenderKind::Banner)?;
        self.fit_width(&header)?;
        let overlay = match &self.logo {
            Some(logo) => Some(attach_logo(&header, logo)?),
            None => None,
        };
        self.detach_logo()?;
        self.header = Some(header);
        self.logo_overlay = overlay;
        Ok(())
    }

    /// Overlay a logo on the header's left edge, replacing any previous logo.
    /// Requires a header.
    pub fn set_logo(&mut self, logo: SharedRender) -> Result<(), PageError> {
        expect_kind(PageSlot::Logo, &logo, RenderKind::Logo)?;
        let header = self.header.clone().ok_or(PageError::MissingHeader)?;
        let overlay = attach_logo(&header, &logo)?;
        self.detach_logo()?;
        self.logo = Some(logo);
        self.logo_overlay = Some(overlay);
        Ok(())
    }

    /// Take the current logo overlay off the current header.
    fn detach_logo(&mut self) -> Result<(), PageError> {
        let (Some(header), Some(overlay)) = (&self.header, self.logo_overlay) else {
            return Ok(());
        };
        if let Some(banner) = header.borrow_mut().as_banner_mut() {
            banner.remove_image(overlay)?;
        }
        self.logo_overlay = None;
        Ok(())
    }

    pub fn set_body(&mut self, body: SharedRender) -> Result<(), PageError> {
        self.fit_width(&body)?;
        self.body = Some(body);
        Ok(())
    }

    pub fn set_footer(&mut self, footer: SharedRender) -> Result<(), PageError> {
        self.fit_width(&footer)?;
        self.footer = Some(footer);
        Ok(())
    }

    fn fit_width(&self, renderer: &SharedRender) -> Result<(), RenderError> {
        let mut renderer = renderer.borrow_mut();
        let current = canvas::size_of(renderer.image());
        if current.width != self.dimension.width {
            renderer.set_dimension(Size::new(self.dimension.width, current.height))?;
        }
        Ok(())
    }

    /// Compose the page, rebuilding every band from its renderer.
    ///
    /// Each band is refit, redrawn and pasted before the next one is touched,
    /// so one renderer may fill several bands.
    pub fn draw(&mut self, separator: Option<Separator>) -> Result<(), PageError> {
        let bands = [
            (Band::Header, self.header.clone()),
            (Band::Body, self.body.clone()),
            (Band::Footer, self.footer.clone()),
        ];
        let mut renderers = Vec::with_capacity(bands.len());
        for (band, renderer) in bands {
            renderers.push((band, renderer.ok_or(PageError::MissingBand(band))?));
        }

        let template = self
            .template
            .clone()
            .unwrap_or_else(|| PageTemplate::for_height(self.dimension.height));
        let width = self.dimension.width;
        self.dimension = Size::new(width, template.page_height());
        self.canvas = canvas::blank(self.dimension, Color::WHITE);

        let mut top = 0i32;
        let mut seams = Vec::with_capacity(2);
        for (band, renderer) in renderers {
            let spec = template.band(band);
            let mut renderer = renderer.borrow_mut();
            let target = Size::new(width, spec.height);
            if canvas::size_of(renderer.image()) != target {
                renderer.set_dimension(target)?;
            }
            renderer.set_font_size(spec.font_size)?;
            renderer.set_text_position(spec.placement)?;
            canvas::paste(&mut self.canvas, renderer.image(), Point::new(0, top));
            top = top.saturating_add(renderer.image().height() as i32);
            if band != Band::Footer {
                seams.push(top);
            }
        }

        if let Some(separator) = separator {
            for y in seams {
                canvas::draw_hline(&mut self.canvas, y, separator.width, separator.color);
            }
        }
        log::debug!("composed page {} with {}", self.dimension, template);
        Ok(())
    }

    /// Defaults to `fontpage.png` in the working directory.
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
        canvas::show(&self.canvas, ColorMode::Rgb, "fontpage").map_err(RenderError::Show)
    }
}

/// Shrink `logo` when it does not fit `header`, then overlay it at the left edge.
fn attach_logo(header: &SharedRender, logo: &SharedRender) -> Result<OverlayId, PageError> {
    let header_size = canvas::size_of(header.borrow().image());
    {
        let mut renderer = logo.borrow_mut();
        let logo_size = canvas::size_of(renderer.image());
        if header_size.is_exceeded_by(logo_size) {
            log::debug!(
                "logo {} does not fit header {}, shrinking to {}",
                logo_size,
                header_size,
                LOGO_FALLBACK_SIZE
            );
            renderer.set_dimension(LOGO_FALLBACK_SIZE)?;
        }
    }

    let mut header_ref = header.borrow_mut();
    let found = header_ref.kind();
    let banner = header_ref
        .as_banner_mut()
        .ok_or(PageError::KindMismatch {
            slot: PageSlot::Header,
            expected: RenderKind::Banner,
            found,
        })?;
    let overlay = banner.add_image(&*logo.borrow(), Anchor::LeftCenter)?;
    Ok(overlay)
}

fn expect_kind(
    slot: PageSlot,
    renderer: &SharedRender,
    expected: RenderKind,
) -> Result<(), PageError> {
    let found = renderer.borrow().kind();
    if found == expected {
        Ok(())
    } else {
        Err(PageError::KindMismatch {
            slot,
            expected,
            found,
        })
    }
}

fn describe(slot: &Option<SharedRender>) -> String {
    match slot {
        Some(renderer) => match renderer.try_borrow() {
            Ok(renderer) => renderer.preview().to_string(),
            Err(_) => "<in use>".to_string(),
        },
        None => "None".to_string(),
    }
}

impl fmt::Display for FontPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "header={}, body={}, footer={}",
            describe(&self.header),
            describe(&self.body),
            describe(&self.footer)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::{FontBanner, FontLogo};
    use crate::preview::{shared, FontPreview, Render};
    use crate::test_support::fixed_face;
    use image::Rgba;

    fn small_page() -> FontPage {
        let template = PageTemplate::new(600, 6).expect("valid template");
        let mut page = FontPage::with_template(template);
        page.set_dimension(Size::new(800, 600));
        page
    }

    fn red_logo() -> FontLogo {
        let mut logo = FontLogo::new(fixed_face(), "");
        logo.set_colors(Color::BLACK, Color::rgb(255, 0, 0))
            .expect("recolor logo");
        logo
    }

    #[test]
    fn draw_requires_all_bands() {
        let mut page = FontPage::new();
        let err = page.draw(None).expect_err("empty page");
        assert!(matches!(err, PageError::MissingBand(Band::Header)));

        page.set_header(shared(FontBanner::new(fixed_face())))
            .expect("header");
        page.set_footer(shared(FontPreview::new(fixed_face())))
            .expect("footer");
        let err = page.draw(None).expect_err("no body");
        assert!(matches!(err, PageError::MissingBand(Band::Body)));
        assert_eq!(page.canvas().dimensions(), (2480, 3508));
    }

    #[test]
    fn header_and_logo_slots_check_kind() {
        let mut page = FontPage::new();
        let err = page
            .set_header(shared(FontPreview::new(fixed_face())))
            .expect_err("preview is not a banner");
        assert!(matches!(
            err,
            PageError::KindMismatch {
                slot: PageSlot::Header,
                expected: RenderKind::Banner,
                found: RenderKind::Preview
            }
        ));

        let err = page
            .set_logo(shared(FontLogo::new(fixed_face(), "Fl")))
            .expect_err("logo without header");
        assert!(matches!(err, PageError::MissingHeader));

        page.set_header(shared(FontBanner::new(fixed_face())))
            .expect("header");
        let err = page
            .set_logo(shared(FontBanner::new(fixed_face())))
            .expect_err("banner is not a logo");
        assert!(matches!(err, PageError::KindMismatch { slot: PageSlot::Logo, .. }));
    }

    #[test]
    fn assigned_renderers_are_refit_to_page_width() {
        let mut page = FontPage::new();
        let body = shared(FontPreview::new(fixed_face()));
        page.set_body(body.clone()).expect("body");
        assert_eq!(body.borrow().image().dimensions(), (2480, 327));
    }

    #[test]
    fn bands_stack_with_template_heights() {
        let mut page = small_page();
        let header = shared(FontBanner::new(fixed_face()));
        let body = shared(FontPreview::new(fixed_face()));
        let footer = shared(FontPreview::new(fixed_face()));
        page.set_header(header.clone()).expect("header");
        page.set_body(body.clone()).expect("body");
        page.set_footer(footer.clone()).expect("footer");
        page.draw(None).expect("draw page");

        assert_eq!(page.canvas().dimensions(), (800, 600));
        assert_eq!(header.borrow().image().dimensions(), (800, 100));
        assert_eq!(body.borrow().image().dimensions(), (800, 300));
        assert_eq!(footer.borrow().image().dimensions(), (800, 200));
        // The template font sizes do not fit; each band shrinks to its height.
        assert!(header.borrow().preview().font_size() <= 100);
        assert_eq!(body.borrow().preview().font_size(), 140);
    }

    #[test]
    fn separators_mark_band_seams() {
        let mut page = small_page();
        let renderer = shared(FontBanner::with_options(
            fixed_face(),
            crate::banner::Orientation::Landscape,
            crate::banner::BannerMode::Blank,
            Default::default(),
        ));
        page.set_header(renderer.clone()).expect("header");
        page.set_body(renderer.clone()).expect("body");
        page.set_footer(renderer).expect("footer");
        page.draw(Some(Separator::default())).expect("draw page");

        let black = Rgba([0, 0, 0, 255]);
        assert_eq!(*page.canvas().get_pixel(10, 100), black);
        assert_eq!(*page.canvas().get_pixel(10, 400), black);
        assert_ne!(*page.canvas().get_pixel(10, 250), black);
    }

    #[test]
    fn one_renderer_can_fill_every_band() {
        let mut page = small_page();
        let banner = shared(FontBanner::new(fixed_face()));
        page.set_header(banner.clone()).expect("header");
        page.set_body(banner.clone()).expect("body");
        page.set_footer(banner.clone()).expect("footer");
        page.draw(None).expect("draw aliased page");

        // Header band keeps the header-sized rendering.
        let header_text = page.canvas().get_pixel(400, 50);
        assert_eq!(*header_text, Rgba([0, 0, 0, 255]));
        assert_eq!(banner.borrow().image().dimensions(), (800, 200));
    }

    #[test]
    fn draw_is_idempotent() {
        let mut page = small_page();
        page.set_header(shared(FontBanner::new(fixed_face())))
            .expect("header");
        page.set_logo(shared(red_logo())).expect("logo");
        page.set_body(shared(FontPreview::new(fixed_face())))
            .expect("body");
        page.set_footer(shared(FontPreview::new(fixed_face())))
            .expect("footer");

        page.draw(Some(Separator::default())).expect("first draw");
        let first = page.canvas().clone();
        page.draw(Some(Separator::default())).expect("second draw");
        assert_eq!(page.canvas().as_raw(), first.as_raw());
    }

    #[test]
    fn second_logo_replaces_the_first() {
        let mut page = small_page();
        let header = shared(FontBanner::new(fixed_face()));
        page.set_header(header.clone()).expect("header");
        page.set_logo(shared(red_logo())).expect("first logo");

        let mut green = FontLogo::new(fixed_face(), "");
        green
            .set_colors(Color::BLACK, Color::rgb(0, 255, 0))
            .expect("recolor logo");
        let green = shared(green);
        page.set_logo(green.clone()).expect("second logo");

        assert_eq!(header.borrow().overlay_count(), 1);
        assert!(Rc::ptr_eq(
            page.logo().expect("logo slot"),
            &(green as SharedRender)
        ));
        let banner = header.borrow();
        let y = banner.image().height() / 2;
        assert_eq!(*banner.image().get_pixel(0, y), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn new_header_takes_over_the_logo() {
        let mut page = small_page();
        let old_header = shared(FontBanner::new(fixed_face()));
        page.set_header(old_header.clone()).expect("header");
        page.set_logo(shared(red_logo())).expect("logo");
        assert_eq!(old_header.borrow().overlay_count(), 1);

        let new_header = shared(FontBanner::new(fixed_face()));
        page.set_header(new_header.clone()).expect("replace header");
        assert!(page.logo().is_some());
        assert_eq!(old_header.borrow().overlay_count(), 0);
        assert_eq!(new_header.borrow().overlay_count(), 1);
        // Landscape height 560, so the 100px logo is centered at y = 230.
        assert_eq!(
            *new_header.borrow().image().get_pixel(0, 230),
            Rgba([255, 0, 0, 255])
        );

        page.set_header(new_header.clone()).expect("same header again");
        assert_eq!(new_header.borrow().overlay_count(), 1);
    }

    #[test]
    fn logo_lands_on_header_left_edge() {
        let mut page = small_page();
        let header = shared(FontBanner::new(fixed_face()));
        page.set_header(header.clone()).expect("header");
        let logo = shared(red_logo());
        page.set_logo(logo.clone()).expect("logo");
        page.set_body(shared(FontPreview::new(fixed_face())))
            .expect("body");
        page.set_footer(shared(FontPreview::new(fixed_face())))
            .expect("footer");
        page.draw(None).expect("draw page");

        // The header band is 100px tall; the 100px logo fills it at x = 0.
        assert_eq!(logo.borrow().image().dimensions(), (100, 100));
        assert_eq!(*page.canvas().get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*page.canvas().get_pixel(99, 99), Rgba([255, 0, 0, 255]));
        assert!(page.logo().is_some());
    }

    #[test]
    fn oversized_logo_falls_back_to_small_square() {
        let mut page = FontPage::new();
        let header = shared(FontBanner::new(fixed_face()));
        page.set_header(header).expect("header");
        let logo = shared(FontLogo::new(fixed_face(), "Fl"));
        logo.borrow_mut()
            .new_size(Size::new(700, 700))
            .expect("grow logo");
        page.set_logo(logo.clone()).expect("logo");
        assert_eq!(logo.borrow().image().dimensions(), (75, 75));
    }

    #[test]
    fn display_lists_bands() {
        let mut page = FontPage::new();
        assert_eq!(page.to_string(), "header=None, body=None, footer=None");
        page.set_body(shared(FontPreview::new(fixed_face())))
            .expect("body");
        assert!(page.to_string().contains("body=font_name:Fixed Regular"));
    }
}
