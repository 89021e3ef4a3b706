//! `embedded-graphics` mono fonts as `fontpreview` faces.
//!
//! Handy when no TrueType file is around: every ASCII mono font ships with
//! `embedded-graphics`, and larger sizes are reached by integer upscaling.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point as EgPoint, Size as EgSize},
    mono_font::{
        ascii::{
            FONT_10X20, FONT_4X6, FONT_5X8, FONT_6X10, FONT_6X12, FONT_6X13, FONT_6X13_BOLD,
            FONT_6X9, FONT_7X14, FONT_7X14_BOLD, FONT_9X15, FONT_9X15_BOLD, FONT_9X18,
            FONT_9X18_BOLD,
        },
        MonoFont, MonoTextStyle,
    },
    pixelcolor::{Rgb888, RgbColor},
    text::{renderer::TextRenderer, Baseline, Text},
    Drawable, Pixel,
};
use fontpreview::{BoundingBox, FontFace, FontName, Point};
use image::{Rgba, RgbaImage};
use std::borrow::Cow;
use std::convert::Infallible;
use std::rc::Rc;

/// `DrawTarget` writing into an RGBA canvas.
///
/// Each drawn pixel becomes a `scale x scale` block placed relative to
/// `offset`. Pixels outside the canvas are dropped.
pub struct ImageTarget<'a> {
    image: &'a mut RgbaImage,
    offset: Point,
    scale: u32,
    alpha: u8,
}

impl<'a> ImageTarget<'a> {
    pub fn new(image: &'a mut RgbaImage) -> Self {
        Self {
            image,
            offset: Point::new(0, 0),
            scale: 1,
            alpha: u8::MAX,
        }
    }

    pub fn with_transform(mut self, offset: Point, scale: u32) -> Self {
        self.offset = offset;
        self.scale = scale.max(1);
        self
    }

    pub fn with_alpha(mut self, alpha: u8) -> Self {
        self.alpha = alpha;
        self
    }
}

impl OriginDimensions for ImageTarget<'_> {
    fn size(&self) -> EgSize {
        EgSize::new(self.image.width(), self.image.height())
    }
}

impl DrawTarget for ImageTarget<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let scale = self.scale as i64;
        let width = self.image.width() as i64;
        let height = self.image.height() as i64;
        for Pixel(point, color) in pixels {
            let left = self.offset.x as i64 + point.x as i64 * scale;
            let top = self.offset.y as i64 + point.y as i64 * scale;
            let rgba = Rgba([color.r(), color.g(), color.b(), self.alpha]);
            for y in top.max(0)..(top + scale).min(height) {
                for x in left.max(0)..(left + scale).min(width) {
                    self.image.put_pixel(x as u32, y as u32, rgba);
                }
            }
        }
        Ok(())
    }
}

/// Stroke weight of a [`MonoFace`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MonoWeight {
    #[default]
    Regular,
    Bold,
}

impl MonoWeight {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "Regular",
            Self::Bold => "Bold",
        }
    }

    /// Fonts of this weight, shortest glyphs first.
    fn ladder(self) -> &'static [&'static MonoFont<'static>] {
        match self {
            Self::Regular => &[
                &FONT_4X6,
                &FONT_5X8,
                &FONT_6X9,
                &FONT_6X10,
                &FONT_6X12,
                &FONT_6X13,
                &FONT_7X14,
                &FONT_9X15,
                &FONT_9X18,
                &FONT_10X20,
            ],
            Self::Bold => &[
                &FONT_6X13_BOLD,
                &FONT_7X14_BOLD,
                &FONT_9X15_BOLD,
                &FONT_9X18_BOLD,
            ],
        }
    }
}

/// Bitmap font chosen for one requested size.
#[derive(Clone, Copy)]
struct Glyphs {
    font: &'static MonoFont<'static>,
    scale: u32,
}

impl Glyphs {
    fn cell_height(self) -> u32 {
        self.font.character_size.height.saturating_mul(self.scale)
    }
}

/// Face backed by the ASCII mono fonts of `embedded-graphics`.
///
/// A requested pixel size picks the tallest font that fits, then upscales it
/// by the largest whole factor that still fits. Sizes below the smallest
/// font use that font unscaled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonoFace {
    weight: MonoWeight,
}

impl MonoFace {
    pub fn new(weight: MonoWeight) -> Self {
        Self { weight }
    }

    pub fn weight(&self) -> MonoWeight {
        self.weight
    }

    /// Share the face for use in renderers.
    pub fn shared(self) -> Rc<dyn FontFace> {
        Rc::new(self)
    }

    fn select(&self, size: u32) -> Glyphs {
        let tallest_fitting = |ladder: &'static [&'static MonoFont<'static>]| {
            ladder
                .iter()
                .rev()
                .copied()
                .find(|font| font.character_size.height <= size)
        };
        let font = match tallest_fitting(self.weight.ladder()) {
            Some(font) => font,
            None => {
                if self.weight != MonoWeight::Regular {
                    log::debug!(
                        "no {} mono font fits {}px, using regular",
                        self.weight.as_str(),
                        size
                    );
                }
                tallest_fitting(MonoWeight::Regular.ladder()).unwrap_or(&FONT_4X6)
            }
        };
        let scale = (size / font.character_size.height.max(1)).max(1);
        Glyphs { font, scale }
    }
}

impl FontFace for MonoFace {
    fn name(&self) -> FontName {
        FontName::new("Mono", self.weight.as_str())
    }

    fn measure(&self, size: u32, line: &str) -> BoundingBox {
        let glyphs = self.select(size);
        let text = normalize_text_for_mono(line);
        let style = MonoTextStyle::new(glyphs.font, Rgb888::BLACK);
        let metrics = style.measure_string(&text, EgPoint::zero(), Baseline::Top);
        let cell = metrics.bounding_box.size;
        if cell.width == 0 {
            return BoundingBox::default();
        }
        BoundingBox::new(
            0,
            0,
            cell.width.saturating_mul(glyphs.scale) as i32,
            glyphs.cell_height() as i32,
        )
    }

    fn line_height(&self, size: u32) -> u32 {
        self.select(size).cell_height()
    }

    fn draw_line(
        &self,
        canvas: &mut RgbaImage,
        size: u32,
        origin: Point,
        line: &str,
        color: Rgba<u8>,
    ) {
        let glyphs = self.select(size);
        let text = normalize_text_for_mono(line);
        let [r, g, b, a] = color.0;
        let style = MonoTextStyle::new(glyphs.font, Rgb888::new(r, g, b));
        let mut target = ImageTarget::new(canvas)
            .with_transform(origin, glyphs.scale)
            .with_alpha(a);
        let drawn = Text::with_baseline(&text, EgPoint::zero(), style, Baseline::Top)
            .draw(&mut target);
        // ImageTarget cannot fail.
        if let Err(never) = drawn {
            match never {}
        }
    }
}

/// Map typographic punctuation to the ASCII the mono fonts can draw.
fn normalize_text_for_mono(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|ch| {
        matches!(
            ch,
            '\u{00A0}' // nbsp
                | '\u{2013}' // en dash
                | '\u{2014}' // em dash
                | '\u{2018}' // left single quote
                | '\u{2019}' // right single quote
                | '\u{201C}' // left double quote
                | '\u{201D}' // right double quote
                | '\u{2026}' // ellipsis
        )
    }) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{00A0}' => out.push(' '),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2026}' => out.push_str("..."),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}
