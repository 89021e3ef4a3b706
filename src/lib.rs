//! Layout and composition engine for font preview images.
//!
//! Renders sample text with a font face onto previews, banners and logos,
//! composes them into banded pages and booklets, and tiles them into walls.

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

mod banner;
mod booklet;
mod canvas;
mod color;
mod font;
mod geometry;
mod metrics;
mod page;
mod position;
mod preview;
mod template;
mod wall;

#[cfg(test)]
mod test_support;

pub use banner::{
    BannerMode, FontBanner, FontLogo, Orientation, OverlayId, LOGO_DEFAULT_SIZE,
};
pub use booklet::{BookletError, FontBooklet};
pub use canvas::ColorMode;
pub use color::{Color, ColorParseError};
pub use font::{BoundFont, FontError, FontFace, FontName, TrueTypeFace};
pub use geometry::{BoundingBox, Point, Size};
pub use metrics::{
    layout_lines, multiline_text_size, text_size, LineLayout, TextAlign, LINE_SPACING,
};
pub use page::{FontPage, PageError, PageSlot, Separator, SharedPage, LOGO_FALLBACK_SIZE};
pub use position::{resolve, Anchor, Placement};
pub use preview::{
    shared, FontPreview, PreviewOptions, Render, RenderError, RenderKind, SharedRender,
    FONT_SIZE_STEP, MIN_FONT_SIZE,
};
pub use template::{Band, BandSpec, PageTemplate, TemplateError};
pub use wall::{plan_wall, FontWall, WallLayout, WallMode};
