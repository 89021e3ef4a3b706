//! Fixtures shared with the integration tests under `tests/common`.

use crate::font::{FontFace, FontName};
use crate::geometry::{BoundingBox, Point};

#[path = "../tests/common/faces.rs"]
mod faces;
#[path = "../tests/common/fixtures.rs"]
mod fixtures;

pub use faces::{fixed_face, FixedFace};
pub use fixtures::{system_font, temp_dir};
