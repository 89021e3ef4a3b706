#![allow(dead_code)]

use fontpreview::{BoundingBox, FontFace, FontName, Point};

pub mod faces;
pub mod fixtures;
