use super::{BoundingBox, FontFace, FontName, Point};
use image::{Rgba, RgbaImage};
use std::rc::Rc;

/// Every glyph is a solid block `size / 2` wide and `size` tall.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedFace;

impl FixedFace {
    pub fn glyph_width(size: u32) -> u32 {
        (size / 2).max(1)
    }
}

impl FontFace for FixedFace {
    fn name(&self) -> FontName {
        FontName::new("Fixed", "Regular")
    }

    fn measure(&self, size: u32, line: &str) -> BoundingBox {
        let chars = line.chars().count() as i32;
        if chars == 0 {
            return BoundingBox::default();
        }
        BoundingBox::new(0, 0, chars * Self::glyph_width(size) as i32, size as i32)
    }

    fn line_height(&self, size: u32) -> u32 {
        size
    }

    fn draw_line(&self, canvas: &mut RgbaImage, size: u32, origin: Point, line: &str, color: Rgba<u8>) {
        let bbox = self.measure(size, line).translate(origin.x, origin.y);
        for y in bbox.top.max(0)..bbox.bottom.min(canvas.height() as i32) {
            for x in bbox.left.max(0)..bbox.right.min(canvas.width() as i32) {
                canvas.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

pub fn fixed_face() -> Rc<dyn FontFace> {
    Rc::new(FixedFace)
}
