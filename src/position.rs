use core::fmt;
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Size};

/// Named placement of content inside a container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    #[default]
    Center,
    Top,
    Below,
    #[serde(rename = "rcenter")]
    RightCenter,
    #[serde(rename = "rtop")]
    RightTop,
    #[serde(rename = "rbelow")]
    RightBelow,
    #[serde(rename = "lcenter")]
    LeftCenter,
    #[serde(rename = "ltop")]
    LeftTop,
    #[serde(rename = "lbelow")]
    LeftBelow,
}

#[derive(Clone, Copy)]
enum Axis {
    Start,
    Middle,
    End,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Self::Center,
        Self::Top,
        Self::Below,
        Self::RightCenter,
        Self::RightTop,
        Self::RightBelow,
        Self::LeftCenter,
        Self::LeftTop,
        Self::LeftBelow,
    ];

    /// Canonical short name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Top => "top",
            Self::Below => "below",
            Self::RightCenter => "rcenter",
            Self::RightTop => "rtop",
            Self::RightBelow => "rbelow",
            Self::LeftCenter => "lcenter",
            Self::LeftTop => "ltop",
            Self::LeftBelow => "lbelow",
        }
    }

    /// Parse a canonical short name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|anchor| anchor.as_str() == name.trim())
    }

    fn axes(self) -> (Axis, Axis) {
        match self {
            Self::Center => (Axis::Middle, Axis::Middle),
            Self::Top => (Axis::Middle, Axis::Start),
            Self::Below => (Axis::Middle, Axis::End),
            Self::RightCenter => (Axis::End, Axis::Middle),
            Self::RightTop => (Axis::End, Axis::Start),
            Self::RightBelow => (Axis::End, Axis::End),
            Self::LeftCenter => (Axis::Start, Axis::Middle),
            Self::LeftTop => (Axis::Start, Axis::Start),
            Self::LeftBelow => (Axis::Start, Axis::End),
        }
    }

    /// Top-left coordinate of `content` placed inside `container`.
    pub fn place(self, container: Size, content: Size) -> Point {
        let (horizontal, vertical) = self.axes();
        Point::new(
            axis_offset(horizontal, container.width, content.width),
            axis_offset(vertical, container.height, content.height),
        )
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Floor division: overflowing content is pushed up/left, never truncated toward zero.
fn axis_offset(axis: Axis, container: u32, content: u32) -> i32 {
    let free = container as i64 - content as i64;
    let offset = match axis {
        Axis::Start => 0,
        Axis::Middle => free.div_euclid(2),
        Axis::End => free,
    };
    offset.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Either a symbolic anchor or an absolute coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Anchor(Anchor),
    Literal(Point),
}

impl Default for Placement {
    fn default() -> Self {
        Self::Anchor(Anchor::Center)
    }
}

impl Placement {
    pub fn is_anchor(&self) -> bool {
        matches!(self, Self::Anchor(_))
    }
}

impl From<Anchor> for Placement {
    fn from(value: Anchor) -> Self {
        Self::Anchor(value)
    }
}

impl From<Point> for Placement {
    fn from(value: Point) -> Self {
        Self::Literal(value)
    }
}

impl From<(i32, i32)> for Placement {
    fn from(value: (i32, i32)) -> Self {
        Self::Literal(value.into())
    }
}

impl From<&str> for Placement {
    fn from(value: &str) -> Self {
        match Anchor::parse(value) {
            Some(anchor) => Self::Anchor(anchor),
            None => {
                log::debug!("unknown anchor {:?}, placing at center", value);
                Self::Anchor(Anchor::Center)
            }
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anchor(anchor) => write!(f, "{anchor}"),
            Self::Literal(point) => write!(f, "{point}"),
        }
    }
}

/// Resolve a placement to the top-left coordinate of `content` inside `container`.
pub fn resolve(placement: Placement, container: Size, content: Size) -> Point {
    match placement {
        Placement::Literal(point) => point,
        Placement::Anchor(anchor) => anchor.place(container, content),
    }
}
