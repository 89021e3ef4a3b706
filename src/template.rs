//! Vertical page partition into header, body and footer bands.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::position::{Anchor, Placement};

const DEFAULT_PAGE_HEIGHT: u32 = 3508;
const DEFAULT_UNITS_NUMBER: u32 = 6;

/// One of the three horizontal bands of a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Header,
    Body,
    Footer,
}

impl Band {
    /// Top-to-bottom order used when composing a page.
    pub const ALL: [Band; 3] = [Band::Header, Band::Body, Band::Footer];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Body => "body",
            Self::Footer => "footer",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Font size, pixel height and text placement of one band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BandSpec {
    pub font_size: u32,
    pub height: u32,
    pub placement: Placement,
}

/// Error returned when a template cannot be built or updated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateError {
    InvalidUnitsNumber,
    /// `unit` is not `page_height / units_number`.
    UnitMismatch {
        unit: u32,
        expected: u32,
    },
    /// A band height that is not a whole number of units.
    PartialUnit {
        band: Band,
        height: u32,
        unit: u32,
    },
    UnitsExceeded {
        band: Band,
        total: u64,
        page_height: u32,
    },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUnitsNumber => write!(f, "units number must be greater than zero"),
            Self::UnitMismatch { unit, expected } => {
                write!(f, "unit is {}px but the page divides into {}px units", unit, expected)
            }
            Self::PartialUnit { band, height, unit } => write!(
                f,
                "{} is {}px tall, not a whole number of {}px units",
                band, height, unit
            ),
            Self::UnitsExceeded {
                band,
                total,
                page_height,
            } => write!(
                f,
                "{} update makes the bands {}px tall, exceeding the page height {}px",
                band, total, page_height
            ),
        }
    }
}

impl std::error::Error for TemplateError {}

/// Sizing rules for a [`crate::FontPage`].
///
/// The page height is divided into `units_number` equal units; each band is a
/// whole number of units tall. The three bands never add up to more than the
/// page height: updates that would break this are rejected without touching
/// any band.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageTemplate")]
pub struct PageTemplate {
    page_height: u32,
    units_number: u32,
    unit: u32,
    header: BandSpec,
    body: BandSpec,
    footer: BandSpec,
}

impl PageTemplate {
    /// Template with the default 1/3/2 unit split.
    pub fn new(page_height: u32, units_number: u32) -> Result<Self, TemplateError> {
        if units_number == 0 {
            return Err(TemplateError::InvalidUnitsNumber);
        }
        let template = Self::layout(page_height, units_number);
        let total = template.total_height();
        if total > page_height as u64 {
            return Err(TemplateError::UnitsExceeded {
                band: Band::Header,
                total,
                page_height,
            });
        }
        Ok(template)
    }

    /// Template split into six units, which always fits.
    pub fn for_height(page_height: u32) -> Self {
        Self::layout(page_height, DEFAULT_UNITS_NUMBER)
    }

    fn layout(page_height: u32, units_number: u32) -> Self {
        let unit = page_height / units_number;
        let centered = Placement::Anchor(Anchor::Center);
        Self {
            page_height,
            units_number,
            unit,
            header: BandSpec {
                font_size: 120,
                height: unit,
                placement: centered,
            },
            body: BandSpec {
                font_size: 140,
                height: unit.saturating_mul(3),
                placement: centered,
            },
            footer: BandSpec {
                font_size: 120,
                height: unit.saturating_mul(2),
                placement: centered,
            },
        }
    }

    pub fn page_height(&self) -> u32 {
        self.page_height
    }

    pub fn units_number(&self) -> u32 {
        self.units_number
    }

    pub fn unit(&self) -> u32 {
        self.unit
    }

    pub fn band(&self, band: Band) -> &BandSpec {
        match band {
            Band::Header => &self.header,
            Band::Body => &self.body,
            Band::Footer => &self.footer,
        }
    }

    pub fn header(&self) -> &BandSpec {
        &self.header
    }

    pub fn body(&self) -> &BandSpec {
        &self.body
    }

    pub fn footer(&self) -> &BandSpec {
        &self.footer
    }

    /// Sum of the three band heights.
    pub fn total_height(&self) -> u64 {
        Band::ALL
            .iter()
            .map(|band| self.band(*band).height as u64)
            .sum()
    }

    fn total_with(&self, band: Band, height: u64) -> u64 {
        Band::ALL
            .iter()
            .map(|candidate| {
                if *candidate == band {
                    height
                } else {
                    self.band(*candidate).height as u64
                }
            })
            .sum()
    }

    /// Resize and restyle one band to `units` units.
    pub fn set_band(
        &mut self,
        band: Band,
        font_size: u32,
        units: u32,
        placement: impl Into<Placement>,
    ) -> Result<(), TemplateError> {
        let page_height = self.page_height;
        let height = self.unit as u64 * units as u64;
        let total = self.total_with(band, height);
        if total > page_height as u64 {
            log::warn!(
                "rejected {} of {} units: bands would be {}px on a {}px page",
                band,
                units,
                total,
                page_height
            );
            return Err(TemplateError::UnitsExceeded {
                band,
                total,
                page_height,
            });
        }

        let spec = match band {
            Band::Header => &mut self.header,
            Band::Body => &mut self.body,
            Band::Footer => &mut self.footer,
        };
        *spec = BandSpec {
            font_size,
            height: height as u32,
            placement: placement.into(),
        };
        log::debug!("template {} set to {:?}", band, spec);
        Ok(())
    }

    pub fn set_header(
        &mut self,
        font_size: u32,
        units: u32,
        placement: impl Into<Placement>,
    ) -> Result<(), TemplateError> {
        self.set_band(Band::Header, font_size, units, placement)
    }

    pub fn set_body(
        &mut self,
        font_size: u32,
        units: u32,
        placement: impl Into<Placement>,
    ) -> Result<(), TemplateError> {
        self.set_band(Band::Body, font_size, units, placement)
    }

    pub fn set_footer(
        &mut self,
        font_size: u32,
        units: u32,
        placement: impl Into<Placement>,
    ) -> Result<(), TemplateError> {
        self.set_band(Band::Footer, font_size, units, placement)
    }
}

/// Unchecked wire form of [`PageTemplate`].
#[derive(Deserialize)]
struct RawPageTemplate {
    page_height: u32,
    units_number: u32,
    unit: u32,
    header: BandSpec,
    body: BandSpec,
    footer: BandSpec,
}

impl TryFrom<RawPageTemplate> for PageTemplate {
    type Error = TemplateError;

    fn try_from(raw: RawPageTemplate) -> Result<Self, Self::Error> {
        if raw.units_number == 0 {
            return Err(TemplateError::InvalidUnitsNumber);
        }
        let expected = raw.page_height / raw.units_number;
        if raw.unit != expected {
            return Err(TemplateError::UnitMismatch {
                unit: raw.unit,
                expected,
            });
        }
        let template = Self {
            page_height: raw.page_height,
            units_number: raw.units_number,
            unit: raw.unit,
            header: raw.header,
            body: raw.body,
            footer: raw.footer,
        };

        let mut total = 0u64;
        for band in Band::ALL {
            let height = template.band(band).height;
            let whole = match height.checked_rem(template.unit) {
                Some(rest) => rest == 0,
                None => height == 0,
            };
            if !whole {
                return Err(TemplateError::PartialUnit {
                    band,
                    height,
                    unit: template.unit,
                });
            }
            total += height as u64;
            if total > template.page_height as u64 {
                return Err(TemplateError::UnitsExceeded {
                    band,
                    total: template.total_height(),
                    page_height: template.page_height,
                });
            }
        }
        Ok(template)
    }
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self::for_height(DEFAULT_PAGE_HEIGHT)
    }
}

impl fmt::Display for PageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page_height={}, unit={}", self.page_height, self.unit)
    }
}
