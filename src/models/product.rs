use crate::error::UnsupportedProductError;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Diverging red to green ramp used for NDVI.
pub const NDVI_PALETTE: [&str; 8] = [
    "#d73027", "#f46d43", "#fdae61", "#fee08b", "#d9ef8b", "#a6d96a", "#66bd63", "#1a9850",
];

/// ESA WorldCover class codes, in palette order.
pub const WORLDCOVER_CLASSES: [u16; 11] = [10, 20, 30, 40, 50, 60, 70, 80, 90, 95, 100];

/// One colour per WorldCover class: tree cover, shrubland, grassland,
/// cropland, built-up, bare, snow/ice, water, wetland, mangroves, moss.
pub const LAND_COVER_PALETTE: [&str; 11] = [
    "#006400", "#ffbb22", "#ffff4c", "#f096ff", "#fa0000", "#b4b4b4", "#f0f0f0", "#0064c8",
    "#0096a0", "#00cf75", "#fae6a0",
];

/// Maximum cloudy pixel percentage for scenes entering the NDVI composite.
pub const NDVI_CLOUD_PERCENTAGE: f64 = 20.0;

const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid calendar date"),
    }
}

/// Window used when an NDVI request carries no dates.
pub const NDVI_DEFAULT_START: NaiveDate = ymd(2023, 1, 1);
pub const NDVI_DEFAULT_END: NaiveDate = ymd(2025, 2, 20);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Product {
    Ndvi,
    LandCover,
}

/// Where the pixels come from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ImageSource {
    /// A filtered, cloud-screened median composite of a collection.
    Composite {
        collection: &'static str,
        cloud_property: &'static str,
        max_cloud_percentage: f64,
    },
    /// A single static image.
    Image { id: &'static str },
}

/// How the output band is derived from the source bands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BandExpression {
    /// `(nir - red) / (nir + red)`, renamed to `output`.
    NormalizedDifference {
        nir: &'static str,
        red: &'static str,
        output: &'static str,
    },
    /// Class codes read from one band and remapped to palette indices
    /// `0..classes.len()`.
    ClassLookup {
        band: &'static str,
        classes: &'static [u16],
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Visualization {
    pub min: f64,
    pub max: f64,
    pub palette: Vec<String>,
}

impl Product {
    pub const ALL: [Product; 2] = [Product::Ndvi, Product::LandCover];

    pub fn label(&self) -> &'static str {
        match self {
            Product::Ndvi => "NDVI",
            Product::LandCover => "Land Cover",
        }
    }

    pub fn source(&self) -> ImageSource {
        match self {
            Product::Ndvi => ImageSource::Composite {
                collection: "COPERNICUS/S2_SR_HARMONIZED",
                cloud_property: "CLOUDY_PIXEL_PERCENTAGE",
                max_cloud_percentage: NDVI_CLOUD_PERCENTAGE,
            },
            Product::LandCover => ImageSource::Image {
                id: "ESA/WorldCover/v200",
            },
        }
    }

    pub fn band_expression(&self) -> BandExpression {
        match self {
            Product::Ndvi => BandExpression::NormalizedDifference {
                nir: "B8",
                red: "B4",
                output: "NDVI",
            },
            Product::LandCover => BandExpression::ClassLookup {
                band: "Map",
                classes: &WORLDCOVER_CLASSES,
            },
        }
    }

    pub fn visualization(&self) -> Visualization {
        let (min, max, palette): (f64, f64, &[&str]) = match self {
            Product::Ndvi => (-1.0, 1.0, &NDVI_PALETTE[..]),
            Product::LandCover => (
                0.0,
                (WORLDCOVER_CLASSES.len() - 1) as f64,
                &LAND_COVER_PALETTE[..],
            ),
        };
        Visualization {
            min,
            max,
            palette: palette.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Whether the product is filtered by acquisition date.
    pub fn is_temporal(&self) -> bool {
        matches!(self, Product::Ndvi)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Product {
    type Err = UnsupportedProductError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "ndvi" => Ok(Product::Ndvi),
            "land_cover" | "landcover" => Ok(Product::LandCover),
            _ => Err(UnsupportedProductError(s.to_string())),
        }
    }
}
