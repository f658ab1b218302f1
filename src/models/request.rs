use crate::error::{ApiError, ValidationError};
use crate::models::geometry::BoundingBox;
use crate::models::product::{
    BandExpression, ImageSource, NDVI_DEFAULT_END, NDVI_DEFAULT_START, Product, Visualization,
};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Ground resolution used when the request does not name one.
pub const DEFAULT_SCALE_METERS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedDateRange {
                start: start.format(DATE_FORMAT).to_string(),
                end: end.format(DATE_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start_str(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputFormat {
    Png,
    TileReference,
}

impl OutputFormat {
    fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "tile" | "tiles" | "tile_reference" | "map" => Ok(OutputFormat::TileReference),
            _ => Err(ValidationError::InvalidOutputFormat(s.to_string())),
        }
    }
}

/// Optional knobs a client may set alongside the bounding box.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOverrides {
    pub date_range: Option<DateRange>,
    pub scale_meters: Option<u32>,
    pub output_format: Option<OutputFormat>,
}

impl RequestOverrides {
    /// Read `startDate`, `endDate`, `scale` and `outputFormat` from a payload.
    ///
    /// Dates only count when both are present; a lone date is ignored.
    pub fn from_payload(payload: &Value) -> Result<Self, ValidationError> {
        let start = date_field(payload, "startDate")?;
        let end = date_field(payload, "endDate")?;
        let date_range = match (start, end) {
            (Some(s), Some(e)) => Some(DateRange::parse(s, e)?),
            _ => None,
        };

        let scale_meters = match payload.get("scale") {
            None | Some(Value::Null) => None,
            Some(v) => Some(parse_scale(v)?),
        };

        let output_format = match payload.get("outputFormat") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(OutputFormat::parse(s)?),
            Some(other) => return Err(ValidationError::InvalidOutputFormat(other.to_string())),
        };

        Ok(Self {
            date_range,
            scale_meters,
            output_format,
        })
    }
}

/// A date member: absent, null and blank are "not given"; any non-string
/// value is rejected.
fn date_field<'a>(payload: &'a Value, key: &str) -> Result<Option<&'a str>, ValidationError> {
    match payload.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(ValidationError::InvalidDate(other.to_string())),
    }
}

fn parse_scale(v: &Value) -> Result<u32, ValidationError> {
    let scale = match v {
        Value::Number(n) => match n.as_u64() {
            Some(u) => Some(u),
            None => n.as_f64().filter(|f| f.fract() == 0.0 && *f > 0.0).map(|f| f as u64),
        },
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    scale
        .filter(|s| *s > 0)
        .and_then(|s| u32::try_from(s).ok())
        .ok_or(ValidationError::InvalidScale)
}

/// Everything the gateway needs to answer one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageProductRequest {
    pub product: Product,
    pub bounding_box: BoundingBox,
    pub date_range: Option<DateRange>,
    pub output_format: OutputFormat,
    pub scale_meters: u32,
    pub source: ImageSource,
    pub band_expression: BandExpression,
    pub visualization: Visualization,
}

impl ImageProductRequest {
    /// Resolve a product selector and build its request.
    pub fn build(
        bounding_box: BoundingBox,
        selector: &str,
        default_format: OutputFormat,
        overrides: RequestOverrides,
    ) -> Result<Self, ApiError> {
        let product: Product = selector.parse()?;
        Ok(Self::for_product(
            bounding_box,
            product,
            default_format,
            overrides,
        ))
    }

    /// Apply product defaults, then any overrides.
    pub fn for_product(
        bounding_box: BoundingBox,
        product: Product,
        default_format: OutputFormat,
        overrides: RequestOverrides,
    ) -> Self {
        let date_range = if product.is_temporal() {
            Some(overrides.date_range.unwrap_or_else(ndvi_default_window))
        } else {
            None
        };

        Self {
            product,
            bounding_box,
            date_range,
            output_format: overrides.output_format.unwrap_or(default_format),
            scale_meters: overrides.scale_meters.unwrap_or(DEFAULT_SCALE_METERS),
            source: product.source(),
            band_expression: product.band_expression(),
            visualization: product.visualization(),
        }
    }
}

fn ndvi_default_window() -> DateRange {
    DateRange {
        start: NDVI_DEFAULT_START,
        end: NDVI_DEFAULT_END,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnsupportedProductError;
    use crate::models::product::{LAND_COVER_PALETTE, NDVI_PALETTE};
    use serde_json::json;

    fn ethiopia() -> BoundingBox {
        BoundingBox::new(38.0, 13.0, 39.0, 14.0).unwrap()
    }

    #[test]
    fn test_ndvi_defaults() {
        let req = ImageProductRequest::build(
            ethiopia(),
            "ndvi",
            OutputFormat::Png,
            RequestOverrides::default(),
        )
        .unwrap();

        let window = req.date_range.unwrap();
        assert_eq!(window.start_str(), "2023-01-01");
        assert_eq!(window.end_str(), "2025-02-20");
        assert_eq!(req.visualization.palette, NDVI_PALETTE.to_vec());
        assert_eq!(req.visualization.palette.len(), 8);
        assert_eq!(
            req.band_expression,
            BandExpression::NormalizedDifference {
                nir: "B8",
                red: "B4",
                output: "NDVI"
            }
        );
        assert_eq!(req.scale_meters, DEFAULT_SCALE_METERS);
        assert_eq!(req.output_format, OutputFormat::Png);
    }

    #[test]
    fn test_land_cover_defaults() {
        let req = ImageProductRequest::build(
            ethiopia(),
            "land_cover",
            OutputFormat::TileReference,
            RequestOverrides::default(),
        )
        .unwrap();
        assert_eq!(req.date_range, None);
        assert_eq!(req.visualization.palette, LAND_COVER_PALETTE.to_vec());
        assert_eq!(req.output_format, OutputFormat::TileReference);
        assert!(matches!(req.source, ImageSource::Image { id: "ESA/WorldCover/v200" }));
    }

    #[test]
    fn test_unknown_product() {
        let err = ImageProductRequest::build(
            ethiopia(),
            "elevation",
            OutputFormat::Png,
            RequestOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ApiError::UnsupportedProduct(UnsupportedProductError(ref s)) if s == "elevation"
        ));
    }

    #[test]
    fn test_overrides_from_payload() {
        let o = RequestOverrides::from_payload(&json!({
            "startDate": "2024-03-01",
            "endDate": "2024-06-30",
            "scale": "30",
            "outputFormat": "tile"
        }))
        .unwrap();
        let range = o.date_range.unwrap();
        assert_eq!(range.start_str(), "2024-03-01");
        assert_eq!(range.end_str(), "2024-06-30");
        assert_eq!(o.scale_meters, Some(30));
        assert_eq!(o.output_format, Some(OutputFormat::TileReference));

        let req = ImageProductRequest::for_product(ethiopia(), Product::Ndvi, OutputFormat::Png, o);
        assert_eq!(req.date_range, Some(range));
        assert_eq!(req.scale_meters, 30);
        assert_eq!(req.output_format, OutputFormat::TileReference);
    }

    #[test]
    fn test_single_date_is_ignored() {
        let o = RequestOverrides::from_payload(&json!({"startDate": "2024-03-01"})).unwrap();
        assert_eq!(o.date_range, None);
        let o = RequestOverrides::from_payload(&json!({"startDate": "", "endDate": "2024-03-01"}))
            .unwrap();
        assert_eq!(o.date_range, None);
    }

    #[test]
    fn test_bad_dates() {
        let err = RequestOverrides::from_payload(&json!({
            "startDate": "2024-13-01",
            "endDate": "2024-06-30"
        }))
        .unwrap_err();
        assert_eq!(err, ValidationError::InvalidDate("2024-13-01".into()));

        let err = RequestOverrides::from_payload(&json!({
            "startDate": "2024-06-30",
            "endDate": "2024-03-01"
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvertedDateRange { .. }));
    }

    #[test]
    fn test_non_string_dates_are_rejected() {
        let err = RequestOverrides::from_payload(&json!({
            "startDate": 20240301,
            "endDate": "2024-06-30"
        }))
        .unwrap_err();
        assert_eq!(err, ValidationError::InvalidDate("20240301".into()));

        let err = RequestOverrides::from_payload(&json!({"endDate": true})).unwrap_err();
        assert_eq!(err, ValidationError::InvalidDate("true".into()));
    }

    #[test]
    fn test_same_day_range_is_allowed() {
        assert!(DateRange::parse("2024-03-01", "2024-03-01").is_ok());
    }

    #[test]
    fn test_scale_validation() {
        for bad in [json!(0), json!(-5), json!(1.5), json!("abc"), json!(true)] {
            assert_eq!(
                RequestOverrides::from_payload(&json!({ "scale": bad })).unwrap_err(),
                ValidationError::InvalidScale,
                "scale {bad}"
            );
        }
        let o = RequestOverrides::from_payload(&json!({"scale": 250.0})).unwrap();
        assert_eq!(o.scale_meters, Some(250));
    }

    #[test]
    fn test_bad_output_format() {
        let err = RequestOverrides::from_payload(&json!({"outputFormat": "tiff"})).unwrap_err();
        assert_eq!(err, ValidationError::InvalidOutputFormat("tiff".into()));
    }

    #[test]
    fn test_default_window_is_ordered() {
        let w = ndvi_default_window();
        assert_eq!(DateRange::new(w.start, w.end).unwrap(), w);
        assert_eq!(w, DateRange::parse("2023-01-01", "2025-02-20").unwrap());
    }
}
