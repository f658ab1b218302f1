use crate::error::ValidationError;
use serde::Serialize;
use serde_json::Value;

const EDGES: [&str; 4] = ["west", "south", "east", "north"];

/// Axis-aligned EPSG:4326 rectangle delimiting a query region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Validate four edges. West must be strictly less than east and south
    /// strictly less than north.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self, ValidationError> {
        check_range("west", west, -180.0, 180.0)?;
        check_range("east", east, -180.0, 180.0)?;
        check_range("south", south, -90.0, 90.0)?;
        check_range("north", north, -90.0, 90.0)?;

        if west >= east {
            return Err(ValidationError::Degenerate {
                low_name: "west",
                low: west,
                high_name: "east",
                high: east,
            });
        }
        if south >= north {
            return Err(ValidationError::Degenerate {
                low_name: "south",
                low: south,
                high_name: "north",
                high: north,
            });
        }

        Ok(Self {
            west,
            south,
            east,
            north,
        })
    }

    /// Pull a bounding box out of an arbitrary request payload's `bbox` member.
    pub fn from_payload(payload: &Value) -> Result<Self, ValidationError> {
        let bbox = payload
            .get("bbox")
            .filter(|b| b.is_object())
            .ok_or(ValidationError::MissingBoundingBox)?;
        Self::from_value(bbox)
    }

    /// Parse `{west, south, east, north}`. Edges may be JSON numbers or
    /// numeric strings.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let mut edges = [0.0f64; 4];
        for (slot, name) in edges.iter_mut().zip(EDGES) {
            *slot = edge(value, name)?;
        }
        let [west, south, east, north] = edges;
        Self::new(west, south, east, north)
    }

    /// `[west, south, east, north]`, the order the provider expects.
    pub fn coordinates(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }
}

fn edge(value: &Value, name: &'static str) -> Result<f64, ValidationError> {
    let raw = match value.get(name) {
        None | Some(Value::Null) => return Err(ValidationError::MissingEdge(name)),
        Some(raw) => raw,
    };
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(ValidationError::NonNumericEdge(name)),
    }
}

fn check_range(edge: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::EdgeOutOfRange {
            edge,
            value,
            min,
            max,
        });
    }
    Ok(())
}
