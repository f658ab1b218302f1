pub mod geometry;
pub mod product;
pub mod request;
pub mod result;

pub use geometry::BoundingBox;
pub use product::{BandExpression, ImageSource, Product, Visualization};
pub use request::{DateRange, ImageProductRequest, OutputFormat, RequestOverrides};
pub use result::ImageryResult;
