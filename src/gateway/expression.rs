//! Builds the provider's serialized expression graph for a request.

use crate::models::{
    BandExpression, BoundingBox, ImageProductRequest, ImageSource, OutputFormat, Visualization,
};
use serde_json::{Map, Value, json};

const CRS: &str = "EPSG:4326";

fn constant(value: Value) -> Value {
    json!({ "constantValue": value })
}

fn invoke(function: &str, arguments: Vec<(&str, Value)>) -> Value {
    let arguments: Map<String, Value> = arguments
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    json!({
        "functionInvocationValue": {
            "functionName": function,
            "arguments": arguments,
        }
    })
}

fn projection() -> Value {
    invoke("Projection", vec![("crs", constant(json!(CRS)))])
}

fn region(bbox: &BoundingBox) -> Value {
    invoke(
        "GeometryConstructors.Rectangle",
        vec![
            ("coordinates", constant(json!(bbox.coordinates()))),
            ("crs", projection()),
            ("geodesic", constant(json!(false))),
        ],
    )
}

fn filter(collection: Value, predicate: Value) -> Value {
    invoke(
        "Collection.filter",
        vec![("collection", collection), ("filter", predicate)],
    )
}

fn source_image(request: &ImageProductRequest, region: &Value) -> Value {
    match &request.source {
        ImageSource::Composite {
            collection,
            cloud_property,
            max_cloud_percentage,
        } => {
            let mut images = invoke(
                "ImageCollection.load",
                vec![("id", constant(json!(collection)))],
            );
            images = filter(
                images,
                invoke(
                    "Filter.intersects",
                    vec![
                        ("leftField", constant(json!(".all"))),
                        ("rightValue", region.clone()),
                    ],
                ),
            );
            if let Some(range) = &request.date_range {
                images = filter(
                    images,
                    invoke(
                        "Filter.dateRangeContains",
                        vec![
                            (
                                "leftValue",
                                invoke(
                                    "DateRange",
                                    vec![
                                        ("start", constant(json!(range.start_str()))),
                                        ("end", constant(json!(range.end_str()))),
                                    ],
                                ),
                            ),
                            ("rightField", constant(json!("system:time_start"))),
                        ],
                    ),
                );
            }
            images = filter(
                images,
                invoke(
                    "Filter.lessThan",
                    vec![
                        ("leftField", constant(json!(cloud_property))),
                        ("rightValue", constant(json!(max_cloud_percentage))),
                    ],
                ),
            );
            invoke("reduce.median", vec![("collection", images)])
        }
        ImageSource::Image { id } => invoke("Image.load", vec![("id", constant(json!(id)))]),
    }
}

fn apply_bands(image: Value, bands: &BandExpression) -> Value {
    match bands {
        BandExpression::NormalizedDifference { nir, red, output } => {
            let ndvi = invoke(
                "Image.normalizedDifference",
                vec![("input", image), ("bandNames", constant(json!([nir, red])))],
            );
            invoke(
                "Image.rename",
                vec![("input", ndvi), ("names", constant(json!([output])))],
            )
        }
        BandExpression::ClassLookup { band, classes } => {
            let selected = invoke(
                "Image.select",
                vec![("input", image), ("bandSelectors", constant(json!([band])))],
            );
            let indices: Vec<usize> = (0..classes.len()).collect();
            invoke(
                "Image.remap",
                vec![
                    ("image", selected),
                    ("from", constant(json!(classes))),
                    ("to", constant(json!(indices))),
                ],
            )
        }
    }
}

fn visualize(image: Value, vis: &Visualization) -> Value {
    invoke(
        "Image.visualize",
        vec![
            ("image", image),
            ("min", constant(json!(vis.min))),
            ("max", constant(json!(vis.max))),
            ("palette", constant(json!(vis.palette))),
        ],
    )
}

/// The full graph: load, filter, composite, clip, band math, optional
/// reprojection to the requested scale, then the palette.
pub fn build(request: &ImageProductRequest) -> Value {
    let region = region(&request.bounding_box);

    let mut image = source_image(request, &region);
    image = invoke(
        "Image.clip",
        vec![("input", image), ("geometry", region.clone())],
    );
    image = apply_bands(image, &request.band_expression);

    if request.output_format == OutputFormat::Png {
        image = invoke(
            "Image.reproject",
            vec![
                ("image", image),
                ("crs", projection()),
                ("scale", constant(json!(request.scale_meters))),
            ],
        );
    }

    let root = visualize(image, &request.visualization);
    json!({
        "result": "0",
        "values": { "0": root },
    })
}
