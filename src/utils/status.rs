use crate::models::{BandExpression, ImageSource, Product};
use crate::models::request::DEFAULT_SCALE_METERS;
use crate::utils::style::colour_bar;
use comfy_table::{Attribute, Cell, CellAlignment, Table};

fn header(name: &str) -> Cell {
    Cell::new(name)
        .add_attribute(Attribute::Bold)
        .set_alignment(CellAlignment::Center)
}

pub fn product_table(products: &[Product]) -> Table {
    let mut table = Table::new();
    table
        .set_header(vec![
            header("Product"),
            header("Source"),
            header("Bands"),
            header("Min"),
            header("Max"),
            header("Scale (m)"),
            Cell::new("Colourbar").add_attribute(Attribute::Bold),
        ])
        .load_preset(comfy_table::presets::ASCII_BORDERS_ONLY_CONDENSED);

    for product in products {
        let source = match product.source() {
            ImageSource::Composite {
                collection,
                cloud_property,
                max_cloud_percentage,
            } => format!("{} ({} < {})", collection, cloud_property, max_cloud_percentage),
            ImageSource::Image { id } => id.to_string(),
        };
        let bands = match product.band_expression() {
            BandExpression::NormalizedDifference { nir, red, .. } => {
                format!("({nir} - {red}) / ({nir} + {red})")
            }
            BandExpression::ClassLookup { band, classes } => {
                format!("{} ({} classes)", band, classes.len())
            }
        };
        let vis = product.visualization();
        let categorical = matches!(product.band_expression(), BandExpression::ClassLookup { .. });

        table.add_row(vec![
            Cell::new(product.label()),
            Cell::new(source),
            Cell::new(bands),
            Cell::new(vis.min).set_alignment(CellAlignment::Center),
            Cell::new(vis.max).set_alignment(CellAlignment::Center),
            Cell::new(DEFAULT_SCALE_METERS).set_alignment(CellAlignment::Center),
            Cell::new(colour_bar(&vis.palette, categorical, 10)),
        ]);
    }
    table
}

pub fn print_product_summary(products: &[Product]) {
    println!("\nProducts:\n{}", product_table(products));
    println!();
}
