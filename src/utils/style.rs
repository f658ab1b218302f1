use colorgrad::{Color, Gradient, GradientBuilder, LinearGradient};

/// Parse a palette of html colours into a linear gradient over [0, 1].
pub fn palette_gradient(palette: &[String]) -> Result<LinearGradient, String> {
    GradientBuilder::new()
        .html_colors(palette)
        .build::<LinearGradient>()
        .map_err(|e| format!("Invalid palette: {}", e))
}

/// A terminal colour bar, one block per palette entry when `categorical`,
/// otherwise `width` samples along the gradient.
pub fn colour_bar(palette: &[String], categorical: bool, width: usize) -> String {
    let block = |[r, g, b, _]: [u8; 4]| format!("\x1b[38;2;{};{};{}m█\x1b[0m", r, g, b);

    if categorical {
        return palette
            .iter()
            .filter_map(|c| Color::from_html(c).ok())
            .map(|c| block(c.to_rgba8()))
            .collect();
    }

    match palette_gradient(palette) {
        Ok(grad) => {
            let n = width.max(2);
            (0..n)
                .map(|i| block(grad.at(i as f32 / (n - 1) as f32).to_rgba8()))
                .collect()
        }
        Err(_) => String::new(),
    }
}
