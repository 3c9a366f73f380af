//! Raster image to colored character art.
//!
//! The image is always fit to the viewport width. Terminal cells are roughly
//! 28 units tall for every 15 wide, so the row count is divided by that ratio
//! to keep the picture's proportions.

use super::RenderError;
use ::image::{imageops::FilterType, Rgba};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span, Text},
};

/// Height-to-width ratio of a terminal character cell.
pub const CELL_ASPECT: f64 = 28.0 / 15.0;

/// Tallest grid rendered; anything taller is reported as an error.
pub const MAX_ROWS: u32 = 2_000;

/// Characters from darkest to brightest.
const RAMP: &[char] = &[' ', '.', ',', ':', ';', 'i', '1', 't', 'f', 'L', 'C', 'G', '0', '8', '@'];

/// Rows needed to show an `image_width` x `image_height` picture in `width`
/// columns.
pub fn grid_height(width: u32, image_width: u32, image_height: u32) -> u32 {
    if image_width == 0 {
        return 0;
    }
    let real_height = f64::from(width) / f64::from(image_width) * f64::from(image_height);
    (real_height / CELL_ASPECT).floor() as u32
}

fn glyph(pixel: Rgba<u8>) -> char {
    let [r, g, b, a] = pixel.0;
    let luma = 0.2126 * f64::from(r) + 0.7152 * f64::from(g) + 0.0722 * f64::from(b);
    let luma = luma * f64::from(a) / 255.0;
    let idx = (luma / 256.0 * RAMP.len() as f64) as usize;
    RAMP[idx.min(RAMP.len() - 1)]
}

/// Decode `bytes` and render them `width` columns wide.
pub fn render(bytes: &[u8], width: u32) -> Result<Text<'static>, RenderError> {
    if width == 0 {
        return Err(RenderError::ZeroWidth);
    }

    let img = ::image::load_from_memory(bytes)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(RenderError::EmptyImage);
    }

    let height = grid_height(width, img.width(), img.height()).max(1);
    if height > MAX_ROWS {
        return Err(RenderError::TooTall { rows: height });
    }
    let grid = img.resize_exact(width, height, FilterType::Triangle).to_rgba8();

    let lines = grid
        .rows()
        .map(|row| {
            // Neighbouring pixels of one colour share a span.
            let mut runs: Vec<(Color, String)> = Vec::new();
            for &px in row {
                let [r, g, b, _] = px.0;
                let color = Color::Rgb(r, g, b);
                match runs.last_mut() {
                    Some((last, text)) if *last == color => text.push(glyph(px)),
                    _ => runs.push((color, glyph(px).to_string())),
                }
            }
            let spans: Vec<Span<'static>> = runs
                .into_iter()
                .map(|(color, text)| Span::styled(text, Style::default().fg(color)))
                .collect();
            Line::from(spans)
        })
        .collect::<Vec<_>>();

    Ok(Text::from(lines))
}
