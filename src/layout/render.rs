use crate::{
    config::LayoutConfig,
    layout::font::CardFont,
    models::{Alignment, TextBlock},
};
use image::{imageops::FilterType, Rgba, RgbaImage};

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const SHADOW: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Source-over blend of `color` at `coverage` (0..=1) onto an opaque pixel.
pub fn blend_pixel(dst: &mut Rgba<u8>, color: Rgba<u8>, coverage: f32) {
    let a = (coverage.clamp(0.0, 1.0) * color.0[3] as f32) / 255.0;
    if a <= 0.0 {
        return;
    }
    let inv = 1.0 - a;
    for c in 0..3 {
        dst.0[c] = (color.0[c] as f32 * a + dst.0[c] as f32 * inv).round() as u8;
    }
    dst.0[3] = 255;
}

fn luma(p: &Rgba<u8>) -> f32 {
    (p.0[0] as f32 * 299.0 + p.0[1] as f32 * 587.0 + p.0[2] as f32 * 114.0) / 1000.0
}

fn clamp_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Resamples to exactly `width`x`height`, then applies the fixed contrast and
/// saturation boosts. Alpha is left untouched.
pub fn normalize_canvas(
    background: &RgbaImage,
    width: u32,
    height: u32,
    contrast: f32,
    saturation: f32,
) -> RgbaImage {
    let mut canvas = if background.dimensions() == (width, height) {
        background.clone()
    } else {
        image::imageops::resize(background, width, height, FilterType::Lanczos3)
    };

    let pixels = (canvas.width() as f64 * canvas.height() as f64).max(1.0);
    let mean = (canvas.pixels().map(|p| luma(p) as f64).sum::<f64>() / pixels).round() as f32;

    for p in canvas.pixels_mut() {
        for c in 0..3 {
            p.0[c] = clamp_channel(mean + (p.0[c] as f32 - mean) * contrast);
        }
        let gray = luma(p);
        for c in 0..3 {
            p.0[c] = clamp_channel(gray + (p.0[c] as f32 - gray) * saturation);
        }
    }
    canvas
}

/// Darkens the rectangle [x0, x1) x [y0, y1), clipped to the canvas.
pub fn draw_band(canvas: &mut RgbaImage, x0: i32, y0: i32, x1: i32, y1: i32, alpha: u8) {
    let (width, height) = canvas.dimensions();
    let x0 = x0.clamp(0, width as i32) as u32;
    let x1 = x1.clamp(0, width as i32) as u32;
    let y0 = y0.clamp(0, height as i32) as u32;
    let y1 = y1.clamp(0, height as i32) as u32;
    let color = Rgba([0, 0, 0, alpha]);

    for y in y0..y1 {
        for x in x0..x1 {
            blend_pixel(canvas.get_pixel_mut(x, y), color, 1.0);
        }
    }
}

/// Where a block sits on the card: its top edge and the horizontal text column.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub top: f32,
    pub column_left: f32,
    pub column_width: f32,
}

/// Band plus shadowed white lines for one block.
pub fn draw_block(
    canvas: &mut RgbaImage,
    block: &TextBlock,
    font: &dyn CardFont,
    placement: Placement,
    config: &LayoutConfig,
) {
    if block.is_empty() {
        return;
    }
    let pad = config.band_padding as f32;
    let shadow_offset = config.shadow_offset;
    draw_band(
        canvas,
        (placement.column_left - pad).floor() as i32,
        (placement.top - pad).floor() as i32,
        (placement.column_left + placement.column_width + pad).ceil() as i32,
        (placement.top + block.height + pad).ceil() as i32,
        config.band_alpha,
    );

    let mut y = placement.top;
    for line in &block.lines {
        let x = match block.alignment {
            Alignment::Left => placement.column_left,
            Alignment::Center => {
                placement.column_left + (placement.column_width - font.text_width(line)) / 2.0
            }
        };
        let (x, top) = (x.round() as i32, y.round() as i32);
        font.draw_text(canvas, x + shadow_offset, top + shadow_offset, line, SHADOW);
        font.draw_text(canvas, x, top, line, WHITE);
        y += block.line_height + config.line_gap;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_pixel() {
        let mut p = Rgba([200, 100, 0, 255]);
        blend_pixel(&mut p, Rgba([0, 0, 0, 255]), 0.0);
        assert_eq!(p, Rgba([200, 100, 0, 255]));

        blend_pixel(&mut p, Rgba([0, 0, 0, 255]), 0.5);
        assert_eq!(p, Rgba([100, 50, 0, 255]));

        blend_pixel(&mut p, WHITE, 1.0);
        assert_eq!(p, WHITE);
    }

    #[test]
    fn test_normalize_resizes_and_is_deterministic() {
        let bg = RgbaImage::from_fn(64, 32, |x, y| Rgba([(x * 4) as u8, (y * 8) as u8, 128, 255]));
        let a = normalize_canvas(&bg, 100, 50, 1.10, 1.05);
        let b = normalize_canvas(&bg, 100, 50, 1.10, 1.05);
        assert_eq!(a.dimensions(), (100, 50));
        assert_eq!(a, b);
    }

    #[test]
    fn test_contrast_spreads_from_mean() {
        let bg = RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([100, 100, 100, 255])
            } else {
                Rgba([200, 200, 200, 255])
            }
        });
        let out = normalize_canvas(&bg, 2, 1, 1.10, 1.0);
        // mean luma is 150: 150 + (100 - 150) * 1.1 = 95, 150 + 50 * 1.1 = 205
        assert_eq!(out.get_pixel(0, 0).0[0], 95);
        assert_eq!(out.get_pixel(1, 0).0[0], 205);
        assert_eq!(out.get_pixel(1, 0).0[3], 255);
    }

    #[test]
    fn test_band_is_clipped_and_darkens() {
        let mut canvas = RgbaImage::from_pixel(10, 10, Rgba([200, 200, 200, 255]));
        draw_band(&mut canvas, -5, 2, 20, 4, 140);
        assert!(canvas.get_pixel(0, 2).0[0] < 200);
        assert!(canvas.get_pixel(9, 3).0[0] < 200);
        assert_eq!(canvas.get_pixel(5, 5).0[0], 200);
    }
}
