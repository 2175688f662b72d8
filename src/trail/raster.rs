use image::{Rgb as Pixel, RgbImage};

use crate::bands::Rgb;
use crate::config::RasterSize;

pub fn blank(size: RasterSize, background: Rgb) -> RgbImage {
    RgbImage::from_pixel(size.width, size.height, Pixel(background))
}

/// Bresenham line stamped with a square brush `width` pixels wide. Pixels
/// outside the surface are clipped.
pub fn draw_segment(
    surface: &mut RgbImage,
    from: (f64, f64),
    to: (f64, f64),
    color: Rgb,
    width: u32,
) {
    let (mut x0, mut y0) = (from.0.round() as i64, from.1.round() as i64);
    let (x1, y1) = (to.0.round() as i64, to.1.round() as i64);

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        stamp(surface, x0, y0, color, width);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn stamp(surface: &mut RgbImage, cx: i64, cy: i64, color: Rgb, width: u32) {
    let width = i64::from(width.max(1));
    let lo = -(width - 1) / 2;
    let hi = lo + width - 1;
    let (w, h) = (i64::from(surface.width()), i64::from(surface.height()));

    for y in (cy + lo)..=(cy + hi) {
        for x in (cx + lo)..=(cx + hi) {
            if (0..w).contains(&x) && (0..h).contains(&y) {
                surface.put_pixel(x as u32, y as u32, Pixel(color));
            }
        }
    }
}

/// Composites `background` at opacity `alpha` over the whole surface.
///
/// Every channel moves at least one step toward the background per pass, so
/// trails always fade out completely instead of stalling one level above it.
pub fn decay(surface: &mut RgbImage, background: Rgb, alpha: f32) {
    for pixel in surface.pixels_mut() {
        for (channel, target) in pixel.0.iter_mut().zip(background) {
            *channel = fade_channel(*channel, target, alpha);
        }
    }
}

fn fade_channel(value: u8, target: u8, alpha: f32) -> u8 {
    if value == target {
        return value;
    }
    let delta = (f32::from(target) - f32::from(value)) * alpha;
    let step = if delta.abs() < 1.0 {
        delta.signum()
    } else {
        delta.round()
    };
    (f32::from(value) + step).clamp(0.0, 255.0) as u8
}
