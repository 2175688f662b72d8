use image::RgbImage;

use super::raster;
use crate::bands::{Palette, Rgb};
use crate::config::{DistanceBand, MonitorConfig, RasterSize};
use crate::error::{MonitorError, Result};
use crate::snapshot::Position;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterPoint {
    pub x: f64,
    pub y: f64,
}

impl RasterPoint {
    pub fn distance(&self, other: &RasterPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// What a render call did with the new point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stroke {
    /// No previous point yet.
    Started,
    Drawn {
        from: RasterPoint,
        to: RasterPoint,
        color: Rgb,
    },
    /// Too short to be deliberate motion.
    Noise { distance: f64 },
    /// Too long to be continuous motion (cursor jump, sensor reset).
    Jump { distance: f64 },
}

/// Fading motion trail on an owned raster surface.
pub struct TrailRenderer {
    surface: Option<RgbImage>,
    previous: Option<RasterPoint>,
    size: RasterSize,
    scale_x: f64,
    scale_y: f64,
    band: DistanceBand,
    palette: Palette,
    background: Rgb,
    decay_alpha: f32,
    line_width: u32,
}

impl TrailRenderer {
    /// Expects a validated config.
    pub fn new(config: &MonitorConfig) -> Self {
        let size = config.raster_size;
        Self {
            surface: Some(raster::blank(size, config.background)),
            previous: None,
            size,
            scale_x: f64::from(size.width) / config.reference_frame.width,
            scale_y: f64::from(size.height) / config.reference_frame.height,
            band: config.distance_band,
            palette: config.trail_palette.clone(),
            background: config.background,
            decay_alpha: config.decay_alpha,
            line_width: config.line_width,
        }
    }

    pub fn to_raster(&self, position: Position) -> RasterPoint {
        RasterPoint {
            x: position.x * self.scale_x,
            y: position.y * self.scale_y,
        }
    }

    pub fn color_for(&self, score: u8) -> Rgb {
        *self.palette.lookup(score)
    }

    /// Extends the trail to `position`, then runs one decay pass.
    ///
    /// The new point becomes the previous point whether or not a segment was
    /// drawn. With no surface attached nothing changes and
    /// `RenderTargetUnavailable` is returned.
    pub fn render(&mut self, position: Position, score: u8) -> Result<Stroke> {
        if self.surface.is_none() {
            return Err(MonitorError::RenderTargetUnavailable);
        }

        let point = self.to_raster(position);
        let color = self.color_for(score);
        let stroke = match self.previous.replace(point) {
            None => Stroke::Started,
            Some(from) => {
                let distance = from.distance(&point);
                if self.band.contains(distance) {
                    Stroke::Drawn {
                        from,
                        to: point,
                        color,
                    }
                } else if distance <= self.band.min {
                    Stroke::Noise { distance }
                } else {
                    Stroke::Jump { distance }
                }
            }
        };

        let Some(surface) = self.surface.as_mut() else {
            return Err(MonitorError::RenderTargetUnavailable);
        };
        if let Stroke::Drawn { from, to, color } = stroke {
            raster::draw_segment(surface, (from.x, from.y), (to.x, to.y), color, self.line_width);
        }
        raster::decay(surface, self.background, self.decay_alpha);

        Ok(stroke)
    }

    pub fn surface(&self) -> Option<&RgbImage> {
        self.surface.as_ref()
    }

    pub fn previous(&self) -> Option<RasterPoint> {
        self.previous
    }

    /// Removes the surface; later renders are no-ops until `attach`.
    pub fn detach(&mut self) -> Option<RgbImage> {
        self.surface.take()
    }

    /// Attaches a fresh blank surface and forgets the previous point.
    pub fn attach(&mut self) {
        self.surface = Some(raster::blank(self.size, self.background));
        self.previous = None;
    }
}
