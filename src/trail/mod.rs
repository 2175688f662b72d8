mod raster;
mod renderer;

pub use renderer::{RasterPoint, Stroke, TrailRenderer};
