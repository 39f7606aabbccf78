//! Mode-7 ground rasterizer
//!
//! Projects a wrap-around map texture onto the screen rows below the horizon.

pub mod raster;
pub mod sampling;
pub mod texture;

pub use raster::{GroundTarget, rasterize, render_performance, render_quality};
pub use sampling::{BandThresholds, DepthBand, SamplingPolicy};
pub use texture::MapTexture;
