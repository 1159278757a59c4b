//! Drawport Render Library
//!
//! Rasterizer abstraction and implementations for Drawport.
//! The default implementation uses tiny-skia to render on the CPU.

mod raster;
mod renderer;

#[cfg(feature = "skia-rasterizer")]
mod skia_impl;

pub use raster::{RasterImage, SCENE_METADATA_KEY};
pub use renderer::{
    CanvasSize, MAX_CANVAS_SIDE, RasterOptions, RasterRequest, Rasterizer, RenderError,
    RenderResult, canvas_size,
};

#[cfg(feature = "skia-rasterizer")]
pub use skia_impl::SkiaRasterizer;
