//! Software rendering: camera, rasterizer and scene drawing.

pub mod camera;
pub mod raster;
pub mod scene;

pub use camera::{Camera, OrbitControls};
pub use raster::{Fill, Framebuffer, Projector};
