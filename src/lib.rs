//! Low-poly world demos
//!
//! Procedural village terrain with instanced houses, trees and clouds, a
//! neon lane-avoidance racer, and the software renderer that draws both.

pub mod arcade;
pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod grid;
pub mod lighting;
pub mod logging;
pub mod mesh;
pub mod particles;
pub mod placement;
pub mod race;
pub mod render;
pub mod seeds;
pub mod smoke;
pub mod terrain;
pub mod texture;
pub mod viewer;
pub mod village;
pub mod water;
