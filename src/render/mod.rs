#[cfg(feature = "desktop")]
mod mat;
pub mod raster;
pub mod skeleton;

pub use raster::{Color, Raster};
pub use skeleton::{draw_landmarks, draw_region, REGION_COLOR, SKELETON_CONNECTIONS};
