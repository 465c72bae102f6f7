pub mod analysis;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod feedback;
pub mod pipeline;
pub mod pose;
pub mod render;
#[cfg(feature = "desktop")]
pub mod session;
pub mod tracker;
pub mod video;
