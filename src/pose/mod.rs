#[cfg(feature = "desktop")]
pub mod detector;
pub mod estimator;
pub mod keypoint;
#[cfg(feature = "desktop")]
pub mod preprocess;

#[cfg(feature = "desktop")]
pub use detector::MoveNetEstimator;
pub use estimator::PoseEstimator;
pub use keypoint::{Keypoint, Landmark, LandmarkSet, Point2D};
#[cfg(feature = "desktop")]
pub use preprocess::preprocess_for_movenet;
