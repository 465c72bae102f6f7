mod analyze;
mod cancel;
mod runner;
mod settings;

pub use analyze::{analyze_landmarks, FrameAnalysis};
pub use cancel::CancelToken;
pub use runner::{FramePipeline, RunSummary};
pub use settings::PipelineSettings;
