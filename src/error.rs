use std::path::PathBuf;

use thiserror::Error;

/// 実行を中断させるエラー。いずれの場合も出力は残らない
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid pipeline settings: {0}")]
    InvalidSettings(String),

    #[error("cannot open input video {}: {cause:#}", path.display())]
    OpenInput { path: PathBuf, cause: anyhow::Error },

    #[error("input video contains no frames")]
    EmptyInput,

    #[error("failed to decode frame {frame_index}: {cause:#}")]
    Decode { frame_index: u64, cause: anyhow::Error },

    #[error("region selection failed: {0:#}")]
    Selection(anyhow::Error),

    #[error("no region selected (zero-area box)")]
    NoRegionSelected,

    #[error("tracker initialization failed: {0:#}")]
    TrackerInit(anyhow::Error),

    #[error("pose estimator unavailable: {0:#}")]
    EstimatorUnavailable(anyhow::Error),

    #[error("cannot open output video: {0:#}")]
    OutputUnavailable(anyhow::Error),

    #[error("failed to write frame {frame_index}: {cause:#}")]
    Output { frame_index: u64, cause: anyhow::Error },

    #[error("cancelled at frame {frame_index}")]
    Cancelled { frame_index: u64 },

    #[error("cannot write feedback log {}: {cause:#}", path.display())]
    FeedbackLog { path: PathBuf, cause: anyhow::Error },
}
