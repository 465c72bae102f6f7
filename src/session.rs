use std::fs;
use std::path::{Path, PathBuf};

use opencv::core::Mat;
use tracing::{info, warn};

use crate::config::Config;
use crate::diagnostics::TracingDiagnostics;
use crate::error::PipelineError;
use crate::feedback::{clear_previous_artifacts, feedback_path_for, write_feedback_log};
use crate::pipeline::{CancelToken, FramePipeline, RunSummary};
use crate::pose::MoveNetEstimator;
use crate::tracker::{BBox, CsrtTracker, FixedRegion, RegionSelector, WindowRegionSelector};
use crate::video::{Rotation, VideoFileSink, VideoFileSource};

/// 動画1本の解析リクエスト
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    /// 初期領域。None ならウィンドウで選択する
    pub region: Option<BBox>,
    /// 設定ファイルより優先する強制回転
    pub rotation: Option<Rotation>,
    /// 設定ファイルより優先するモデルパス
    pub model: Option<PathBuf>,
}

/// 解析で生成されたファイル
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub video: PathBuf,
    pub feedback: PathBuf,
    pub summary: RunSummary,
}

/// 出力先は常に .mp4
pub fn normalize_output_path(output: &Path) -> PathBuf {
    output.with_extension("mp4")
}

/// 動画を解析し、注釈つき動画とフィードバックログを書き出す
///
/// 同じ出力先に前回の結果があれば、入力と推定器の準備ができた時点で両方消す。
/// 成功すれば両方が揃い、失敗すればどちらも残らない。
pub fn analyze_video(
    request: &SessionRequest,
    config: &Config,
    cancel: &CancelToken,
) -> Result<Artifacts, PipelineError> {
    let mut settings = config.pipeline_settings();
    if let Some(rotation) = request.rotation {
        settings.rotation = Some(rotation);
    }

    let video = normalize_output_path(&request.output);
    let feedback = feedback_path_for(&video);

    let mut source = VideoFileSource::open(&request.input).map_err(|cause| PipelineError::OpenInput {
        path: request.input.clone(),
        cause,
    })?;

    let model = request
        .model
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.pose.model));
    let estimator = MoveNetEstimator::new(&model, config.pose.min_confidence)
        .map_err(PipelineError::EstimatorUnavailable)?;

    let mut selector: Box<dyn RegionSelector<Mat>> = match request.region {
        Some(region) => Box::new(FixedRegion(region)),
        None => Box::new(WindowRegionSelector),
    };

    // 前回の結果は実行前に消す
    clear_previous_artifacts(&video).map_err(PipelineError::OutputUnavailable)?;

    info!(input = %request.input.display(), output = %video.display(), "Analyzing");

    let fourcc = config.video.fourcc.clone();
    let mut pipeline = FramePipeline::new(settings, CsrtTracker::new(), estimator, TracingDiagnostics);
    let summary = pipeline.run(
        &mut source,
        &mut selector,
        |spec| VideoFileSink::create(&video, &fourcc, spec),
        cancel,
    )?;

    if let Err(cause) = write_feedback_log(&feedback, &summary.events) {
        if let Err(e) = fs::remove_file(&video) {
            warn!("Failed to remove {}: {}", video.display(), e);
        }
        return Err(PipelineError::FeedbackLog {
            path: feedback,
            cause,
        });
    }

    info!(
        events = summary.events.len(),
        video = %video.display(),
        feedback = %feedback.display(),
        "Analysis complete"
    );

    Ok(Artifacts {
        video,
        feedback,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_forced_to_mp4() {
        assert_eq!(normalize_output_path(Path::new("out/serve.avi")), PathBuf::from("out/serve.mp4"));
        assert_eq!(normalize_output_path(Path::new("serve")), PathBuf::from("serve.mp4"));
        assert_eq!(normalize_output_path(Path::new("serve.mp4")), PathBuf::from("serve.mp4"));
    }

    #[test]
    fn test_feedback_sits_next_to_video() {
        let video = normalize_output_path(Path::new("/data/serve.mov"));
        assert_eq!(feedback_path_for(&video), PathBuf::from("/data/serve_feedback.csv"));
    }
}
