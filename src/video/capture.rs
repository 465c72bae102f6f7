use anyhow::{bail, Context, Result};
use opencv::{
    core::{Mat, Size},
    prelude::*,
    videoio::{self, VideoCapture, VideoCaptureAPIs, VideoWriter},
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::{parse_fourcc, FrameSink, FrameSource, OutputSpec, Rotation};

/// OpenCVを使用した動画ファイルのデコーダ
pub struct VideoFileSource {
    capture: VideoCapture,
    fps: Option<f64>,
    rotation: Option<Rotation>,
}

impl VideoFileSource {
    pub fn open(path: &Path) -> Result<Self> {
        let name = path.to_string_lossy();
        let mut capture = VideoCapture::from_file(&name, VideoCaptureAPIs::CAP_ANY as i32)
            .with_context(|| format!("Failed to open video {}", path.display()))?;

        if !capture.is_opened()? {
            bail!("Video {} could not be opened", path.display());
        }

        // 回転はパイプライン側で1回だけ適用する
        capture.set(videoio::CAP_PROP_ORIENTATION_AUTO, 0.0)?;

        let fps = capture.get(videoio::CAP_PROP_FPS)?;
        let fps = (fps.is_finite() && fps > 0.0).then_some(fps);

        let meta = capture.get(videoio::CAP_PROP_ORIENTATION_META)?;
        let rotation = if meta.is_finite() {
            Rotation::from_degrees(meta.round() as i64).ok()
        } else {
            None
        };

        Ok(Self {
            capture,
            fps,
            rotation,
        })
    }
}

impl FrameSource<Mat> for VideoFileSource {
    fn fps(&self) -> Option<f64> {
        self.fps
    }

    fn rotation_hint(&self) -> Option<Rotation> {
        self.rotation
    }

    fn next_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        let ok = self.capture.read(&mut frame).context("Failed to read frame")?;
        if !ok || frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }
}

/// OpenCVの VideoWriter によるエンコーダ
///
/// 書き込み中は `<stem>.partial.mp4` に出力し、`finish` で目的のパスへ移動する。
pub struct VideoFileSink {
    writer: VideoWriter,
    partial: PathBuf,
    target: PathBuf,
}

impl VideoFileSink {
    pub fn create(target: &Path, fourcc: &str, spec: &OutputSpec) -> Result<Self> {
        let [c1, c2, c3, c4] = parse_fourcc(fourcc)?;
        let code = VideoWriter::fourcc(c1, c2, c3, c4)?;
        let partial = partial_path_for(target);
        let size = Size::new(spec.width as i32, spec.height as i32);

        let writer = VideoWriter::new(&partial.to_string_lossy(), code, spec.fps, size, true)
            .with_context(|| format!("Failed to create video writer for {}", target.display()))?;
        if !writer.is_opened()? {
            bail!(
                "Video writer for {} could not be opened (fourcc {})",
                target.display(),
                fourcc
            );
        }

        Ok(Self {
            writer,
            partial,
            target: target.to_path_buf(),
        })
    }
}

fn commit_partial(partial: &Path, target: &Path) -> Result<()> {
    fs::rename(partial, target)
        .with_context(|| format!("Failed to move {} to {}", partial.display(), target.display()))
}

/// 確定できなかった書きかけを消す。消せなくても元のエラーを優先する
fn remove_partial(partial: &Path) {
    if partial.exists() {
        if let Err(e) = fs::remove_file(partial) {
            warn!("Failed to remove {}: {}", partial.display(), e);
        }
    }
}

fn partial_path_for(target: &Path) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!("{stem}.partial.mp4"))
}

impl FrameSink<Mat> for VideoFileSink {
    fn write(&mut self, frame: &Mat) -> Result<()> {
        self.writer.write(frame).context("Failed to write frame")?;
        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        let finished = self
            .writer
            .release()
            .context("Failed to finalize video")
            .and_then(|()| commit_partial(&self.partial, &self.target));

        if finished.is_err() {
            remove_partial(&self.partial);
        }
        finished
    }

    fn discard(mut self) -> Result<()> {
        self.writer.release()?;
        if self.partial.exists() {
            fs::remove_file(&self.partial)
                .with_context(|| format!("Failed to remove {}", self.partial.display()))?;
        }
        Ok(())
    }
}
