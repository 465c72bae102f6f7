use anyhow::Result;

use super::analyze::analyze_landmarks;
use super::{CancelToken, PipelineSettings};
use crate::analysis::{Event, JumpState};
use crate::diagnostics::{Diagnostics, FrameStage, PipelineNotice};
use crate::error::PipelineError;
use crate::pose::PoseEstimator;
use crate::render::{draw_landmarks, draw_region, Raster};
use crate::tracker::{BBox, RegionSelector, RegionTracker};
use crate::video::{FrameSink, FrameSource, OutputSpec, Rotation};

/// 1回の実行結果
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// 時系列順のイベント
    pub events: Vec<Event>,
    pub frames_written: u64,
    /// トラッカーが領域を返したフレーム数
    pub frames_tracked: u64,
    pub frames_with_landmarks: u64,
    pub rotation: Rotation,
    pub effective_fps: f64,
    pub output: OutputSpec,
}

/// 実行中に積み上げる状態
#[derive(Debug, Default)]
struct RunState {
    jump: JumpState,
    events: Vec<Event>,
    frames_written: u64,
    frames_tracked: u64,
    frames_with_landmarks: u64,
}

/// 追跡 → クロップ → 姿勢推定 → 判定 → 描画 → 書き出し を1フレームずつ行う
///
/// トラッカー・推定器・診断先はこの値が所有し、実行どうしで何も共有しない。
pub struct FramePipeline<T, P, D> {
    settings: PipelineSettings,
    tracker: T,
    estimator: P,
    diagnostics: D,
}

impl<T, P, D: Diagnostics> FramePipeline<T, P, D> {
    pub fn new(settings: PipelineSettings, tracker: T, estimator: P, diagnostics: D) -> Self {
        Self {
            settings,
            tracker,
            estimator,
            diagnostics,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> D {
        self.diagnostics
    }

    /// 動画全体を処理する
    ///
    /// `open_sink` は初期領域が決まった後で1度だけ呼ばれる。エラーやキャンセルで
    /// 中断した場合、開いたシンクは `discard` される。`finish` の失敗も中断として扱う。
    pub fn run<F, S, R, K, O>(
        &mut self,
        source: &mut S,
        selector: &mut R,
        open_sink: O,
        cancel: &CancelToken,
    ) -> Result<RunSummary, PipelineError>
    where
        F: Raster,
        T: RegionTracker<F>,
        P: PoseEstimator<F>,
        S: FrameSource<F>,
        R: RegionSelector<F>,
        K: FrameSink<F>,
        O: FnOnce(&OutputSpec) -> Result<K>,
    {
        self.settings.validate()?;

        let first = source
            .next_frame()
            .map_err(|cause| PipelineError::Decode { frame_index: 0, cause })?
            .ok_or(PipelineError::EmptyInput)?;

        let rotation = self
            .settings
            .rotation
            .or_else(|| source.rotation_hint())
            .unwrap_or_default();
        let first = first
            .rotate(rotation)
            .map_err(|cause| PipelineError::Decode { frame_index: 0, cause })?;
        let (width, height) = first.size();

        let region = selector.select(&first).map_err(PipelineError::Selection)?;
        let region = region
            .clamp_to(width, height)
            .ok_or(PipelineError::NoRegionSelected)?;
        self.tracker
            .init(&first, region)
            .map_err(PipelineError::TrackerInit)?;

        let effective_fps = self.settings.effective_fps(source.fps());
        let output = OutputSpec {
            width,
            height,
            fps: effective_fps / f64::from(self.settings.stride),
        };
        let mut sink = open_sink(&output).map_err(PipelineError::OutputUnavailable)?;

        self.diagnostics.notice(PipelineNotice::Started {
            rotation,
            region,
            effective_fps,
            output,
        });

        let mut state = RunState::default();
        let result = self.process_stream(source, &mut sink, first, rotation, effective_fps, cancel, &mut state);

        if let Err(err) = result {
            // 中断理由の方を返す
            let reason = match sink.discard() {
                Ok(()) => err.to_string(),
                Err(discard_err) => format!("{}; discard also failed: {:#}", err, discard_err),
            };
            self.diagnostics.notice(PipelineNotice::Discarded { reason });
            return Err(err);
        }

        // 確定に失敗したシンクは書きかけを自分で片付ける
        if let Err(cause) = sink.finish() {
            let err = PipelineError::Output {
                frame_index: state.frames_written,
                cause,
            };
            self.diagnostics.notice(PipelineNotice::Discarded {
                reason: err.to_string(),
            });
            return Err(err);
        }

        self.diagnostics.notice(PipelineNotice::Finished {
            frames_written: state.frames_written,
            frames_tracked: state.frames_tracked,
            events: state.events.len(),
        });

        Ok(RunSummary {
            events: state.events,
            frames_written: state.frames_written,
            frames_tracked: state.frames_tracked,
            frames_with_landmarks: state.frames_with_landmarks,
            rotation,
            effective_fps,
            output,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn process_stream<F, S, K>(
        &mut self,
        source: &mut S,
        sink: &mut K,
        first: F,
        rotation: Rotation,
        effective_fps: f64,
        cancel: &CancelToken,
        state: &mut RunState,
    ) -> Result<(), PipelineError>
    where
        F: Raster,
        T: RegionTracker<F>,
        P: PoseEstimator<F>,
        S: FrameSource<F>,
        K: FrameSink<F>,
    {
        let stride = u64::from(self.settings.stride);
        let mut frame_index: u64 = 0;
        let mut current = Some(first);

        while let Some(mut frame) = current.take() {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled { frame_index });
            }

            self.process_frame(&mut frame, frame_index, effective_fps, state);

            sink.write(&frame)
                .map_err(|cause| PipelineError::Output { frame_index, cause })?;
            state.frames_written += 1;

            // stride > 1 のとき間のフレームは読み捨てる
            let mut exhausted = false;
            for skipped in 1..stride {
                let decoded = source.next_frame().map_err(|cause| PipelineError::Decode {
                    frame_index: frame_index + skipped,
                    cause,
                })?;
                if decoded.is_none() {
                    exhausted = true;
                    break;
                }
            }
            if exhausted {
                break;
            }

            frame_index += stride;
            current = match source.next_frame() {
                Ok(Some(next)) => Some(
                    next.rotate(rotation)
                        .map_err(|cause| PipelineError::Decode { frame_index, cause })?,
                ),
                Ok(None) => None,
                Err(cause) => return Err(PipelineError::Decode { frame_index, cause }),
            };
        }

        Ok(())
    }

    /// 1フレーム分の処理。ここでの失敗はすべて診断に回し、フレームは必ず書き出せる状態で返す
    fn process_frame<F>(&mut self, frame: &mut F, frame_index: u64, effective_fps: f64, state: &mut RunState)
    where
        F: Raster,
        T: RegionTracker<F>,
        P: PoseEstimator<F>,
    {
        let Some(region) = self.track(frame, frame_index) else {
            return;
        };
        state.frames_tracked += 1;

        let timestamp = frame_index as f64 / effective_fps;
        self.annotate_region(frame, &region, frame_index, timestamp, state);

        if let Err(e) = draw_region(frame, &region) {
            self.degraded(frame_index, FrameStage::Annotation, &e);
        }
    }

    fn track<F>(&mut self, frame: &F, frame_index: u64) -> Option<BBox>
    where
        F: Raster,
        T: RegionTracker<F>,
    {
        let tracked = match self.tracker.update(frame) {
            Ok(Some(region)) => region,
            Ok(None) => {
                self.diagnostics.notice(PipelineNotice::TrackingLost { frame_index });
                return None;
            }
            Err(e) => {
                self.degraded(frame_index, FrameStage::Tracking, &e);
                self.diagnostics.notice(PipelineNotice::TrackingLost { frame_index });
                return None;
            }
        };

        let (width, height) = frame.size();
        match tracked.clamp_to(width, height) {
            Some(region) => Some(region),
            None => {
                self.diagnostics.notice(PipelineNotice::RegionOutOfFrame {
                    frame_index,
                    region: tracked,
                });
                None
            }
        }
    }

    /// 領域内で姿勢推定と判定を行い、描画したクロップを元の位置に戻す
    fn annotate_region<F>(&mut self, frame: &mut F, region: &BBox, frame_index: u64, timestamp: f64, state: &mut RunState)
    where
        F: Raster,
        P: PoseEstimator<F>,
    {
        let mut crop = match frame.crop(region) {
            Ok(crop) => crop,
            Err(e) => {
                self.degraded(frame_index, FrameStage::Crop, &e);
                return;
            }
        };

        let landmarks = match self.estimator.estimate(&crop) {
            Ok(Some(landmarks)) if !landmarks.is_empty() => landmarks,
            Ok(_) => {
                self.diagnostics.notice(PipelineNotice::NoLandmarks { frame_index });
                return;
            }
            Err(e) => {
                self.degraded(frame_index, FrameStage::PoseEstimation, &e);
                return;
            }
        };
        state.frames_with_landmarks += 1;

        if let Err(e) = draw_landmarks(&mut crop, &landmarks) {
            self.degraded(frame_index, FrameStage::Annotation, &e);
        }

        let analysis = analyze_landmarks(&landmarks, &state.jump, timestamp, region.size(), &self.settings);
        state.jump = analysis.jump;

        for (measurement, reason) in analysis.unavailable {
            self.diagnostics.notice(PipelineNotice::MeasurementUnavailable {
                frame_index,
                measurement,
                reason,
            });
        }
        if let Some(report) = analysis.posture {
            self.diagnostics.notice(PipelineNotice::Posture { frame_index, report });
        }
        for event in analysis.events {
            self.diagnostics.notice(PipelineNotice::EventRecorded {
                frame_index,
                event: event.clone(),
            });
            state.events.push(event);
        }

        if let Err(e) = frame.paste(&crop, region) {
            self.degraded(frame_index, FrameStage::Annotation, &e);
        }
    }

    fn degraded(&mut self, frame_index: u64, stage: FrameStage, error: &anyhow::Error) {
        self.diagnostics.notice(PipelineNotice::FrameDegraded {
            frame_index,
            stage,
            reason: format!("{:#}", error),
        });
    }
}
