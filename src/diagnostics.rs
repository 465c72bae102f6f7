use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analysis::{Event, PostureReport, Side, Unavailable};
use crate::tracker::BBox;
use crate::video::{OutputSpec, Rotation};

/// フレーム処理のどの段階で劣化したか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FrameStage {
    Tracking,
    Crop,
    PoseEstimation,
    Annotation,
}

/// 計算できなかった測定値
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Measurement {
    HipHeight,
    Spike(Side),
}

/// パイプラインから診断先へ送られる通知
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineNotice {
    Started {
        rotation: Rotation,
        region: BBox,
        effective_fps: f64,
        output: OutputSpec,
    },
    TrackingLost {
        frame_index: u64,
    },
    /// トラッカーの領域がフレーム外に出た
    RegionOutOfFrame {
        frame_index: u64,
        region: BBox,
    },
    NoLandmarks {
        frame_index: u64,
    },
    FrameDegraded {
        frame_index: u64,
        stage: FrameStage,
        reason: String,
    },
    MeasurementUnavailable {
        frame_index: u64,
        measurement: Measurement,
        reason: Unavailable,
    },
    Posture {
        frame_index: u64,
        report: PostureReport,
    },
    EventRecorded {
        frame_index: u64,
        event: Event,
    },
    Finished {
        frames_written: u64,
        frames_tracked: u64,
        events: usize,
    },
    Discarded {
        reason: String,
    },
}

impl PipelineNotice {
    pub fn frame_index(&self) -> Option<u64> {
        match self {
            PipelineNotice::TrackingLost { frame_index }
            | PipelineNotice::RegionOutOfFrame { frame_index, .. }
            | PipelineNotice::NoLandmarks { frame_index }
            | PipelineNotice::FrameDegraded { frame_index, .. }
            | PipelineNotice::MeasurementUnavailable { frame_index, .. }
            | PipelineNotice::Posture { frame_index, .. }
            | PipelineNotice::EventRecorded { frame_index, .. } => Some(*frame_index),
            PipelineNotice::Started { .. }
            | PipelineNotice::Finished { .. }
            | PipelineNotice::Discarded { .. } => None,
        }
    }
}

/// 診断情報の受け取り先
pub trait Diagnostics {
    fn notice(&mut self, notice: PipelineNotice);
}

impl<D: Diagnostics + ?Sized> Diagnostics for &mut D {
    fn notice(&mut self, notice: PipelineNotice) {
        (**self).notice(notice);
    }
}

/// `tracing` に流す
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn notice(&mut self, notice: PipelineNotice) {
        match notice {
            PipelineNotice::Started {
                rotation,
                region,
                effective_fps,
                output,
            } => info!(
                %rotation,
                %region,
                effective_fps,
                "Processing {}x{} at {:.2} fps",
                output.width,
                output.height,
                output.fps
            ),
            PipelineNotice::TrackingLost { frame_index } => {
                warn!(frame_index, "Tracking lost")
            }
            PipelineNotice::RegionOutOfFrame { frame_index, region } => {
                warn!(frame_index, %region, "Tracked region left the frame")
            }
            PipelineNotice::NoLandmarks { frame_index } => {
                debug!(frame_index, "No landmarks detected")
            }
            PipelineNotice::FrameDegraded {
                frame_index,
                stage,
                reason,
            } => warn!(frame_index, ?stage, "Frame degraded: {}", reason),
            PipelineNotice::MeasurementUnavailable {
                frame_index,
                measurement,
                reason,
            } => debug!(frame_index, ?measurement, "Unavailable: {}", reason),
            PipelineNotice::Posture { frame_index, report } => {
                info!(frame_index, "{}", report.summary())
            }
            PipelineNotice::EventRecorded { event, .. } => {
                info!(kind = %event.kind, "{}", event.message)
            }
            PipelineNotice::Finished {
                frames_written,
                frames_tracked,
                events,
            } => info!(frames_written, frames_tracked, events, "Finished"),
            PipelineNotice::Discarded { reason } => warn!("Output discarded: {}", reason),
        }
    }
}

/// 通知をすべて保持する（テスト・集計用）
#[derive(Debug, Default, Clone)]
pub struct MemoryDiagnostics {
    notices: Vec<PipelineNotice>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> &[PipelineNotice] {
        &self.notices
    }

    pub fn tracking_lost_frames(&self) -> Vec<u64> {
        self.notices
            .iter()
            .filter_map(|n| match n {
                PipelineNotice::TrackingLost { frame_index } => Some(*frame_index),
                _ => None,
            })
            .collect()
    }

    pub fn unavailable(&self) -> Vec<(u64, Measurement, Unavailable)> {
        self.notices
            .iter()
            .filter_map(|n| match n {
                PipelineNotice::MeasurementUnavailable {
                    frame_index,
                    measurement,
                    reason,
                } => Some((*frame_index, *measurement, *reason)),
                _ => None,
            })
            .collect()
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn notice(&mut self, notice: PipelineNotice) {
        self.notices.push(notice);
    }
}
