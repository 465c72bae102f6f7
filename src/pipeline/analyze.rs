use crate::analysis::{evaluate_posture, evaluate_spike, Event, JumpState, Outcome, PostureReport, Side, Unavailable};
use crate::diagnostics::Measurement;
use crate::pose::LandmarkSet;

use super::PipelineSettings;

/// 1フレーム分の解析結果
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAnalysis {
    /// 次フレームに引き継ぐジャンプ状態
    pub jump: JumpState,
    /// 生成順（Jump → 左 Spike → 右 Spike）
    pub events: Vec<Event>,
    pub unavailable: Vec<(Measurement, Unavailable)>,
    pub posture: Option<PostureReport>,
}

/// ランドマークからイベントを判定する。入力の状態は変更しない
///
/// 腰が取れなければジャンプ状態はそのまま引き継ぎ、そのフレームのスパイク判定も
/// 両側とも行わない。スパイク判定にはこのフレームで更新した後の `is_jumping` を使う。
pub fn analyze_landmarks(
    landmarks: &LandmarkSet,
    jump: &JumpState,
    timestamp: f64,
    roi_size: (u32, u32),
    settings: &PipelineSettings,
) -> FrameAnalysis {
    let mut analysis = FrameAnalysis {
        jump: *jump,
        events: Vec::new(),
        unavailable: Vec::new(),
        posture: None,
    };

    match landmarks.hip_midpoint_y() {
        Outcome::Computed(hip_y) => {
            let update = jump.advance(hip_y, timestamp, roi_size.1, &settings.jump);
            analysis.jump = update.state;
            analysis.events.extend(update.event);

            for side in Side::BOTH {
                match evaluate_spike(
                    side,
                    landmarks,
                    analysis.jump.is_jumping,
                    timestamp,
                    roi_size,
                    &settings.spike,
                ) {
                    Outcome::Computed(event) => analysis.events.extend(event),
                    Outcome::Unavailable(reason) => analysis.unavailable.push((Measurement::Spike(side), reason)),
                }
            }
        }
        Outcome::Unavailable(reason) => {
            // 空中かどうか分からないフレームではスパイクを判定しない
            analysis.unavailable.push((Measurement::HipHeight, reason));
            for side in Side::BOTH {
                analysis.unavailable.push((Measurement::Spike(side), reason));
            }
        }
    }

    if settings.posture.enabled {
        analysis.posture = Some(evaluate_posture(landmarks, roi_size, &settings.posture));
    }

    analysis
}
