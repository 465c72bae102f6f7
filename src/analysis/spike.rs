use std::fmt;

use serde::Serialize;

use super::angle::joint_angle;
use super::event::{Event, EventKind};
use super::{Outcome, Unavailable};
use crate::config::SpikeConfig;
use crate::pose::{Landmark, LandmarkSet, Point2D};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// 評価順（左が先）
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn shoulder(self) -> Landmark {
        match self {
            Side::Left => Landmark::LeftShoulder,
            Side::Right => Landmark::RightShoulder,
        }
    }

    pub fn elbow(self) -> Landmark {
        match self {
            Side::Left => Landmark::LeftElbow,
            Side::Right => Landmark::RightElbow,
        }
    }

    pub fn wrist(self) -> Landmark {
        match self {
            Side::Left => Landmark::LeftWrist,
            Side::Right => Landmark::RightWrist,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct Arm {
    shoulder: Point2D,
    elbow: Point2D,
    wrist: Point2D,
}

fn arm(side: Side, landmarks: &LandmarkSet) -> Result<Arm, Unavailable> {
    Ok(Arm {
        shoulder: landmarks.require(side.shoulder())?,
        elbow: landmarks.require(side.elbow())?,
        wrist: landmarks.require(side.wrist())?,
    })
}

/// 片側の腕についてスパイク時の肘の伸びすぎを判定する
///
/// ジャンプ中・手首が肩より上・肘角度が閾値超え、の3条件がすべて揃ったときだけ
/// Spike イベントを返す。肘角度は `roi_size` のピクセル空間で計算する
/// （正規化座標のままだと縦横比で角度が歪むため）。
pub fn evaluate_spike(
    side: Side,
    landmarks: &LandmarkSet,
    is_jumping: bool,
    timestamp: f64,
    roi_size: (u32, u32),
    config: &SpikeConfig,
) -> Outcome<Option<Event>> {
    let arm = match arm(side, landmarks) {
        Ok(arm) => arm,
        Err(reason) => return Outcome::Unavailable(reason),
    };

    let (w, h) = roi_size;
    let angle = match joint_angle(arm.shoulder.scaled(w, h), arm.elbow.scaled(w, h), arm.wrist.scaled(w, h)) {
        Outcome::Computed(angle) => angle,
        Outcome::Unavailable(reason) => return Outcome::Unavailable(reason),
    };

    let wrist_above_shoulder = arm.wrist.y < arm.shoulder.y;
    if !(is_jumping && wrist_above_shoulder && angle > config.elbow_angle_threshold) {
        return Outcome::Computed(None);
    }

    Outcome::Computed(Some(Event::new(
        timestamp,
        EventKind::Spike,
        format!(
            "At {:.2}s, during your spike, your {} elbow angle was {}°. Try to keep it below {:.0}°.",
            timestamp,
            side,
            angle.round() as i64,
            config.elbow_angle_threshold
        ),
    )))
}
