pub mod angle;
pub mod event;
pub mod jump;
pub mod posture;
pub mod spike;

use std::fmt;

use serde::Serialize;

use crate::pose::Landmark;

pub use angle::{angle_at, joint_angle};
pub use event::{Event, EventKind};
pub use jump::{JumpState, JumpUpdate};
pub use posture::{evaluate_posture, Joint, JointReading, PostureReport, PostureVerdict};
pub use spike::{evaluate_spike, Side};

/// 値を計算できなかった理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unavailable {
    /// 必要なランドマークが推定されなかった
    MissingLandmark(Landmark),
    /// 辺の長さが 0 で角度が定義できない
    DegenerateAngle,
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::MissingLandmark(landmark) => write!(f, "missing landmark {:?}", landmark),
            Unavailable::DegenerateAngle => write!(f, "degenerate angle (coincident points)"),
        }
    }
}

/// フレーム単位の計算結果
///
/// 失敗はフレームを中断させず、理由つきの `Unavailable` として呼び出し側に返る。
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Computed(T),
    Unavailable(Unavailable),
}

impl<T> Outcome<T> {
    pub fn computed(self) -> Option<T> {
        match self {
            Outcome::Computed(value) => Some(value),
            Outcome::Unavailable(_) => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Outcome::Computed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Computed(value) => Outcome::Computed(f(value)),
            Outcome::Unavailable(reason) => Outcome::Unavailable(reason),
        }
    }
}

impl<T> From<Result<T, Unavailable>> for Outcome<T> {
    fn from(result: Result<T, Unavailable>) -> Self {
        match result {
            Ok(value) => Outcome::Computed(value),
            Err(reason) => Outcome::Unavailable(reason),
        }
    }
}
