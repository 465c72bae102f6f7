use std::fmt;

use serde::Serialize;

use super::angle::joint_angle;
use crate::config::PostureConfig;
use crate::pose::{Landmark, LandmarkSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Joint {
    LeftKnee,
    RightKnee,
    LeftElbow,
    RightElbow,
}

impl Joint {
    pub const ALL: [Joint; 4] = [Joint::LeftKnee, Joint::RightKnee, Joint::LeftElbow, Joint::RightElbow];

    /// (端点, 頂点, 端点)
    fn landmarks(self) -> (Landmark, Landmark, Landmark) {
        match self {
            Joint::LeftKnee => (Landmark::LeftHip, Landmark::LeftKnee, Landmark::LeftAnkle),
            Joint::RightKnee => (Landmark::RightHip, Landmark::RightKnee, Landmark::RightAnkle),
            Joint::LeftElbow => (Landmark::LeftShoulder, Landmark::LeftElbow, Landmark::LeftWrist),
            Joint::RightElbow => (Landmark::RightShoulder, Landmark::RightElbow, Landmark::RightWrist),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Joint::LeftKnee => "Left knee",
            Joint::RightKnee => "Right knee",
            Joint::LeftElbow => "Left elbow",
            Joint::RightElbow => "Right elbow",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PostureVerdict {
    NotVisible,
    TooBent,
    TooStraight,
    Good,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JointReading {
    pub joint: Joint,
    pub angle: Option<f64>,
    pub verdict: PostureVerdict,
}

impl fmt::Display for JointReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = match self.verdict {
            PostureVerdict::NotVisible => "not visible",
            PostureVerdict::TooBent => "too bent",
            PostureVerdict::TooStraight => "too straight",
            PostureVerdict::Good => "good",
        };
        write!(f, "{} {}", self.joint.label(), verdict)
    }
}

/// 膝・肘の角度レポート（1フレーム分）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostureReport {
    pub readings: [JointReading; 4],
}

impl PostureReport {
    pub fn reading(&self, joint: Joint) -> &JointReading {
        &self.readings[joint as usize]
    }

    /// "Left knee good; Right knee too bent; ..." 形式
    pub fn summary(&self) -> String {
        self.readings
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

pub fn evaluate_posture(landmarks: &LandmarkSet, roi_size: (u32, u32), config: &PostureConfig) -> PostureReport {
    let (w, h) = roi_size;
    let readings = Joint::ALL.map(|joint| {
        let (a, b, c) = joint.landmarks();
        let angle = match (landmarks.get(a), landmarks.get(b), landmarks.get(c)) {
            (Some(a), Some(b), Some(c)) => joint_angle(a.scaled(w, h), b.scaled(w, h), c.scaled(w, h)).computed(),
            _ => None,
        };
        let verdict = match angle {
            None => PostureVerdict::NotVisible,
            Some(a) if a < config.bent_below => PostureVerdict::TooBent,
            Some(a) if a > config.straight_above => PostureVerdict::TooStraight,
            Some(_) => PostureVerdict::Good,
        };
        JointReading { joint, angle, verdict }
    });
    PostureReport { readings }
}
