use serde::Serialize;

use crate::analysis::{Outcome, Unavailable};

/// MoveNet の 17 ランドマーク
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(usize)]
pub enum Landmark {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl Landmark {
    pub const COUNT: usize = 17;

    pub const ALL: [Landmark; Self::COUNT] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// モデル出力そのままのキーポイント（信頼度つき）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Keypoint {
    /// 正規化されたX座標 (0.0〜1.0)
    pub x: f32,
    /// 正規化されたY座標 (0.0〜1.0)
    pub y: f32,
    /// 信頼度スコア (0.0〜1.0)
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// 信頼度が閾値以上か
    pub fn is_valid(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }
}

/// 画像に対する正規化座標。y は下向きが正（小さいほど上）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// width x height の領域のピクセル空間へスケール
    pub fn scaled(&self, width: u32, height: u32) -> Point2D {
        Point2D::new(self.x * width as f64, self.y * height as f64)
    }

    /// 描画用の整数ピクセル座標
    pub fn to_pixel(&self, width: u32, height: u32) -> (i32, i32) {
        let p = self.scaled(width, height);
        (p.x as i32, p.y as i32)
    }
}

/// 1フレーム分のランドマーク集合
///
/// 推定器が見つけられなかった（または信頼度が低い）ランドマークは `None`。
/// フレームをまたいで保持しない。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LandmarkSet {
    points: [Option<Point2D>; Landmark::COUNT],
}

impl LandmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 信頼度が `min_confidence` 以上のキーポイントだけを採用
    pub fn from_keypoints(keypoints: &[Keypoint; Landmark::COUNT], min_confidence: f32) -> Self {
        let mut set = Self::new();
        for (landmark, kp) in Landmark::ALL.iter().zip(keypoints.iter()) {
            if kp.is_valid(min_confidence) {
                set.insert(*landmark, Point2D::new(kp.x as f64, kp.y as f64));
            }
        }
        set
    }

    pub fn insert(&mut self, landmark: Landmark, point: Point2D) {
        self.points[landmark as usize] = Some(point);
    }

    pub fn with(mut self, landmark: Landmark, x: f64, y: f64) -> Self {
        self.insert(landmark, Point2D::new(x, y));
        self
    }

    pub fn get(&self, landmark: Landmark) -> Option<Point2D> {
        self.points[landmark as usize]
    }

    pub fn require(&self, landmark: Landmark) -> Result<Point2D, Unavailable> {
        self.get(landmark).ok_or(Unavailable::MissingLandmark(landmark))
    }

    /// 左右ヒップの中点の y
    pub fn hip_midpoint_y(&self) -> Outcome<f64> {
        let hips = self
            .require(Landmark::LeftHip)
            .and_then(|left| Ok((left, self.require(Landmark::RightHip)?)));
        match hips {
            Ok((left, right)) => Outcome::Computed((left.y + right.y) / 2.0),
            Err(reason) => Outcome::Unavailable(reason),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Landmark, Point2D)> + '_ {
        Landmark::ALL
            .iter()
            .zip(self.points.iter())
            .filter_map(|(landmark, point)| point.map(|p| (*landmark, p)))
    }

    pub fn visible_count(&self) -> usize {
        self.points.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.visible_count() == 0
    }
}
