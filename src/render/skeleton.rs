use anyhow::Result;

use super::raster::{Color, Raster};
use crate::pose::{Landmark, LandmarkSet};
use crate::tracker::BBox;

/// 骨格の接続定義 (開始ランドマーク, 終了ランドマーク)
pub const SKELETON_CONNECTIONS: [(Landmark, Landmark); 16] = [
    // 顔
    (Landmark::LeftEar, Landmark::LeftEye),
    (Landmark::LeftEye, Landmark::Nose),
    (Landmark::Nose, Landmark::RightEye),
    (Landmark::RightEye, Landmark::RightEar),
    // 上半身
    (Landmark::LeftShoulder, Landmark::RightShoulder),
    (Landmark::LeftShoulder, Landmark::LeftElbow),
    (Landmark::LeftElbow, Landmark::LeftWrist),
    (Landmark::RightShoulder, Landmark::RightElbow),
    (Landmark::RightElbow, Landmark::RightWrist),
    // 胴体
    (Landmark::LeftShoulder, Landmark::LeftHip),
    (Landmark::RightShoulder, Landmark::RightHip),
    (Landmark::LeftHip, Landmark::RightHip),
    // 下半身
    (Landmark::LeftHip, Landmark::LeftKnee),
    (Landmark::LeftKnee, Landmark::LeftAnkle),
    (Landmark::RightHip, Landmark::RightKnee),
    (Landmark::RightKnee, Landmark::RightAnkle),
];

/// ランドマークの色
pub const KEYPOINT_COLOR: Color = Color::rgb(255, 0, 0);

/// 骨格線の色
pub const SKELETON_COLOR: Color = Color::rgb(255, 255, 0);

/// 追跡領域の枠の色（緑）
pub const REGION_COLOR: Color = Color::rgb(0, 255, 0);

pub const KEYPOINT_RADIUS: i32 = 4;
pub const SKELETON_THICKNESS: i32 = 2;
pub const REGION_THICKNESS: i32 = 2;

/// クロップ画像にランドマークと骨格を描く（座標はクロップ基準の正規化座標）
pub fn draw_landmarks<R: Raster>(canvas: &mut R, landmarks: &LandmarkSet) -> Result<()> {
    let (w, h) = canvas.size();

    for (start, end) in SKELETON_CONNECTIONS.iter() {
        if let (Some(a), Some(b)) = (landmarks.get(*start), landmarks.get(*end)) {
            canvas.draw_line(a.to_pixel(w, h), b.to_pixel(w, h), SKELETON_COLOR, SKELETON_THICKNESS)?;
        }
    }

    for (_, point) in landmarks.iter() {
        canvas.draw_dot(point.to_pixel(w, h), KEYPOINT_RADIUS, KEYPOINT_COLOR)?;
    }
    Ok(())
}

/// フレーム上に追跡領域の枠を描く
pub fn draw_region<R: Raster>(canvas: &mut R, region: &BBox) -> Result<()> {
    canvas.draw_rect(region, REGION_COLOR, REGION_THICKNESS)
}
