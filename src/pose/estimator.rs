use anyhow::Result;

use super::keypoint::LandmarkSet;

/// 姿勢推定器
///
/// 与えられた画像（追跡領域のクロップ）からランドマークを推定する。
/// 人物が見つからない場合は `Ok(None)`。推定器内部の平滑化以外に状態を持たないこと。
pub trait PoseEstimator<F> {
    fn estimate(&mut self, image: &F) -> Result<Option<LandmarkSet>>;
}
