use anyhow::{Context, Result};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use opencv::{core::Mat, prelude::*};
use std::path::Path;

use super::estimator::PoseEstimator;
use super::keypoint::{Keypoint, Landmark, LandmarkSet};
use super::preprocess::preprocess_for_movenet;

/// MoveNet (ONNX) による単一人物の姿勢推定
pub struct MoveNetEstimator {
    session: Session,
    min_confidence: f32,
}

impl MoveNetEstimator {
    /// ONNXモデルを読み込んで初期化
    pub fn new<P: AsRef<Path>>(model_path: P, min_confidence: f32) -> Result<Self> {
        let model_path = model_path.as_ref();
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path)
            .with_context(|| format!("Failed to load ONNX model {}", model_path.display()))?;

        Ok(Self {
            session,
            min_confidence,
        })
    }

    fn infer(&mut self, crop: &Mat) -> Result<[Keypoint; Landmark::COUNT]> {
        let input = Tensor::from_array(preprocess_for_movenet(crop)?)?;
        let outputs = self
            .session
            .run(ort::inputs!["serving_default_input_0" => input])
            .context("Inference failed")?;

        // 出力は [1, 1, 17, 3] (y, x, confidence)
        let output: ndarray::ArrayViewD<f32> = outputs["StatefulPartitionedCall_0"]
            .try_extract_array()
            .context("Failed to extract output tensor")?;

        let mut keypoints = [Keypoint::default(); Landmark::COUNT];
        for (i, keypoint) in keypoints.iter_mut().enumerate() {
            *keypoint = Keypoint::new(output[[0, 0, i, 1]], output[[0, 0, i, 0]], output[[0, 0, i, 2]]);
        }
        Ok(keypoints)
    }
}

impl PoseEstimator<Mat> for MoveNetEstimator {
    fn estimate(&mut self, image: &Mat) -> Result<Option<LandmarkSet>> {
        if image.empty() {
            return Ok(None);
        }
        let keypoints = self.infer(image)?;
        let landmarks = LandmarkSet::from_keypoints(&keypoints, self.min_confidence);
        Ok((!landmarks.is_empty()).then_some(landmarks))
    }
}
