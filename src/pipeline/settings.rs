use crate::config::{JumpConfig, PostureConfig, SpikeConfig};
use crate::error::PipelineError;
use crate::video::Rotation;

/// 1回の実行に必要な設定一式
///
/// 実行ごとに値として渡す。プロセス全体で共有される設定は持たない。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub jump: JumpConfig,
    pub spike: SpikeConfig,
    pub posture: PostureConfig,
    /// 強制回転。None ならソースのメタデータ、それも無ければ回転なし
    pub rotation: Option<Rotation>,
    pub fps_divisor: f64,
    pub stride: u32,
    pub default_fps: f64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            jump: JumpConfig::default(),
            spike: SpikeConfig::default(),
            posture: PostureConfig::default(),
            rotation: None,
            fps_divisor: 1.0,
            stride: 1,
            default_fps: 30.0,
        }
    }
}

impl PipelineSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_fps_divisor(mut self, fps_divisor: f64) -> Self {
        self.fps_divisor = fps_divisor;
        self
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        let invalid = |msg: String| Err(PipelineError::InvalidSettings(msg));

        if !(self.jump.rise_threshold.is_finite() && self.jump.rise_threshold > 0.0) {
            return invalid(format!(
                "jump.rise_threshold must be positive (got {})",
                self.jump.rise_threshold
            ));
        }
        if !self.jump.land_threshold.is_finite() {
            return invalid(format!(
                "jump.land_threshold must be finite (got {})",
                self.jump.land_threshold
            ));
        }
        let elbow = self.spike.elbow_angle_threshold;
        if !(elbow > 0.0 && elbow <= 180.0) {
            return invalid(format!(
                "spike.elbow_angle_threshold must be within (0, 180] (got {})",
                elbow
            ));
        }
        if !(self.posture.bent_below < self.posture.straight_above) {
            return invalid(format!(
                "posture.bent_below ({}) must be below posture.straight_above ({})",
                self.posture.bent_below, self.posture.straight_above
            ));
        }
        if !(self.fps_divisor.is_finite() && self.fps_divisor > 0.0) {
            return invalid(format!(
                "video.fps_divisor must be positive (got {})",
                self.fps_divisor
            ));
        }
        if self.stride == 0 {
            return invalid("video.stride must be at least 1".to_string());
        }
        if !(self.default_fps.is_finite() && self.default_fps > 0.0) {
            return invalid(format!(
                "video.default_fps must be positive (got {})",
                self.default_fps
            ));
        }
        Ok(())
    }

    /// ソースのfps（不明なら default_fps）を fps_divisor で割ったもの。タイムスタンプの基準
    pub fn effective_fps(&self, source_fps: Option<f64>) -> f64 {
        let fps = source_fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .unwrap_or(self.default_fps);
        fps / self.fps_divisor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_valid() {
        assert!(PipelineSettings::new().validate().is_ok());
    }

    #[test]
    fn test_zero_stride_rejected() {
        let settings = PipelineSettings::new().with_stride(0);
        assert!(matches!(
            settings.validate(),
            Err(PipelineError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_bad_fps_divisor_rejected() {
        assert!(PipelineSettings::new().with_fps_divisor(0.0).validate().is_err());
        assert!(PipelineSettings::new().with_fps_divisor(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_effective_fps() {
        let settings = PipelineSettings::new().with_fps_divisor(2.0);
        assert_eq!(settings.effective_fps(Some(60.0)), 30.0);
        assert_eq!(settings.effective_fps(None), 15.0);
        assert_eq!(settings.effective_fps(Some(0.0)), 15.0);
    }
}
