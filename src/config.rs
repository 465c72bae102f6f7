use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::pipeline::PipelineSettings;
use crate::video::{parse_fourcc, Rotation};

/// `--config` を省略したときに探す設定ファイル
pub const DEFAULT_CONFIG_PATH: &str = "spike_coach.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub jump: JumpConfig,
    #[serde(default)]
    pub spike: SpikeConfig,
    #[serde(default)]
    pub posture: PostureConfig,
    #[serde(default)]
    pub video: VideoConfig,
    #[serde(default)]
    pub pose: PoseConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct JumpConfig {
    /// 1フレームでこれを超えて腰が上がったら踏み切り（領域高さに対する割合）
    #[serde(default = "default_rise_threshold")]
    pub rise_threshold: f64,
    /// 上昇量がこれ未満になったら着地
    #[serde(default = "default_land_threshold")]
    pub land_threshold: f64,
    /// フィードバック文に出す目標ジャンプ高さ（ピクセル）
    #[serde(default = "default_min_height_px")]
    pub min_height_px: u32,
}

fn default_rise_threshold() -> f64 { 0.05 }
fn default_land_threshold() -> f64 { 0.01 }
fn default_min_height_px() -> u32 { 10 }

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            rise_threshold: default_rise_threshold(),
            land_threshold: default_land_threshold(),
            min_height_px: default_min_height_px(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct SpikeConfig {
    /// ジャンプ中に肘がこの角度（度）を超えて伸びていたら指摘する
    #[serde(default = "default_elbow_angle_threshold")]
    pub elbow_angle_threshold: f64,
}

fn default_elbow_angle_threshold() -> f64 { 130.0 }

impl Default for SpikeConfig {
    fn default() -> Self {
        Self {
            elbow_angle_threshold: default_elbow_angle_threshold(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct PostureConfig {
    /// 毎フレームの膝・肘角度レポートを診断ストリームに流す
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_bent_below")]
    pub bent_below: f64,
    #[serde(default = "default_straight_above")]
    pub straight_above: f64,
}

fn default_bent_below() -> f64 { 90.0 }
fn default_straight_above() -> f64 { 160.0 }

impl Default for PostureConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bent_below: default_bent_below(),
            straight_above: default_straight_above(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct VideoConfig {
    /// 強制回転（時計回り 0/90/180/270）。未指定ならコンテナのメタデータに従う
    #[serde(default)]
    pub rotation: Option<Rotation>,
    /// 出力fps = 入力fps / fps_divisor（2 で半分の速さで再生）
    #[serde(default = "default_fps_divisor")]
    pub fps_divisor: f64,
    /// 何フレームごとに処理するか
    #[serde(default = "default_stride")]
    pub stride: u32,
    /// コンテナからfpsが取れないときの値
    #[serde(default = "default_fps")]
    pub default_fps: f64,
    #[serde(default = "default_fourcc")]
    pub fourcc: String,
}

fn default_fps_divisor() -> f64 { 1.0 }
fn default_stride() -> u32 { 1 }
fn default_fps() -> f64 { 30.0 }
fn default_fourcc() -> String { "avc1".to_string() }

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            rotation: None,
            fps_divisor: default_fps_divisor(),
            stride: default_stride(),
            default_fps: default_fps(),
            fourcc: default_fourcc(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PoseConfig {
    /// MoveNet ONNX モデルのパス
    #[serde(default = "default_model")]
    pub model: String,
    /// これ未満の信頼度のキーポイントは未検出扱い
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
}

fn default_model() -> String { "models/movenet_lightning.onnx".to_string() }
fn default_min_confidence() -> f32 { 0.3 }

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            min_confidence: default_min_confidence(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// 明示されたファイルは読めなければエラー、省略時は既定の場所を探してなければデフォルト
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Ok(Self::load_or_default(DEFAULT_CONFIG_PATH)),
        }
    }

    /// 読めなければ警告を出してデフォルト設定を使う
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{:#}; falling back to defaults", e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.pipeline_settings().validate()?;
        parse_fourcc(&self.video.fourcc)?;
        if !(0.0..=1.0).contains(&self.pose.min_confidence) {
            bail!("pose.min_confidence must be within 0..=1 (got {})", self.pose.min_confidence);
        }
        Ok(())
    }

    /// パイプライン1回分の設定を切り出す
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            jump: self.jump,
            spike: self.spike,
            posture: self.posture,
            rotation: self.video.rotation,
            fps_divisor: self.video.fps_divisor,
            stride: self.video.stride,
            default_fps: self.video.default_fps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.jump, JumpConfig::default());
        assert_eq!(config.spike.elbow_angle_threshold, 130.0);
        assert_eq!(config.video.rotation, None);
        assert_eq!(config.video.stride, 1);
        assert_eq!(config.video.fourcc, "avc1");
        assert!(!config.posture.enabled);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [jump]
            rise_threshold = 0.08

            [video]
            rotation = 270
            fps_divisor = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(config.jump.rise_threshold, 0.08);
        assert_eq!(config.jump.land_threshold, 0.01);
        assert_eq!(config.video.rotation, Some(Rotation::Clockwise270));

        let settings = config.pipeline_settings();
        assert_eq!(settings.fps_divisor, 2.0);
        assert_eq!(settings.rotation, Some(Rotation::Clockwise270));
    }

    #[test]
    fn test_invalid_rotation_rejected() {
        assert!(Config::parse("[video]\nrotation = 45\n").is_err());
    }

    #[test]
    fn test_invalid_stride_rejected() {
        assert!(Config::parse("[video]\nstride = 0\n").is_err());
    }

    #[test]
    fn test_invalid_fourcc_rejected() {
        assert!(Config::parse("[video]\nfourcc = \"h264x\"\n").is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("does/not/exist.toml");
        assert_eq!(config.pose.min_confidence, 0.3);
    }

    #[test]
    fn test_explicit_malformed_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[jump\nrise_threshold = 0.1\n").unwrap();

        let err = Config::resolve(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.toml"));
        // 既定の場所として読んだ場合だけデフォルトに戻る
        assert_eq!(Config::load_or_default(&path).pose.min_confidence, 0.3);
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::resolve(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_explicit_config_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coach.toml");
        fs::write(&path, "[spike]\nelbow_angle_threshold = 120.0\n").unwrap();

        let config = Config::resolve(Some(&path)).unwrap();
        assert_eq!(config.spike.elbow_angle_threshold, 120.0);
    }
}
