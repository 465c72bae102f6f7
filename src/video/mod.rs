#[cfg(feature = "desktop")]
pub mod capture;
pub mod memory;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[cfg(feature = "desktop")]
pub use capture::{VideoFileSink, VideoFileSource};
pub use memory::{FrameStore, MemorySink, MemorySource};

/// フレームに適用する時計回りの回転
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("rotation must be one of 0, 90, 180, 270 degrees (got {0})")]
pub struct InvalidRotation(pub i64);

impl Rotation {
    /// 360 の倍数ずれは同一視する（-90 は 270）
    pub fn from_degrees(degrees: i64) -> Result<Self, InvalidRotation> {
        match degrees.rem_euclid(360) {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Clockwise90),
            180 => Ok(Rotation::Clockwise180),
            270 => Ok(Rotation::Clockwise270),
            _ => Err(InvalidRotation(degrees)),
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }

    /// 回転後のフレームサイズ
    pub fn rotated_size(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            Rotation::None | Rotation::Clockwise180 => (width, height),
            Rotation::Clockwise90 | Rotation::Clockwise270 => (height, width),
        }
    }
}

impl TryFrom<u32> for Rotation {
    type Error = InvalidRotation;

    fn try_from(degrees: u32) -> Result<Self, Self::Error> {
        if degrees >= 360 {
            return Err(InvalidRotation(degrees as i64));
        }
        Rotation::from_degrees(degrees as i64)
    }
}

impl From<Rotation> for u32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl FromStr for Rotation {
    type Err = InvalidRotation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let degrees: u32 = s.trim().parse().map_err(|_| InvalidRotation(-1))?;
        Rotation::try_from(degrees)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// 出力動画の仕様（回転後のサイズと出力fps）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputSpec {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

/// 動画のデコード側
pub trait FrameSource<F> {
    /// コンテナのfps。不明なら None
    fn fps(&self) -> Option<f64>;
    /// コンテナの回転メタデータ
    fn rotation_hint(&self) -> Option<Rotation>;
    /// 次のフレーム。終端なら `Ok(None)`
    fn next_frame(&mut self) -> Result<Option<F>>;
}

/// 動画のエンコード側
///
/// `finish` されるまで出力は確定しない。`discard` は書きかけを削除する。
/// `finish` が失敗した場合も書きかけは残さない。
pub trait FrameSink<F> {
    fn write(&mut self, frame: &F) -> Result<()>;
    fn finish(self) -> Result<()>
    where
        Self: Sized;
    fn discard(self) -> Result<()>
    where
        Self: Sized;
}

/// "avc1" などの4文字コーデック指定を検証して分解する
pub fn parse_fourcc(code: &str) -> Result<[char; 4]> {
    let chars: Vec<char> = code.chars().collect();
    if chars.len() != 4 || !chars.iter().all(|c| c.is_ascii_graphic()) {
        bail!("fourcc must be exactly four printable ASCII characters (got {:?})", code);
    }
    Ok([chars[0], chars[1], chars[2], chars[3]])
}
