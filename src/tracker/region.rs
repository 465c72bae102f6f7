use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 追跡領域（ピクセル座標）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> i64 {
        if self.is_empty() {
            return 0;
        }
        self.width as i64 * self.height as i64
    }

    /// 幅か高さが 0 以下（未選択）
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// フレーム境界でクリップする。何も残らなければ None
    pub fn clamp_to(&self, frame_w: u32, frame_h: u32) -> Option<BBox> {
        let fw = i64::from(frame_w);
        let fh = i64::from(frame_h);
        let x0 = i64::from(self.x).clamp(0, fw);
        let y0 = i64::from(self.y).clamp(0, fh);
        let x1 = (i64::from(self.x) + i64::from(self.width)).clamp(0, fw);
        let y1 = (i64::from(self.y) + i64::from(self.height)).clamp(0, fh);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some(BBox {
            x: x0 as i32,
            y: y0 as i32,
            width: (x1 - x0) as i32,
            height: (y1 - y0) as i32,
        })
    }

    /// クロップ画像のサイズ (width, height)。空なら (0, 0)
    pub fn size(&self) -> (u32, u32) {
        if self.is_empty() {
            return (0, 0);
        }
        (self.width as u32, self.height as u32)
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseBBoxError {
    #[error("expected four comma-separated integers x,y,w,h (got {0} values)")]
    Arity(usize),
    #[error("invalid integer {0:?} in box")]
    Integer(String),
}

impl FromStr for BBox {
    type Err = ParseBBoxError;

    /// "x,y,w,h"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(ParseBBoxError::Arity(parts.len()));
        }
        let mut values = [0i32; 4];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = part
                .parse()
                .map_err(|_| ParseBBoxError::Integer(part.to_string()))?;
        }
        let [x, y, width, height] = values;
        Ok(BBox::new(x, y, width, height))
    }
}
