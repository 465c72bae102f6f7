use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Jump,
    Spike,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Jump => "Jump",
            EventKind::Spike => "Spike",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Jump" => Ok(EventKind::Jump),
            "Spike" => Ok(EventKind::Spike),
            other => Err(format!("unknown event kind: {}", other)),
        }
    }
}

/// タイムスタンプつきのフィードバック
///
/// 生成後は変更しない。処理順に追加されるので、並びがそのまま時系列順になる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// 動画先頭からの秒数（`frame_index / effective_fps`）
    pub timestamp: f64,
    pub kind: EventKind,
    pub message: String,
}

impl Event {
    pub fn new(timestamp: f64, kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            kind,
            message: message.into(),
        }
    }
}
