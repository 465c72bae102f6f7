use super::event::{Event, EventKind};
use crate::config::JumpConfig;

/// 腰の高さの変化から踏み切り・着地を判定する2状態マシン（接地 / ジャンプ中）
///
/// 画像座標なので y が小さいほど上。`previous_hip_y - hip_y > 0` は腰が上がったことを意味する。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JumpState {
    pub is_jumping: bool,
    /// 直前に腰が取れたフレームの腰の y（正規化）
    pub previous_hip_y: Option<f64>,
    /// 最後の踏み切り時刻（秒）
    pub jump_start_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JumpUpdate {
    pub state: JumpState,
    pub event: Option<Event>,
}

impl JumpState {
    /// 1フレーム分進めた状態を返す。自身は変更しない
    ///
    /// - 前フレームの腰が無ければ判定せず、腰の値だけ記録する
    /// - 接地中に上昇量が `rise_threshold` を超えたら踏み切り、Jump イベントを出す
    /// - ジャンプ中に上昇量が `land_threshold` 未満になったら着地（イベントなし）
    pub fn advance(
        &self,
        hip_y: f64,
        timestamp: f64,
        region_height_px: u32,
        config: &JumpConfig,
    ) -> JumpUpdate {
        let mut state = JumpState {
            previous_hip_y: Some(hip_y),
            ..*self
        };
        let mut event = None;

        if let Some(previous) = self.previous_hip_y {
            let rise = previous - hip_y;

            if !self.is_jumping && rise > config.rise_threshold {
                state.is_jumping = true;
                state.jump_start_time = Some(timestamp);
                let rise_px = (rise * region_height_px as f64).round() as i64;
                event = Some(Event::new(
                    timestamp,
                    EventKind::Jump,
                    format!(
                        "At {:.2}s, you jumped {}px. Try jumping at least {}px higher.",
                        timestamp, rise_px, config.min_height_px
                    ),
                ));
            } else if self.is_jumping && rise < config.land_threshold {
                state.is_jumping = false;
            }
        }

        JumpUpdate { state, event }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grounded_at(previous_hip_y: f64) -> JumpState {
        JumpState {
            previous_hip_y: Some(previous_hip_y),
            ..JumpState::default()
        }
    }

    #[test]
    fn test_initial_state() {
        let state = JumpState::default();
        assert!(!state.is_jumping);
        assert_eq!(state.previous_hip_y, None);
        assert_eq!(state.jump_start_time, None);
    }

    #[test]
    fn test_takeoff_reports_pixel_rise() {
        let update = grounded_at(0.50).advance(0.40, 1.5, 200, &JumpConfig::default());

        assert!(update.state.is_jumping);
        assert_eq!(update.state.jump_start_time, Some(1.5));
        assert_eq!(update.state.previous_hip_y, Some(0.40));

        let event = update.event.expect("jump event");
        assert_eq!(event.kind, EventKind::Jump);
        assert_eq!(event.timestamp, 1.5);
        assert_eq!(
            event.message,
            "At 1.50s, you jumped 20px. Try jumping at least 10px higher."
        );
    }

    #[test]
    fn test_first_sample_never_transitions() {
        for hip_y in [0.0, 0.3, 0.9] {
            let update = JumpState::default().advance(hip_y, 0.0, 200, &JumpConfig::default());
            assert!(!update.state.is_jumping);
            assert!(update.event.is_none());
            assert_eq!(update.state.previous_hip_y, Some(hip_y));
        }
    }

    #[test]
    fn test_small_rise_stays_grounded() {
        let update = grounded_at(0.50).advance(0.47, 0.1, 200, &JumpConfig::default());
        assert!(!update.state.is_jumping);
        assert!(update.event.is_none());
    }

    #[test]
    fn test_landing_emits_nothing() {
        let jumping = JumpState {
            is_jumping: true,
            previous_hip_y: Some(0.40),
            jump_start_time: Some(1.0),
        };
        let update = jumping.advance(0.45, 1.2, 200, &JumpConfig::default());
        assert!(!update.state.is_jumping);
        assert!(update.event.is_none());
        assert_eq!(update.state.jump_start_time, Some(1.0));
    }

    #[test]
    fn test_still_rising_keeps_jumping() {
        let jumping = JumpState {
            is_jumping: true,
            previous_hip_y: Some(0.40),
            jump_start_time: Some(1.0),
        };
        let update = jumping.advance(0.37, 1.1, 200, &JumpConfig::default());
        assert!(update.state.is_jumping);
        assert!(update.event.is_none());
    }

    #[test]
    fn test_no_second_event_while_jumping() {
        let jumping = JumpState {
            is_jumping: true,
            previous_hip_y: Some(0.50),
            jump_start_time: Some(1.0),
        };
        let update = jumping.advance(0.30, 1.1, 200, &JumpConfig::default());
        assert!(update.state.is_jumping);
        assert!(update.event.is_none());
    }

    #[test]
    fn test_advance_is_pure() {
        let state = grounded_at(0.50);
        let config = JumpConfig::default();
        let first = state.advance(0.40, 2.0, 200, &config);
        let second = state.advance(0.40, 2.0, 200, &config);
        assert_eq!(first, second);
        assert_eq!(state, grounded_at(0.50));
    }

    #[test]
    fn test_custom_thresholds() {
        let config = JumpConfig {
            rise_threshold: 0.2,
            land_threshold: 0.0,
            min_height_px: 25,
        };
        assert!(grounded_at(0.50).advance(0.40, 0.0, 200, &config).event.is_none());

        let update = grounded_at(0.70).advance(0.40, 0.0, 100, &config);
        let event = update.event.unwrap();
        assert_eq!(
            event.message,
            "At 0.00s, you jumped 30px. Try jumping at least 25px higher."
        );
    }
}
