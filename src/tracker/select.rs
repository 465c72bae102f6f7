use anyhow::{Context, Result};
use opencv::{core::Mat, highgui};

use super::{BBox, RegionSelector};

const WINDOW_NAME: &str = "Select Athlete";

/// 最初のフレームをウィンドウに出してマウスで領域を選ばせる
///
/// 何も選ばずに確定すると幅・高さ 0 の領域が返り、パイプラインはそこで中断する。
#[derive(Debug, Default)]
pub struct WindowRegionSelector;

impl RegionSelector<Mat> for WindowRegionSelector {
    fn select(&mut self, first_frame: &Mat) -> Result<BBox> {
        let rect = highgui::select_roi(WINDOW_NAME, first_frame, true, false, true)
            .context("Region selection window failed")?;
        highgui::destroy_window(WINDOW_NAME)?;
        Ok(BBox::new(rect.x, rect.y, rect.width, rect.height))
    }
}
