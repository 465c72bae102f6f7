use anyhow::{Context, Result};
use opencv::{
    core::{Mat, Ptr, Rect},
    prelude::*,
    tracking::{TrackerCSRT, TrackerCSRT_Params},
};

use super::{BBox, RegionTracker};

/// OpenCV CSRT による単一領域トラッカー
pub struct CsrtTracker {
    inner: Option<Ptr<TrackerCSRT>>,
}

impl CsrtTracker {
    pub fn new() -> Self {
        Self { inner: None }
    }
}

impl Default for CsrtTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn to_rect(region: BBox) -> Rect {
    Rect::new(region.x, region.y, region.width, region.height)
}

fn from_rect(rect: Rect) -> BBox {
    BBox::new(rect.x, rect.y, rect.width, rect.height)
}

impl RegionTracker<Mat> for CsrtTracker {
    fn init(&mut self, frame: &Mat, region: BBox) -> Result<()> {
        let params = TrackerCSRT_Params::default()?;
        let mut tracker = TrackerCSRT::create(&params).context("Failed to create CSRT tracker")?;
        tracker
            .init(frame, to_rect(region))
            .context("Failed to initialize CSRT tracker")?;
        self.inner = Some(tracker);
        Ok(())
    }

    fn update(&mut self, frame: &Mat) -> Result<Option<BBox>> {
        let tracker = self
            .inner
            .as_mut()
            .context("CSRT tracker updated before init")?;
        let mut rect = Rect::default();
        let found = tracker.update(frame, &mut rect)?;
        Ok(found.then(|| from_rect(rect)))
    }
}
