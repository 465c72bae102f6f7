#[cfg(feature = "desktop")]
pub mod csrt;
pub mod region;
#[cfg(feature = "desktop")]
pub mod select;

use anyhow::Result;

#[cfg(feature = "desktop")]
pub use csrt::CsrtTracker;
pub use region::{BBox, ParseBBoxError};
#[cfg(feature = "desktop")]
pub use select::WindowRegionSelector;

/// 単一領域トラッカー
///
/// `init` は1回の実行につき1度だけ呼ばれる。`update` が `Ok(None)` を返したフレームは
/// 見失い扱いで、次のフレームでもトラッカー自身の内部状態から追跡を続ける。
pub trait RegionTracker<F> {
    fn init(&mut self, frame: &F, region: BBox) -> Result<()>;
    fn update(&mut self, frame: &F) -> Result<Option<BBox>>;
}

/// 最初のフレームから初期領域を決める
pub trait RegionSelector<F> {
    fn select(&mut self, first_frame: &F) -> Result<BBox>;
}

impl<F, S: RegionSelector<F> + ?Sized> RegionSelector<F> for Box<S> {
    fn select(&mut self, first_frame: &F) -> Result<BBox> {
        (**self).select(first_frame)
    }
}

/// 呼び出し側が渡した固定の領域（サーバー的な非対話実行用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRegion(pub BBox);

impl<F> RegionSelector<F> for FixedRegion {
    fn select(&mut self, _first_frame: &F) -> Result<BBox> {
        Ok(self.0)
    }
}
