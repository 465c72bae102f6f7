use anyhow::{bail, Result};
use image::{imageops, Rgb, RgbImage};

use crate::tracker::BBox;
use crate::video::Rotation;

/// 描画色 (RGB)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// パイプラインが必要とするフレーム操作
///
/// 座標はすべてピクセル単位。範囲外の描画は黙って切り捨てる。
pub trait Raster: Sized {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// 時計回りに回転した新しいフレーム
    fn rotate(&self, rotation: Rotation) -> Result<Self>;

    /// `region` を切り出したコピー。`region` はフレーム内に収まっていること
    fn crop(&self, region: &BBox) -> Result<Self>;

    /// `patch` を `region` の位置に書き戻す
    fn paste(&mut self, patch: &Self, region: &BBox) -> Result<()>;

    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Color, thickness: i32) -> Result<()>;

    /// 塗りつぶした円
    fn draw_dot(&mut self, center: (i32, i32), radius: i32, color: Color) -> Result<()>;

    /// 矩形の枠線（内側に `thickness` ピクセル）
    fn draw_rect(&mut self, region: &BBox, color: Color, thickness: i32) -> Result<()>;
}

fn check_region(width: u32, height: u32, region: &BBox) -> Result<()> {
    if region.clamp_to(width, height) != Some(*region) {
        bail!("region {} is outside the {}x{} frame", region, width, height);
    }
    Ok(())
}

impl Raster for RgbImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn rotate(&self, rotation: Rotation) -> Result<Self> {
        Ok(match rotation {
            Rotation::None => self.clone(),
            Rotation::Clockwise90 => imageops::rotate90(self),
            Rotation::Clockwise180 => imageops::rotate180(self),
            Rotation::Clockwise270 => imageops::rotate270(self),
        })
    }

    fn crop(&self, region: &BBox) -> Result<Self> {
        check_region(Raster::width(self), Raster::height(self), region)?;
        let (w, h) = region.size();
        Ok(imageops::crop_imm(self, region.x as u32, region.y as u32, w, h).to_image())
    }

    fn paste(&mut self, patch: &Self, region: &BBox) -> Result<()> {
        check_region(Raster::width(self), Raster::height(self), region)?;
        if patch.dimensions() != region.size() {
            bail!(
                "patch is {:?} but region {} expects {:?}",
                patch.dimensions(),
                region,
                region.size()
            );
        }
        imageops::replace(self, patch, i64::from(region.x), i64::from(region.y));
        Ok(())
    }

    /// Bresenhamのアルゴリズムで線を描画
    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Color, thickness: i32) -> Result<()> {
        let (x0, y0) = from;
        let (x1, y1) = to;
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let radius = (thickness.max(1) - 1) / 2;

        let mut x = x0;
        let mut y = y0;

        loop {
            if radius == 0 {
                set_pixel(self, x, y, color);
            } else {
                fill_circle(self, x, y, radius, color);
            }

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
        Ok(())
    }

    fn draw_dot(&mut self, center: (i32, i32), radius: i32, color: Color) -> Result<()> {
        fill_circle(self, center.0, center.1, radius, color);
        Ok(())
    }

    fn draw_rect(&mut self, region: &BBox, color: Color, thickness: i32) -> Result<()> {
        if region.is_empty() {
            return Ok(());
        }
        let x0 = region.x;
        let y0 = region.y;
        let x1 = region.x + region.width - 1;
        let y1 = region.y + region.height - 1;
        for t in 0..thickness.max(1) {
            for x in x0..=x1 {
                set_pixel(self, x, y0 + t, color);
                set_pixel(self, x, y1 - t, color);
            }
            for y in y0..=y1 {
                set_pixel(self, x0 + t, y, color);
                set_pixel(self, x1 - t, y, color);
            }
        }
        Ok(())
    }
}

/// 円を描画（塗りつぶし）
fn fill_circle(image: &mut RgbImage, cx: i32, cy: i32, radius: i32, color: Color) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                set_pixel(image, cx + dx, cy + dy, color);
            }
        }
    }
}

/// ピクセルをセット（境界チェック付き）
fn set_pixel(image: &mut RgbImage, x: i32, y: i32, color: Color) {
    let (w, h) = image.dimensions();
    if x >= 0 && (x as u32) < w && y >= 0 && (y as u32) < h {
        image.put_pixel(x as u32, y as u32, Rgb([color.r, color.g, color.b]));
    }
}
