use anyhow::{bail, Result};
use opencv::{
    core::{self, Mat, Point, Rect, Scalar},
    imgproc,
    prelude::*,
};

use super::raster::{Color, Raster};
use crate::tracker::BBox;
use crate::video::Rotation;

/// OpenCVはBGR順
fn scalar(color: Color) -> Scalar {
    Scalar::new(color.b as f64, color.g as f64, color.r as f64, 0.0)
}

fn rect(region: &BBox) -> Rect {
    Rect::new(region.x, region.y, region.width, region.height)
}

impl Raster for Mat {
    fn width(&self) -> u32 {
        self.cols().max(0) as u32
    }

    fn height(&self) -> u32 {
        self.rows().max(0) as u32
    }

    fn rotate(&self, rotation: Rotation) -> Result<Self> {
        let code = match rotation {
            Rotation::None => return Ok(self.try_clone()?),
            Rotation::Clockwise90 => core::ROTATE_90_CLOCKWISE,
            Rotation::Clockwise180 => core::ROTATE_180,
            Rotation::Clockwise270 => core::ROTATE_90_COUNTERCLOCKWISE,
        };
        let mut rotated = Mat::default();
        core::rotate(self, &mut rotated, code)?;
        Ok(rotated)
    }

    fn crop(&self, region: &BBox) -> Result<Self> {
        if region.clamp_to(Raster::width(self), Raster::height(self)) != Some(*region) {
            bail!("region {} is outside the frame", region);
        }
        let roi = Mat::roi(self, rect(region))?;
        Ok(roi.try_clone()?)
    }

    fn paste(&mut self, patch: &Self, region: &BBox) -> Result<()> {
        if region.clamp_to(Raster::width(self), Raster::height(self)) != Some(*region) {
            bail!("region {} is outside the frame", region);
        }
        let mut target = Mat::roi_mut(self, rect(region))?;
        patch.copy_to(&mut *target)?;
        Ok(())
    }

    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Color, thickness: i32) -> Result<()> {
        imgproc::line(
            self,
            Point::new(from.0, from.1),
            Point::new(to.0, to.1),
            scalar(color),
            thickness.max(1),
            imgproc::LINE_8,
            0,
        )?;
        Ok(())
    }

    fn draw_dot(&mut self, center: (i32, i32), radius: i32, color: Color) -> Result<()> {
        imgproc::circle(
            self,
            Point::new(center.0, center.1),
            radius,
            scalar(color),
            imgproc::FILLED,
            imgproc::LINE_8,
            0,
        )?;
        Ok(())
    }

    fn draw_rect(&mut self, region: &BBox, color: Color, thickness: i32) -> Result<()> {
        imgproc::rectangle(self, rect(region), scalar(color), thickness.max(1), imgproc::LINE_8, 0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Vec3b, CV_8UC3};

    fn blank(w: i32, h: i32) -> Mat {
        Mat::new_rows_cols_with_default(h, w, CV_8UC3, Scalar::all(0.0)).unwrap()
    }

    #[test]
    fn test_rotate_swaps_dimensions() {
        let mat = blank(40, 20);
        let rotated = mat.rotate(Rotation::Clockwise90).unwrap();
        assert_eq!(Raster::size(&rotated), (20, 40));
    }

    #[test]
    fn test_paste_writes_back() {
        let mut mat = blank(10, 10);
        let region = BBox::new(2, 2, 4, 4);
        let mut patch = mat.crop(&region).unwrap();
        patch.draw_dot((0, 0), 0, Color::rgb(255, 0, 0)).unwrap();
        mat.paste(&patch, &region).unwrap();
        let pixel = mat.at_2d::<Vec3b>(2, 2).unwrap();
        assert_eq!(pixel[2], 255);
    }
}
