use anyhow::{bail, Result};
use ndarray::Array4;
use opencv::{
    core::{AlgorithmHint, Mat, Size, CV_8UC3},
    imgproc,
    prelude::*,
};

/// MoveNet の入力サイズ（正方形）
pub const MOVENET_INPUT_SIZE: i32 = 192;

/// BGR のクロップ画像を MoveNet の入力テンソル [1, 192, 192, 3] (RGB, 0.0-255.0) にする
///
/// 縦横比は保たずに引き伸ばす。出力座標はそのままクロップ基準の正規化座標になる。
pub fn preprocess_for_movenet(crop: &Mat) -> Result<Array4<f32>> {
    if crop.empty() {
        bail!("empty image");
    }
    if crop.typ() != CV_8UC3 {
        bail!("expected an 8-bit 3-channel image (type {})", crop.typ());
    }

    let mut resized = Mat::default();
    imgproc::resize(
        crop,
        &mut resized,
        Size::new(MOVENET_INPUT_SIZE, MOVENET_INPUT_SIZE),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;

    let mut rgb = Mat::default();
    imgproc::cvt_color(&resized, &mut rgb, imgproc::COLOR_BGR2RGB, 0, AlgorithmHint::ALGO_HINT_DEFAULT)?;

    let rgb = if rgb.is_continuous() { rgb } else { rgb.try_clone()? };
    let side = MOVENET_INPUT_SIZE as usize;
    let values: Vec<f32> = rgb.data_bytes()?.iter().map(|&v| f32::from(v)).collect();
    Ok(Array4::from_shape_vec((1, side, side, 3), values)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::Scalar;

    #[test]
    fn test_tensor_shape_and_channel_order() {
        // BGR (10, 20, 30)
        let crop = Mat::new_rows_cols_with_default(50, 80, CV_8UC3, Scalar::new(10.0, 20.0, 30.0, 0.0)).unwrap();
        let tensor = preprocess_for_movenet(&crop).unwrap();
        assert_eq!(tensor.shape(), &[1, 192, 192, 3]);
        assert_eq!(tensor[[0, 100, 100, 0]], 30.0);
        assert_eq!(tensor[[0, 100, 100, 2]], 10.0);
    }

    #[test]
    fn test_empty_image_rejected() {
        assert!(preprocess_for_movenet(&Mat::default()).is_err());
    }
}
