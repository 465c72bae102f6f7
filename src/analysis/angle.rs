use super::{Outcome, Unavailable};
use crate::pose::Point2D;

/// 3点 a-b-c の頂点 b における内角（度、0〜180）
///
/// 余弦定理で求める。3点は同じ座標空間（正規化 or ピクセル）で渡すこと。
/// |ab| か |bc| が 0 のときは角度が定義できないので `None`。
pub fn angle_at(a: Point2D, b: Point2D, c: Point2D) -> Option<f64> {
    let ab = a.distance(b);
    let bc = b.distance(c);
    let ac = a.distance(c);

    if ab == 0.0 || bc == 0.0 {
        return None;
    }

    // 浮動小数点誤差で [-1, 1] をわずかに超えることがある
    let cos = ((ab * ab + bc * bc - ac * ac) / (2.0 * ab * bc)).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// 関節角度。定義できない場合は `Unavailable::DegenerateAngle`
pub fn joint_angle(a: Point2D, b: Point2D, c: Point2D) -> Outcome<f64> {
    match angle_at(a, b, c) {
        Some(degrees) => Outcome::Computed(degrees),
        None => Outcome::Unavailable(Unavailable::DegenerateAngle),
    }
}
