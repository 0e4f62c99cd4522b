use crate::io::image_buffer::Image;
use crate::utils::color::Rgb;

/// 画线段 (ax, ay) - (bx, by)，包含两个端点
///
/// 陡峭的线段先转置再按 x 逐列步进，y 按参数 t 插值后四舍五入。
/// 步进范围截断到图像内，端点可以远在图像之外（例如接近焦平面的顶点）。
pub fn draw_line(ax: i32, ay: i32, bx: i32, by: i32, image: &mut Image, color: &Rgb) {
    // i64 下端点差不会溢出
    let (mut ax, mut ay, mut bx, mut by) = (ax as i64, ay as i64, bx as i64, by as i64);
    let steep = (ax - bx).abs() < (ay - by).abs();
    if steep {
        std::mem::swap(&mut ax, &mut ay);
        std::mem::swap(&mut bx, &mut by);
    }
    // 从左到右
    if ax > bx {
        std::mem::swap(&mut ax, &mut bx);
        std::mem::swap(&mut ay, &mut by);
    }

    let extent = (if steep { image.height() } else { image.width() }) as i64;
    let span = (bx - ax) as f64;
    for x in ax.max(0)..=bx.min(extent - 1) {
        let t = if span > 0.0 { (x - ax) as f64 / span } else { 0.0 };
        // 浮点转整数饱和，越界的 y 由 set_pixel 丢弃
        let y = (ay as f64 + (by - ay) as f64 * t).round() as i32;
        if steep {
            image.set_pixel(y, x as i32, color);
        } else {
            image.set_pixel(x as i32, y, color);
        }
    }
}
