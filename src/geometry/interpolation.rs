use nalgebra::Vector3;

/// 三角形 (a, b, c) 的有向面积
///
/// 正值表示正面（本渲染器采用的环绕方向），负值表示背面。
pub fn signed_triangle_area(ax: i32, ay: i32, bx: i32, by: i32, cx: i32, cy: i32) -> f64 {
    let (ax, ay, bx, by, cx, cy) = (
        ax as f64, ay as f64, bx as f64, by as f64, cx as f64, cy as f64,
    );
    0.5 * ((by - ay) * (bx + ax) + (cy - by) * (cx + bx) + (ay - cy) * (ax + cx))
}

/// 计算点 p 关于三角形 (a, b, c) 的重心坐标 (alpha, beta, gamma)
///
/// `total_area` 必须是 `signed_triangle_area(a, b, c)` 的结果且不为零。
/// alpha 对应 a，beta 对应 b，gamma 对应 c。
pub fn barycentric_coordinates(
    p: (i32, i32),
    a: (i32, i32),
    b: (i32, i32),
    c: (i32, i32),
    total_area: f64,
) -> Vector3<f64> {
    let (px, py) = p;
    let alpha = signed_triangle_area(px, py, b.0, b.1, c.0, c.1) / total_area;
    let beta = signed_triangle_area(px, py, c.0, c.1, a.0, a.1) / total_area;
    let gamma = signed_triangle_area(px, py, a.0, a.1, b.0, b.1) / total_area;
    Vector3::new(alpha, beta, gamma)
}

/// 任一重心坐标为负即在三角形外
#[inline(always)]
pub fn is_inside_triangle(bary: &Vector3<f64>) -> bool {
    bary.x >= 0.0 && bary.y >= 0.0 && bary.z >= 0.0
}

/// 按重心坐标线性插值顶点属性
#[inline]
pub fn interpolate(bary: &Vector3<f64>, a: f64, b: f64, c: f64) -> f64 {
    bary.x * a + bary.y * b + bary.z * c
}
