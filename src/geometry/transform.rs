use nalgebra::{Point3, Rotation3, Vector3};

/// 默认相机焦距（透视除法中的常数 c）
pub const DEFAULT_FOCAL_DISTANCE: f64 = 3.0;
/// 默认绕竖直轴的旋转角（度）
pub const DEFAULT_ROTATION_DEGREES: f64 = 30.0;
/// 深度缓冲区的最大量化级别，深度样本以 u8 存储
pub const MAX_DEPTH_LEVELS: u8 = 255;

/// 投影方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// 透视投影：按 `1 / (1 - z/c)` 缩放，c 为焦距
    Perspective { focal_distance: f64 },
    /// 正交投影：不做透视除法
    Orthographic,
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective {
            focal_distance: DEFAULT_FOCAL_DISTANCE,
        }
    }
}

/// 相机参数：旋转角（弧度，绕 Y 轴）与投影方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraParams {
    pub rotation_rad: f64,
    pub projection: Projection,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            rotation_rad: DEFAULT_ROTATION_DEGREES.to_radians(),
            projection: Projection::default(),
        }
    }
}

impl CameraParams {
    pub fn new(rotation_rad: f64, projection: Projection) -> Self {
        Self {
            rotation_rad,
            projection,
        }
    }

    pub fn from_degrees(rotation_degrees: f64, projection: Projection) -> Self {
        Self::new(rotation_degrees.to_radians(), projection)
    }
}

/// 屏幕空间顶点：整数像素坐标 + 量化后的深度
///
/// 深度约定：数值越大越靠近相机，0 表示"无内容"。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenVertex {
    pub x: i32,
    pub y: i32,
    pub z: u8,
}

impl ScreenVertex {
    pub fn new(x: i32, y: i32, z: u8) -> Self {
        Self { x, y, z }
    }
}

/// 几何变换：旋转 -> 透视除法 -> 视口映射
///
/// 构造后不可变，可在多个线程间共享。
#[derive(Debug, Clone)]
pub struct Projector {
    rotation: Rotation3<f64>,
    projection: Projection,
    width: usize,
    height: usize,
    depth_levels: u8,
}

impl Projector {
    pub fn new(camera: &CameraParams, width: usize, height: usize, depth_levels: u8) -> Self {
        Self {
            rotation: Rotation3::from_axis_angle(&Vector3::y_axis(), camera.rotation_rad),
            projection: camera.projection,
            width,
            height,
            depth_levels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// 绕竖直轴旋转世界坐标点
    pub fn rotate(&self, point: &Point3<f64>) -> Point3<f64> {
        self.rotation.transform_point(point)
    }

    /// 透视除法。点位于焦平面上（或其后方）时返回错误，而不是产生无穷大
    pub fn perspective_divide(&self, point: &Point3<f64>) -> Result<Point3<f64>, String> {
        match self.projection {
            Projection::Orthographic => Ok(*point),
            Projection::Perspective { focal_distance } => {
                let denominator = 1.0 - point.z / focal_distance;
                if !denominator.is_finite() || denominator <= f64::EPSILON {
                    return Err(format!(
                        "点 ({}, {}, {}) 位于相机焦平面 z = {} 上或其后方，无法投影",
                        point.x, point.y, point.z, focal_distance
                    ));
                }
                Ok(Point3::from(point.coords / denominator))
            }
        }
    }

    /// 将 [-1,1]^3 映射到 [0,width]×[0,height]×[0,depth_levels]
    ///
    /// 坐标四舍五入（远离零）；深度截断到合法范围。
    /// 深度量化为 0 的点与帧缓冲区的"未绘制"值相同，其片元永远不会写入；
    /// 正交投影下即 z < -1 + 1/depth_levels 的点。
    pub fn viewport(&self, point: &Point3<f64>) -> ScreenVertex {
        let levels = self.depth_levels as f64;
        let x = ((point.x + 1.0) * self.width as f64 / 2.0).round();
        let y = ((point.y + 1.0) * self.height as f64 / 2.0).round();
        let z = ((point.z + 1.0) * levels / 2.0).round().clamp(0.0, levels);
        ScreenVertex::new(x as i32, y as i32, z as u8)
    }

    /// 完整的变换流程
    pub fn project(&self, point: &Point3<f64>) -> Result<ScreenVertex, String> {
        if !(point.x.is_finite() && point.y.is_finite() && point.z.is_finite()) {
            return Err(format!("顶点坐标不是有限值: {:?}", point));
        }
        let rotated = self.rotate(point);
        let projected = self.perspective_divide(&rotated)?;
        Ok(self.viewport(&projected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_6;

    fn projector(camera: CameraParams) -> Projector {
        Projector::new(&camera, 64, 64, MAX_DEPTH_LEVELS)
    }

    #[test]
    fn origin_maps_to_viewport_center() {
        let p = projector(CameraParams::default());
        let v = p.project(&Point3::origin()).unwrap();
        assert_eq!((v.x, v.y), (32, 32));
        // (0 + 1) * 255 / 2 = 127.5，四舍五入
        assert_eq!(v.z, 128);
    }

    #[test]
    fn rotation_matches_y_axis_matrix() {
        let p = projector(CameraParams::new(FRAC_PI_6, Projection::Orthographic));
        let r = p.rotate(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(r.x, FRAC_PI_6.cos(), epsilon = 1e-12);
        assert_relative_eq!(r.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(r.z, -FRAC_PI_6.sin(), epsilon = 1e-12);
    }

    #[test]
    fn projects_rotated_point_with_perspective() {
        let p = projector(CameraParams::default());
        let v = p.project(&Point3::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(v, ScreenVertex::new(56, 32, 73));
    }

    #[test]
    fn depth_is_clamped_to_range() {
        let p = projector(CameraParams::default());
        let v = p.project(&Point3::new(0.0, 0.0, 1.0)).unwrap();
        assert_eq!(v.z, 255);

        let ortho = projector(CameraParams::new(0.0, Projection::Orthographic));
        let far = ortho.project(&Point3::new(0.0, 0.0, -5.0)).unwrap();
        assert_eq!(far.z, 0);
    }

    #[test]
    fn depth_quantizes_to_zero_just_past_far_bound() {
        let ortho = projector(CameraParams::new(0.0, Projection::Orthographic));
        assert_eq!(ortho.project(&Point3::new(0.0, 0.0, -0.997)).unwrap().z, 0);
        assert_eq!(ortho.project(&Point3::new(0.0, 0.0, -0.995)).unwrap().z, 1);
    }

    #[test]
    fn point_on_focal_plane_is_rejected() {
        let p = projector(CameraParams::new(0.0, Projection::default()));
        assert!(p.project(&Point3::new(0.2, 0.1, 3.0)).is_err());
        assert!(p.project(&Point3::new(0.0, 0.0, 4.0)).is_err());
    }

    #[test]
    fn non_finite_point_is_rejected() {
        let p = projector(CameraParams::default());
        assert!(p.project(&Point3::new(f64::NAN, 0.0, 0.0)).is_err());
    }

    #[test]
    fn orthographic_skips_divide() {
        let p = projector(CameraParams::new(0.0, Projection::Orthographic));
        let v = p.project(&Point3::new(0.5, -0.5, 0.0)).unwrap();
        assert_eq!(v, ScreenVertex::new(48, 16, 128));
    }
}
