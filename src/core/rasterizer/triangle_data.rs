use crate::geometry::interpolation::signed_triangle_area;
use crate::geometry::transform::ScreenVertex;
use nalgebra::Vector3;

/// 覆盖面积低于此值的三角形不参与光栅化（同时剔除背面）
pub const MIN_COVERAGE_AREA: f64 = 1.0;

/// 屏幕空间三角形，顶点顺序决定环绕方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub vertices: [ScreenVertex; 3],
}

/// 光栅化产生的片元
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub x: usize,
    pub y: usize,
    pub depth: u8,
    /// 重心坐标 (alpha, beta, gamma)
    pub weights: Vector3<f64>,
}

/// 屏幕空间包围盒，闭区间，已截断到帧缓冲区范围内
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl BoundingBox {
    /// 完全落在缓冲区外时返回 None
    pub fn from_triangle(triangle: &Triangle, width: usize, height: usize) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let [a, b, c] = triangle.vertices;

        let min_x = a.x.min(b.x).min(c.x) as i64;
        let min_y = a.y.min(b.y).min(c.y) as i64;
        let max_x = a.x.max(b.x).max(c.x) as i64;
        let max_y = a.y.max(b.y).max(c.y) as i64;

        let (w, h) = (width as i64, height as i64);
        if max_x < 0 || max_y < 0 || min_x >= w || min_y >= h {
            return None;
        }

        Some(Self {
            min_x: min_x.max(0) as usize,
            min_y: min_y.max(0) as usize,
            max_x: max_x.min(w - 1) as usize,
            max_y: max_y.min(h - 1) as usize,
        })
    }

    pub fn pixel_count(&self) -> usize {
        (self.max_x - self.min_x + 1) * (self.max_y - self.min_y + 1)
    }

    pub fn pixels(self) -> impl Iterator<Item = (usize, usize)> {
        (self.min_y..=self.max_y).flat_map(move |y| (self.min_x..=self.max_x).map(move |x| (x, y)))
    }
}

impl Triangle {
    pub fn new(a: ScreenVertex, b: ScreenVertex, c: ScreenVertex) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    pub fn signed_area(&self) -> f64 {
        let [a, b, c] = self.vertices;
        signed_triangle_area(a.x, a.y, b.x, b.y, c.x, c.y)
    }

    /// 面积不足一个像素或为背面时不可渲染
    pub fn is_valid(&self) -> bool {
        self.signed_area() >= MIN_COVERAGE_AREA
    }
}
