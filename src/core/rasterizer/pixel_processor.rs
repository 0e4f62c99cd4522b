use super::triangle_data::{BoundingBox, Fragment, MIN_COVERAGE_AREA, Triangle};
use crate::core::frame_buffer::FrameBuffer;
use crate::geometry::interpolation::{barycentric_coordinates, interpolate, is_inside_triangle};
use crate::utils::color::Rgb;
use rayon::prelude::*;

/// 包围盒像素数超过此值时逐行并行填充
pub const PIXEL_PARALLEL_THRESHOLD: usize = 4096;

/// 光栅化准备结果：有效三角形的包围盒与有向面积
fn setup(triangle: &Triangle, width: usize, height: usize) -> Option<(BoundingBox, f64)> {
    let total_area = triangle.signed_area();
    if total_area < MIN_COVERAGE_AREA {
        return None;
    }
    BoundingBox::from_triangle(triangle, width, height).map(|bbox| (bbox, total_area))
}

/// 处理单个像素：重心坐标全部非负时产生片元
#[inline]
pub fn rasterize_pixel(triangle: &Triangle, x: usize, y: usize, total_area: f64) -> Option<Fragment> {
    let [a, b, c] = triangle.vertices;
    let bary = barycentric_coordinates(
        (x as i32, y as i32),
        (a.x, a.y),
        (b.x, b.y),
        (c.x, c.y),
        total_area,
    );

    if !is_inside_triangle(&bary) {
        return None;
    }

    let depth = interpolate(&bary, a.z as f64, b.z as f64, c.z as f64)
        .round()
        .clamp(0.0, u8::MAX as f64) as u8;

    Some(Fragment {
        x,
        y,
        depth,
        weights: bary,
    })
}

impl Triangle {
    /// 惰性地按行主序产生片元
    pub fn fragments(self, width: usize, height: usize) -> impl Iterator<Item = Fragment> {
        let triangle = self;
        setup(&triangle, width, height)
            .into_iter()
            .flat_map(move |(bbox, total_area)| {
                bbox.pixels()
                    .filter_map(move |(x, y)| rasterize_pixel(&triangle, x, y, total_area))
            })
    }

    /// 并行产生片元，各像素之间互不依赖
    pub fn par_fragments(self, width: usize, height: usize) -> impl ParallelIterator<Item = Fragment> {
        let triangle = self;
        setup(&triangle, width, height)
            .into_par_iter()
            .flat_map(move |(bbox, total_area)| {
                (bbox.min_y..=bbox.max_y)
                    .into_par_iter()
                    .flat_map_iter(move |y| {
                        (bbox.min_x..=bbox.max_x)
                            .filter_map(move |x| rasterize_pixel(&triangle, x, y, total_area))
                    })
            })
    }
}

/// 光栅化单个三角形并写入帧缓冲区，返回通过深度测试的片元数
///
/// 大三角形的包围盒按行并行处理；深度合成是唯一的同步写入点。
/// `order` 是面的序号，用于在深度相同时确定获胜者。
pub fn rasterize_triangle(
    triangle: &Triangle,
    order: u32,
    color: Rgb,
    frame_buffer: &FrameBuffer,
    use_multithreading: bool,
) -> RasterCounts {
    let (width, height) = (frame_buffer.width, frame_buffer.height);
    let large = use_multithreading
        && BoundingBox::from_triangle(triangle, width, height)
            .is_some_and(|bbox| bbox.pixel_count() > PIXEL_PARALLEL_THRESHOLD);

    if large {
        triangle
            .par_fragments(width, height)
            .map(|f| {
                RasterCounts::single(frame_buffer.composite_ordered(f.x, f.y, f.depth, order, color))
            })
            .reduce(RasterCounts::default, RasterCounts::merge)
    } else {
        triangle
            .fragments(width, height)
            .map(|f| {
                RasterCounts::single(frame_buffer.composite_ordered(f.x, f.y, f.depth, order, color))
            })
            .fold(RasterCounts::default(), RasterCounts::merge)
    }
}

/// 单个三角形的片元统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterCounts {
    pub fragments: usize,
    pub written: usize,
}

impl RasterCounts {
    fn single(written: bool) -> Self {
        Self {
            fragments: 1,
            written: written as usize,
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            fragments: self.fragments + other.fragments,
            written: self.written + other.written,
        }
    }
}
