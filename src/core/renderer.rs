use crate::core::frame_buffer::FrameBuffer;
use crate::core::line::draw_line;
use crate::core::rasterizer::{Triangle, rasterize_triangle};
use crate::geometry::transform::{CameraParams, MAX_DEPTH_LEVELS, Projector, ScreenVertex};
use crate::io::image_buffer::Image;
use crate::io::model::Model;
use crate::io::render_settings::RenderSettings;
use crate::utils::color::{FaceColoring, Rgb};
use log::{debug, info, warn};
use nalgebra::Point3;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// 一次渲染的统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// 模型中的面数
    pub faces: usize,
    /// 有顶点无法投影而被跳过的面
    pub rejected_faces: usize,
    /// 面积不足或背面而被剔除的面
    pub culled_faces: usize,
    /// 进入光栅化的面
    pub rasterized_faces: usize,
    /// 产生的片元数
    pub fragments: usize,
    /// 通过深度测试的片元数
    pub written: usize,
}

/// 渲染结果：颜色图、深度图与统计信息
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub color: Image,
    pub depth: Image,
    pub stats: RenderStats,
}

#[derive(Default)]
struct StatCounters {
    rejected_faces: AtomicUsize,
    culled_faces: AtomicUsize,
    rasterized_faces: AtomicUsize,
    fragments: AtomicUsize,
    written: AtomicUsize,
}

impl StatCounters {
    fn snapshot(&self, faces: usize) -> RenderStats {
        RenderStats {
            faces,
            rejected_faces: self.rejected_faces.load(Ordering::Relaxed),
            culled_faces: self.culled_faces.load(Ordering::Relaxed),
            rasterized_faces: self.rasterized_faces.load(Ordering::Relaxed),
            fragments: self.fragments.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
        }
    }
}

/// 渲染管线：逐面执行 变换 -> 光栅化 -> 深度合成
///
/// 每次调用 `render` 都创建新的帧缓冲区，渲染之间不共享状态。
#[derive(Debug, Clone)]
pub struct Renderer {
    projector: Projector,
    coloring: FaceColoring,
    use_multithreading: bool,
    wireframe: Option<Rgb>,
}

impl Renderer {
    pub fn new(width: usize, height: usize, camera: CameraParams) -> Self {
        Self {
            projector: Projector::new(&camera, width, height, MAX_DEPTH_LEVELS),
            coloring: FaceColoring::default(),
            use_multithreading: true,
            wireframe: None,
        }
    }

    pub fn from_settings(settings: &RenderSettings) -> Result<Self, String> {
        settings.validate()?;
        let projector = Projector::new(
            &settings.camera_params(),
            settings.width,
            settings.height,
            settings.depth_levels,
        );
        Ok(Self {
            projector,
            coloring: settings.face_coloring(),
            use_multithreading: settings.use_multithreading,
            wireframe: settings.wireframe_rgb(),
        })
    }

    // 构建器方法，便于链式配置
    pub fn with_coloring(mut self, coloring: FaceColoring) -> Self {
        self.coloring = coloring;
        self
    }

    pub fn with_multithreading(mut self, use_multithreading: bool) -> Self {
        self.use_multithreading = use_multithreading;
        self
    }

    pub fn with_wireframe(mut self, wireframe: Option<Rgb>) -> Self {
        self.wireframe = wireframe;
        self
    }

    pub fn width(&self) -> usize {
        self.projector.width()
    }

    pub fn height(&self) -> usize {
        self.projector.height()
    }

    /// 使用内置相机变换与面颜色策略渲染模型
    pub fn render<M: Model + Sync>(&self, model: &M) -> RenderOutput {
        let projector = &self.projector;
        let coloring = self.coloring;
        self.render_with(
            model,
            |p| projector.project(&p),
            |face| coloring.color_of(face),
        )
    }

    /// 使用调用方提供的变换与面颜色渲染模型
    pub fn render_with<M, T, C>(&self, model: &M, transform: T, color_of: C) -> RenderOutput
    where
        M: Model + Sync,
        T: Fn(Point3<f64>) -> Result<ScreenVertex, String> + Sync,
        C: Fn(usize) -> Rgb + Sync,
    {
        let start_time = Instant::now();
        let frame_buffer = FrameBuffer::new(self.width(), self.height());
        let face_count = model.face_count();
        let counters = StatCounters::default();

        debug!(
            "渲染 {} 个面到 {}x{}，多线程: {}",
            face_count,
            self.width(),
            self.height(),
            self.use_multithreading
        );

        // 1. 几何变换
        let project_face = |face: usize| -> Option<Triangle> {
            let mut vertices = [ScreenVertex::new(0, 0, 0); 3];
            for (corner, vertex) in vertices.iter_mut().enumerate() {
                match transform(model.vertex(face, corner)) {
                    Ok(v) => *vertex = v,
                    Err(e) => {
                        warn!("跳过面 {}: {}", face, e);
                        counters.rejected_faces.fetch_add(1, Ordering::Relaxed);
                        return None;
                    }
                }
            }
            Some(Triangle { vertices })
        };
        let triangles: Vec<Option<Triangle>> = if self.use_multithreading {
            (0..face_count).into_par_iter().map(project_face).collect()
        } else {
            (0..face_count).map(project_face).collect()
        };

        // 2. 光栅化与深度合成
        let draw_face = |(face, triangle): (usize, &Option<Triangle>)| {
            let Some(triangle) = triangle else {
                return;
            };
            if !triangle.is_valid() {
                counters.culled_faces.fetch_add(1, Ordering::Relaxed);
                return;
            }
            counters.rasterized_faces.fetch_add(1, Ordering::Relaxed);
            // 深度相同时序号小的面获胜，与处理顺序无关
            let order = u32::try_from(face).unwrap_or(u32::MAX);
            let counts = rasterize_triangle(
                triangle,
                order,
                color_of(face),
                &frame_buffer,
                self.use_multithreading,
            );
            counters.fragments.fetch_add(counts.fragments, Ordering::Relaxed);
            counters.written.fetch_add(counts.written, Ordering::Relaxed);
        };
        if self.use_multithreading {
            triangles.par_iter().enumerate().for_each(draw_face);
        } else {
            triangles.iter().enumerate().for_each(draw_face);
        }

        let (mut color, depth) = frame_buffer.to_images();

        // 3. 线框叠加（不做深度测试）
        if let Some(wire_color) = self.wireframe {
            for triangle in triangles.iter().flatten() {
                let [a, b, c] = triangle.vertices;
                draw_line(a.x, a.y, b.x, b.y, &mut color, &wire_color);
                draw_line(b.x, b.y, c.x, c.y, &mut color, &wire_color);
                draw_line(c.x, c.y, a.x, a.y, &mut color, &wire_color);
            }
        }

        let stats = counters.snapshot(face_count);
        info!(
            "渲染完成，耗时 {:?}: {} 个面，剔除 {}，跳过 {}，片元 {}，写入 {}",
            start_time.elapsed(),
            stats.faces,
            stats.culled_faces,
            stats.rejected_faces,
            stats.fragments,
            stats.written
        );

        RenderOutput {
            color,
            depth,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame_buffer::FAR_DEPTH;
    use crate::geometry::transform::Projection;
    use crate::io::image_buffer::PixelFormat;
    use crate::io::model::TriangleMesh;

    const RED: Rgb = [255, 0, 0];
    const BLUE: Rgb = [0, 0, 255];

    /// 直接把模型坐标当作屏幕坐标
    fn screen_space(p: Point3<f64>) -> Result<ScreenVertex, String> {
        Ok(ScreenVertex::new(p.x as i32, p.y as i32, p.z as u8))
    }

    fn mesh_of(triangles: &[[(f64, f64, f64); 3]]) -> TriangleMesh {
        let positions = triangles
            .iter()
            .flatten()
            .map(|&(x, y, z)| Point3::new(x, y, z))
            .collect();
        let faces = (0..triangles.len())
            .map(|i| [3 * i, 3 * i + 1, 3 * i + 2])
            .collect();
        TriangleMesh::new(positions, faces).unwrap()
    }

    fn renderer() -> Renderer {
        Renderer::new(64, 64, CameraParams::default())
    }

    const NEAR: [(f64, f64, f64); 3] = [(5.0, 5.0, 200.0), (50.0, 5.0, 200.0), (5.0, 50.0, 200.0)];
    const FAR: [(f64, f64, f64); 3] = [(10.0, 10.0, 100.0), (60.0, 10.0, 100.0), (10.0, 60.0, 100.0)];

    #[test]
    fn empty_mesh_leaves_buffers_untouched() {
        let output = renderer().render(&TriangleMesh::empty());
        assert_eq!(output.color, Image::new(64, 64, PixelFormat::Rgb));
        assert!(output.depth.as_bytes().iter().all(|&d| d == FAR_DEPTH));
        assert_eq!(output.stats, RenderStats::default());
    }

    #[test]
    fn nearer_triangle_wins_in_either_order() {
        let near_first = mesh_of(&[NEAR, FAR]);
        let far_first = mesh_of(&[FAR, NEAR]);

        let a = renderer().render_with(&near_first, screen_space, |i| [RED, BLUE][i]);
        let b = renderer().render_with(&far_first, screen_space, |i| [BLUE, RED][i]);

        assert_eq!(a.color, b.color);
        assert_eq!(a.depth, b.depth);
        // 重叠区域
        assert_eq!(a.color.get_pixel(20, 20), Some(&RED[..]));
        assert_eq!(a.depth.get_pixel(20, 20), Some(&[200u8][..]));
        // 只有远处三角形覆盖的区域
        assert_eq!(a.color.get_pixel(30, 30), Some(&BLUE[..]));
    }

    #[test]
    fn disjoint_triangles_are_order_independent() {
        let left = [(0.0, 0.0, 50.0), (20.0, 0.0, 50.0), (0.0, 20.0, 50.0)];
        let right = [(40.0, 40.0, 90.0), (60.0, 40.0, 90.0), (40.0, 60.0, 90.0)];
        let a = renderer().render_with(&mesh_of(&[left, right]), screen_space, |_| RED);
        let b = renderer().render_with(&mesh_of(&[right, left]), screen_space, |_| RED);
        assert_eq!(a.color, b.color);
        assert_eq!(a.depth, b.depth);
    }

    #[test]
    fn sequential_and_parallel_renders_match() {
        let mesh = mesh_of(&[NEAR, FAR]);
        let par = renderer().render_with(&mesh, screen_space, |i| [RED, BLUE][i]);
        let seq = renderer()
            .with_multithreading(false)
            .render_with(&mesh, screen_space, |i| [RED, BLUE][i]);
        assert_eq!(par.color, seq.color);
        assert_eq!(par.depth, seq.depth);
        assert_eq!(par.stats, seq.stats);
    }

    #[test]
    fn statistics_count_culled_and_rejected_faces() {
        let back = [NEAR[0], NEAR[2], NEAR[1]];
        let mesh = mesh_of(&[NEAR, back]);
        let output = renderer().render_with(&mesh, screen_space, |_| RED);
        assert_eq!(output.stats.faces, 2);
        assert_eq!(output.stats.culled_faces, 1);
        assert_eq!(output.stats.rasterized_faces, 1);
        assert_eq!(output.stats.fragments, output.stats.written);

        let rejecting = |p: Point3<f64>| {
            if p.z > 150.0 {
                Err("太近".to_string())
            } else {
                screen_space(p)
            }
        };
        let output = renderer().render_with(&mesh_of(&[NEAR, FAR]), rejecting, |_| RED);
        assert_eq!(output.stats.rejected_faces, 1);
        assert_eq!(output.stats.rasterized_faces, 1);
        assert_eq!(output.depth.get_pixel(20, 20), Some(&[100u8][..]));
    }

    #[test]
    fn unprojectable_face_is_skipped_by_camera() {
        let camera = CameraParams::new(0.0, Projection::Perspective { focal_distance: 3.0 });
        let mesh = mesh_of(&[[(0.0, 0.0, 3.0), (0.5, 0.0, 0.0), (0.0, 0.5, 0.0)]]);
        let output = Renderer::new(32, 32, camera).render(&mesh);
        assert_eq!(output.stats.rejected_faces, 1);
        assert!(output.depth.as_bytes().iter().all(|&d| d == FAR_DEPTH));
    }

    #[test]
    fn renders_projected_mesh() {
        let camera = CameraParams::new(0.0, Projection::Orthographic);
        let mesh = mesh_of(&[[(-0.5, -0.5, 0.0), (0.5, -0.5, 0.0), (0.0, 0.5, 0.0)]]);
        let output = Renderer::new(64, 64, camera)
            .with_coloring(FaceColoring::Solid(BLUE))
            .render(&mesh);
        assert_eq!(output.stats.rasterized_faces, 1);
        assert_eq!(output.color.get_pixel(32, 32), Some(&BLUE[..]));
        assert_eq!(output.depth.get_pixel(32, 32), Some(&[128u8][..]));
        assert_eq!(output.color.get_pixel(0, 63), Some(&[0u8, 0, 0][..]));
    }

    #[test]
    fn wireframe_outlines_faces() {
        let mesh = mesh_of(&[NEAR]);
        let output = renderer()
            .with_wireframe(Some([0, 255, 0]))
            .render_with(&mesh, screen_space, |_| RED);
        assert_eq!(output.color.get_pixel(5, 5), Some(&[0u8, 255, 0][..]));
        assert_eq!(output.color.get_pixel(27, 5), Some(&[0u8, 255, 0][..]));
        assert_eq!(output.color.get_pixel(15, 15), Some(&RED[..]));
        // 线框不写深度
        assert_eq!(output.depth.get_pixel(5, 5), Some(&[200u8][..]));
    }

    #[test]
    fn coplanar_ties_match_sequential_render() {
        let triangles = vec![NEAR; 2000];
        let mesh = mesh_of(&triangles);
        let color_of = |i: usize| if i < 1000 { RED } else { BLUE };

        let sequential = renderer()
            .with_multithreading(false)
            .render_with(&mesh, screen_space, color_of);
        assert_eq!(sequential.color.get_pixel(20, 20), Some(&RED[..]));

        for _ in 0..10 {
            let parallel = renderer().render_with(&mesh, screen_space, color_of);
            assert_eq!(parallel.color, sequential.color);
            assert_eq!(parallel.depth, sequential.depth);
        }
    }

    #[test]
    fn adjacent_faces_share_edge_deterministically() {
        // 两个共面三角形共享对角线，线上的像素深度相同
        let lower = [(4.0, 4.0, 90.0), (60.0, 4.0, 90.0), (60.0, 60.0, 90.0)];
        let upper = [(4.0, 4.0, 90.0), (60.0, 60.0, 90.0), (4.0, 60.0, 90.0)];
        let mesh = mesh_of(&[lower, upper]);
        let a = renderer().render_with(&mesh, screen_space, |i| [RED, BLUE][i]);
        let b = renderer()
            .with_multithreading(false)
            .render_with(&mesh, screen_space, |i| [RED, BLUE][i]);
        assert_eq!(a.color, b.color);
        assert_eq!(a.color.get_pixel(30, 30), Some(&RED[..]));
    }

    #[test]
    fn wireframe_survives_vertex_near_focal_plane() {
        let camera = CameraParams::new(0.0, Projection::Perspective { focal_distance: 3.0 });
        let mesh = mesh_of(&[[(-0.5, -0.5, 0.0), (0.5, -0.5, 2.9999999999), (0.0, 0.5, 0.0)]]);
        let output = Renderer::new(64, 64, camera)
            .with_coloring(FaceColoring::Solid(RED))
            .with_wireframe(Some([0, 255, 0]))
            .render(&mesh);
        assert_eq!(output.stats.rejected_faces, 0);
        assert_eq!(output.color.get_pixel(16, 16), Some(&[0u8, 255, 0][..]));
    }

    #[test]
    fn geometry_at_far_depth_is_never_written() {
        let camera = CameraParams::new(0.0, Projection::Orthographic);
        let mesh = mesh_of(&[[(-0.5, -0.5, -0.999), (0.5, -0.5, -0.999), (0.0, 0.5, -0.999)]]);
        let output = Renderer::new(64, 64, camera).render(&mesh);
        assert_eq!(output.stats.rasterized_faces, 1);
        assert!(output.stats.fragments > 0);
        assert_eq!(output.stats.written, 0);
        assert!(output.depth.as_bytes().iter().all(|&d| d == FAR_DEPTH));
    }
}
