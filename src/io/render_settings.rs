use crate::geometry::transform::{
    CameraParams, DEFAULT_FOCAL_DISTANCE, DEFAULT_ROTATION_DEGREES, MAX_DEPTH_LEVELS, Projection,
};
use crate::utils::color::{FaceColoring, Rgb, parse_rgb};
use log::warn;
use std::path::PathBuf;

/// 支持的输出图像格式
pub const OUTPUT_FORMATS: [&str; 2] = ["tga", "png"];

/// 所有可通过 TOML 或命令行配置的渲染参数
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    // ===== 文件路径设置 =====
    /// 输入OBJ文件的路径
    pub obj: Option<String>,
    /// 输出图像的目录
    pub output_dir: String,
    /// 颜色图文件名（不含扩展名）
    pub output: String,
    /// 深度图文件名（不含扩展名）
    pub depth_output: String,
    /// 输出格式："tga" 或 "png"
    pub format: String,

    // ===== 渲染基础设置 =====
    pub width: usize,
    pub height: usize,
    /// 投影类型："perspective" 或 "orthographic"
    pub projection: String,
    /// 深度量化级别 (1..=255)
    pub depth_levels: u8,
    /// 启用多线程渲染
    pub use_multithreading: bool,
    /// 在颜色图上叠加线框
    pub wireframe: bool,
    /// 保存深度图
    pub save_depth: bool,

    // ===== 相机参数 =====
    /// 绕竖直轴的旋转角（度）
    pub rotation_degrees: f64,
    /// 透视投影的焦距
    pub focal_distance: f64,

    // ===== 颜色设置 =====
    /// 使用伪随机面颜色，否则使用 solid_color
    pub colorize: bool,
    /// 伪随机颜色的种子
    pub seed: u64,
    /// 纯色，格式为 "r,g,b"
    pub solid_color: String,
    /// 线框颜色，格式为 "r,g,b"
    pub wireframe_color: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            obj: None,
            output_dir: ".".to_string(),
            output: "framebuffer".to_string(),
            depth_output: "zbuffer".to_string(),
            format: "tga".to_string(),

            width: 800,
            height: 800,
            projection: "perspective".to_string(),
            depth_levels: MAX_DEPTH_LEVELS,
            use_multithreading: true,
            wireframe: false,
            save_depth: true,

            rotation_degrees: DEFAULT_ROTATION_DEGREES,
            focal_distance: DEFAULT_FOCAL_DISTANCE,

            colorize: true,
            seed: 0,
            solid_color: "255,255,255".to_string(),
            wireframe_color: "255,255,255".to_string(),
        }
    }
}

impl RenderSettings {
    /// 判断是否使用透视投影
    pub fn is_perspective(&self) -> bool {
        self.projection == "perspective"
    }

    /// 检查设置是否可用于渲染
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "图像尺寸必须大于零: {}x{}",
                self.width, self.height
            ));
        }
        if self.depth_levels == 0 {
            return Err("深度量化级别必须大于零".to_string());
        }
        if !self.rotation_degrees.is_finite() {
            return Err(format!("无效的旋转角: {}", self.rotation_degrees));
        }
        match self.projection.as_str() {
            "perspective" => {
                if !self.focal_distance.is_finite() || self.focal_distance <= 0.0 {
                    return Err(format!(
                        "焦距必须是正的有限值: {}",
                        self.focal_distance
                    ));
                }
            }
            "orthographic" => {}
            other => return Err(format!("未知的投影类型: {}", other)),
        }
        if !OUTPUT_FORMATS.contains(&self.format.as_str()) {
            return Err(format!(
                "不支持的输出格式: {}（可选 {:?}）",
                self.format, OUTPUT_FORMATS
            ));
        }
        parse_rgb(&self.solid_color)?;
        parse_rgb(&self.wireframe_color)?;
        Ok(())
    }

    pub fn projection_mode(&self) -> Projection {
        if self.is_perspective() {
            Projection::Perspective {
                focal_distance: self.focal_distance,
            }
        } else {
            Projection::Orthographic
        }
    }

    pub fn camera_params(&self) -> CameraParams {
        CameraParams::from_degrees(self.rotation_degrees, self.projection_mode())
    }

    pub fn face_coloring(&self) -> FaceColoring {
        if self.colorize {
            FaceColoring::Random { seed: self.seed }
        } else {
            FaceColoring::Solid(parse_rgb(&self.solid_color).unwrap_or_else(|e| {
                warn!("{}，使用白色", e);
                [255, 255, 255]
            }))
        }
    }

    /// 启用线框时返回线框颜色
    pub fn wireframe_rgb(&self) -> Option<Rgb> {
        if !self.wireframe {
            return None;
        }
        Some(parse_rgb(&self.wireframe_color).unwrap_or_else(|e| {
            warn!("{}，使用白色", e);
            [255, 255, 255]
        }))
    }

    pub fn color_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir).join(format!("{}.{}", self.output, self.format))
    }

    pub fn depth_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir).join(format!("{}.{}", self.depth_output, self.format))
    }
}
