use crate::io::render_settings::{OUTPUT_FORMATS, RenderSettings};
use crate::utils::color::parse_rgb;
use log::warn;
use std::path::Path;
use toml::Value;

/// TOML配置管理器 - 统一处理所有配置的读写
pub struct TomlConfigLoader;

impl TomlConfigLoader {
    /// 从TOML文件加载完整配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<RenderSettings, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("读取配置文件失败: {}", e))?;

        Self::load_from_content(&content)
    }

    /// 从TOML内容字符串加载配置
    pub fn load_from_content(content: &str) -> Result<RenderSettings, String> {
        let toml_value: Value =
            toml::from_str(content).map_err(|e| format!("解析TOML失败: {}", e))?;

        Self::parse_toml_to_settings(toml_value)
    }

    /// 保存配置到TOML文件
    pub fn save_to_file<P: AsRef<Path>>(settings: &RenderSettings, path: P) -> Result<(), String> {
        let toml_content = Self::settings_to_toml(settings);
        std::fs::write(path, toml_content).map_err(|e| format!("写入配置文件失败: {}", e))
    }

    // ===== TOML -> RenderSettings 转换 =====

    fn parse_toml_to_settings(toml: Value) -> Result<RenderSettings, String> {
        let mut settings = RenderSettings::default();

        // [files] 部分
        if let Some(files) = Self::section(&toml, "files")? {
            Self::parse_files_section(&mut settings, files)?;
        }

        // [render] 部分
        if let Some(render) = Self::section(&toml, "render")? {
            Self::parse_render_section(&mut settings, render)?;
        }

        // [camera] 部分
        if let Some(camera) = Self::section(&toml, "camera")? {
            Self::parse_camera_section(&mut settings, camera)?;
        }

        // [color] 部分
        if let Some(color) = Self::section(&toml, "color")? {
            Self::parse_color_section(&mut settings, color)?;
        }

        Ok(settings)
    }

    fn section<'a>(toml: &'a Value, name: &str) -> Result<Option<&'a toml::Table>, String> {
        match toml.get(name) {
            None => Ok(None),
            Some(Value::Table(table)) => Ok(Some(table)),
            Some(_) => Err(format!("[{}] 必须是一个表", name)),
        }
    }

    // ===== 类型检查的取值辅助函数 =====

    fn get_str<'a>(table: &'a toml::Table, key: &str) -> Result<Option<&'a str>, String> {
        match table.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_str()
                .map(Some)
                .ok_or_else(|| format!("配置项 '{}' 应为字符串", key)),
        }
    }

    fn get_bool(table: &toml::Table, key: &str) -> Result<Option<bool>, String> {
        match table.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_bool()
                .map(Some)
                .ok_or_else(|| format!("配置项 '{}' 应为布尔值", key)),
        }
    }

    fn get_integer(table: &toml::Table, key: &str) -> Result<Option<i64>, String> {
        match table.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_integer()
                .map(Some)
                .ok_or_else(|| format!("配置项 '{}' 应为整数", key)),
        }
    }

    /// 浮点配置项同时接受整数写法
    fn get_float(table: &toml::Table, key: &str) -> Result<Option<f64>, String> {
        match table.get(key) {
            None => Ok(None),
            Some(Value::Float(f)) => Ok(Some(*f)),
            Some(Value::Integer(i)) => Ok(Some(*i as f64)),
            Some(_) => Err(format!("配置项 '{}' 应为数字", key)),
        }
    }

    // ===== 各个section的解析方法 =====

    fn parse_files_section(
        settings: &mut RenderSettings,
        files: &toml::Table,
    ) -> Result<(), String> {
        if let Some(obj) = Self::get_str(files, "obj")? {
            settings.obj = Some(obj.to_string());
        }
        if let Some(output_dir) = Self::get_str(files, "output_dir")? {
            settings.output_dir = output_dir.to_string();
        }
        if let Some(output) = Self::get_str(files, "output")? {
            settings.output = output.to_string();
        }
        if let Some(depth_output) = Self::get_str(files, "depth_output")? {
            settings.depth_output = depth_output.to_string();
        }
        if let Some(format) = Self::get_str(files, "format")? {
            let format = format.to_lowercase();
            if OUTPUT_FORMATS.contains(&format.as_str()) {
                settings.format = format;
            } else {
                warn!(
                    "不支持的输出格式 '{}', 使用默认值 {}",
                    format, settings.format
                );
            }
        }
        Ok(())
    }

    fn parse_render_section(
        settings: &mut RenderSettings,
        render: &toml::Table,
    ) -> Result<(), String> {
        if let Some(width) = Self::get_integer(render, "width")? {
            if width > 0 {
                settings.width = width as usize;
            } else {
                warn!("无效的宽度 {}, 使用默认值 {}", width, settings.width);
            }
        }
        if let Some(height) = Self::get_integer(render, "height")? {
            if height > 0 {
                settings.height = height as usize;
            } else {
                warn!("无效的高度 {}, 使用默认值 {}", height, settings.height);
            }
        }
        if let Some(projection) = Self::get_str(render, "projection")? {
            match projection {
                "perspective" | "orthographic" => settings.projection = projection.to_string(),
                _ => return Err(format!("未知的投影类型: {}", projection)),
            }
        }
        if let Some(depth_levels) = Self::get_integer(render, "depth_levels")? {
            if (1..=255).contains(&depth_levels) {
                settings.depth_levels = depth_levels as u8;
            } else {
                warn!(
                    "无效的深度量化级别 {}, 使用默认值 {}",
                    depth_levels, settings.depth_levels
                );
            }
        }
        if let Some(use_multithreading) = Self::get_bool(render, "use_multithreading")? {
            settings.use_multithreading = use_multithreading;
        }
        if let Some(wireframe) = Self::get_bool(render, "wireframe")? {
            settings.wireframe = wireframe;
        }
        if let Some(save_depth) = Self::get_bool(render, "save_depth")? {
            settings.save_depth = save_depth;
        }
        Ok(())
    }

    fn parse_camera_section(
        settings: &mut RenderSettings,
        camera: &toml::Table,
    ) -> Result<(), String> {
        if let Some(rotation) = Self::get_float(camera, "rotation_degrees")? {
            if rotation.is_finite() {
                settings.rotation_degrees = rotation;
            } else {
                warn!("无效的旋转角 {}, 使用默认值", rotation);
            }
        }
        if let Some(focal_distance) = Self::get_float(camera, "focal_distance")? {
            if focal_distance.is_finite() && focal_distance > 0.0 {
                settings.focal_distance = focal_distance;
            } else {
                warn!(
                    "无效的焦距 {}, 使用默认值 {}",
                    focal_distance, settings.focal_distance
                );
            }
        }
        Ok(())
    }

    fn parse_color_section(
        settings: &mut RenderSettings,
        color: &toml::Table,
    ) -> Result<(), String> {
        if let Some(colorize) = Self::get_bool(color, "colorize")? {
            settings.colorize = colorize;
        }
        if let Some(seed) = Self::get_integer(color, "seed")? {
            if seed >= 0 {
                settings.seed = seed as u64;
            } else {
                warn!("颜色种子不能为负数: {}, 使用默认值 {}", seed, settings.seed);
            }
        }
        if let Some(solid) = Self::get_str(color, "solid")? {
            parse_rgb(solid).map_err(|e| format!("[color] solid: {}", e))?;
            settings.solid_color = solid.to_string();
        }
        if let Some(wireframe) = Self::get_str(color, "wireframe")? {
            parse_rgb(wireframe).map_err(|e| format!("[color] wireframe: {}", e))?;
            settings.wireframe_color = wireframe.to_string();
        }
        Ok(())
    }

    // ===== RenderSettings -> TOML 转换 =====

    fn settings_to_toml(settings: &RenderSettings) -> String {
        let mut content = String::new();

        // 文件头注释
        content.push_str("# 光栅化渲染器配置文件\n\n");

        // [files] 部分
        content.push_str("[files]\n");
        if let Some(obj) = &settings.obj {
            content.push_str(&format!("obj = {:?}\n", obj));
        } else {
            content.push_str("# obj = \"path/to/your/model.obj\"\n");
        }
        content.push_str(&format!("output_dir = {:?}\n", settings.output_dir));
        content.push_str(&format!("output = {:?}\n", settings.output));
        content.push_str(&format!("depth_output = {:?}\n", settings.depth_output));
        content.push_str(&format!("format = {:?}\n", settings.format));
        content.push('\n');

        // [render] 部分
        content.push_str("[render]\n");
        content.push_str(&format!("width = {}\n", settings.width));
        content.push_str(&format!("height = {}\n", settings.height));
        content.push_str(&format!("projection = {:?}\n", settings.projection));
        content.push_str(&format!("depth_levels = {}\n", settings.depth_levels));
        content.push_str(&format!(
            "use_multithreading = {}\n",
            settings.use_multithreading
        ));
        content.push_str(&format!("wireframe = {}\n", settings.wireframe));
        content.push_str(&format!("save_depth = {}\n", settings.save_depth));
        content.push('\n');

        // [camera] 部分
        content.push_str("[camera]\n");
        content.push_str(&format!(
            "rotation_degrees = {:?}\n",
            settings.rotation_degrees
        ));
        content.push_str(&format!("focal_distance = {:?}\n", settings.focal_distance));
        content.push('\n');

        // [color] 部分
        content.push_str("[color]\n");
        content.push_str(&format!("colorize = {}\n", settings.colorize));
        content.push_str(&format!("seed = {}\n", settings.seed));
        content.push_str(&format!("solid = {:?}\n", settings.solid_color));
        content.push_str(&format!("wireframe = {:?}\n", settings.wireframe_color));

        content
    }
}
