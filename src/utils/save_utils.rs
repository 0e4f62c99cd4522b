use crate::core::renderer::RenderOutput;
use crate::io::render_settings::RenderSettings;
use log::{debug, info};
use std::fs;
use std::path::Path;

/// 确保输出目录存在
pub fn ensure_output_dir<P: AsRef<Path>>(output_dir: P) -> Result<(), String> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)
        .map_err(|e| format!("创建输出目录 '{}' 失败: {}", output_dir.display(), e))
}

/// 按设置保存渲染结果：颜色图，以及启用时的深度图
pub fn save_render_result(output: &RenderOutput, settings: &RenderSettings) -> Result<(), String> {
    ensure_output_dir(&settings.output_dir)?;

    output.color.write_file(settings.color_path())?;

    if settings.save_depth {
        output.depth.write_file(settings.depth_path())?;
    } else {
        debug!("跳过深度图保存");
    }

    info!(
        "渲染结果已保存到 {}（{} 个面写入 {} 个像素样本）",
        settings.output_dir, output.stats.rasterized_faces, output.stats.written
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::renderer::RenderStats;
    use crate::io::image_buffer::{Image, PixelFormat};

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("zraster_save_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn output() -> RenderOutput {
        let mut color = Image::new(4, 4, PixelFormat::Rgb);
        color.set_pixel(1, 1, &[255, 0, 0]);
        RenderOutput {
            color,
            depth: Image::new(4, 4, PixelFormat::Grayscale),
            stats: RenderStats::default(),
        }
    }

    #[test]
    fn writes_both_images_into_new_directory() {
        let dir = scratch_dir("both").join("nested");
        let settings = RenderSettings {
            output_dir: dir.to_string_lossy().into_owned(),
            format: "png".to_string(),
            ..Default::default()
        };
        save_render_result(&output(), &settings).unwrap();
        assert!(settings.color_path().exists());
        assert!(settings.depth_path().exists());
        let _ = fs::remove_dir_all(scratch_dir("both"));
    }

    #[test]
    fn depth_image_is_optional() {
        let dir = scratch_dir("color_only");
        let settings = RenderSettings {
            output_dir: dir.to_string_lossy().into_owned(),
            save_depth: false,
            ..Default::default()
        };
        save_render_result(&output(), &settings).unwrap();
        assert!(settings.color_path().exists());
        assert!(!settings.depth_path().exists());
        let _ = fs::remove_dir_all(&dir);
    }
}
