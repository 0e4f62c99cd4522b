use crate::io::config_loader::TomlConfigLoader;
use crate::io::render_settings::RenderSettings;
use clap::Parser;
use log::info;

/// 极简CLI：一个模型路径，其余参数来自配置文件
#[derive(Parser, Debug)]
#[command(name = "zraster")]
#[command(about = "带深度缓冲的软件光栅化渲染器", version)]
pub struct SimpleCli {
    /// 输入OBJ文件的路径
    #[arg(value_name = "OBJ")]
    pub obj: String,

    /// 配置文件路径（TOML格式）
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// 输出图像的宽度
    #[arg(long)]
    pub width: Option<usize>,

    /// 输出图像的高度
    #[arg(long)]
    pub height: Option<usize>,

    /// 输出图像的目录
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// 使用正交投影
    #[arg(long)]
    pub orthographic: bool,

    /// 叠加线框
    #[arg(long)]
    pub wireframe: bool,

    /// 面颜色的随机种子
    #[arg(long)]
    pub seed: Option<u64>,

    /// 禁用多线程渲染
    #[arg(long)]
    pub single_threaded: bool,
}

impl SimpleCli {
    /// 解析命令行参数并得到最终的渲染设置
    pub fn process() -> Result<RenderSettings, String> {
        Self::parse().into_settings()
    }

    /// 加载配置文件（如果有），再用命令行参数覆盖
    pub fn into_settings(self) -> Result<RenderSettings, String> {
        let mut settings = if let Some(config_path) = &self.config {
            info!("加载配置文件: {}", config_path);
            TomlConfigLoader::load_from_file(config_path)
                .map_err(|e| format!("配置文件加载失败: {}", e))?
        } else {
            RenderSettings::default()
        };

        settings.obj = Some(self.obj);
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(output_dir) = self.output_dir {
            settings.output_dir = output_dir;
        }
        if self.orthographic {
            settings.projection = "orthographic".to_string();
        }
        if self.wireframe {
            settings.wireframe = true;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
            settings.colorize = true;
        }
        if self.single_threaded {
            settings.use_multithreading = false;
        }

        settings.validate()?;
        Ok(settings)
    }
}
