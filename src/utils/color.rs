use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 8 位 RGB 颜色
pub type Rgb = [u8; 3];

pub const BLACK: Rgb = [0, 0, 0];
pub const WHITE: Rgb = [255, 255, 255];

/// 三角形面颜色策略
///
/// 没有着色模型时每个面使用一个占位颜色。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceColoring {
    /// 伪随机颜色，只由种子和面索引决定，与处理顺序无关
    Random { seed: u64 },
    /// 所有面使用同一颜色
    Solid(Rgb),
}

impl Default for FaceColoring {
    fn default() -> Self {
        FaceColoring::Random { seed: 0 }
    }
}

impl FaceColoring {
    pub fn color_of(&self, face_index: usize) -> Rgb {
        match *self {
            FaceColoring::Random { seed } => random_face_color(seed, face_index),
            FaceColoring::Solid(color) => color,
        }
    }
}

/// 为面生成确定性的伪随机颜色
pub fn random_face_color(seed: u64, face_index: usize) -> Rgb {
    let mut rng = StdRng::seed_from_u64(seed ^ face_index as u64);
    [
        rng.random_range(0..255),
        rng.random_range(0..255),
        rng.random_range(0..255),
    ]
}

/// 解析 "r,g,b" 格式的颜色字符串
pub fn parse_rgb(s: &str) -> Result<Rgb, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("颜色 '{}' 需要3个逗号分隔的值", s));
    }
    let mut rgb = BLACK;
    for (channel, part) in rgb.iter_mut().zip(parts.iter()) {
        *channel = part
            .trim()
            .parse::<u8>()
            .map_err(|e| format!("无效颜色分量 '{}': {}", part, e))?;
    }
    Ok(rgb)
}
