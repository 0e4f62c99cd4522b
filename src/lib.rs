//! 带深度缓冲的软件光栅化渲染器
//!
//! 流水线：旋转 -> 透视投影 -> 视口映射 -> 重心坐标填充 -> 深度合成。

pub mod core;
pub mod geometry;
pub mod io;
pub mod utils;
