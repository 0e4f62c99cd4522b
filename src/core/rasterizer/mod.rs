//! # 三角形光栅化模块
//!
//! 基于重心坐标的三角形填充：包围盒遍历、有向面积剔除、深度插值，
//! 支持按行并行的像素填充。

pub mod pixel_processor;
pub mod triangle_data;

// 重新导出主要类型和函数
pub use pixel_processor::{RasterCounts, rasterize_pixel, rasterize_triangle};
pub use triangle_data::{BoundingBox, Fragment, MIN_COVERAGE_AREA, Triangle};
