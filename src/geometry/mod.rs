// geometry/mod.rs
// 导出几何变换与插值相关模块
pub mod interpolation;
pub mod transform;
