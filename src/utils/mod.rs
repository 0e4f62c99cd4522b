// utils/mod.rs
// 颜色策略与结果保存
pub mod color;
pub mod save_utils;
