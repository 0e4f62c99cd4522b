pub mod frame_buffer;
pub mod line;
pub mod rasterizer;
pub mod renderer;
