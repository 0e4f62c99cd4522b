pub mod config_loader;
pub mod image_buffer;
pub mod model;
pub mod obj_loader;
pub mod render_settings;
pub mod simple_cli;
