use env_logger::Env;
use log::info;
use std::time::Instant;
use zraster::core::renderer::Renderer;
use zraster::io::obj_loader::load_obj_model;
use zraster::io::simple_cli::SimpleCli;
use zraster::utils::save_utils::save_render_result;

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let start_time = Instant::now();

    let settings = SimpleCli::process()?;
    let obj_path = settings
        .obj
        .as_deref()
        .ok_or_else(|| "未指定OBJ文件".to_string())?;
    let mesh = load_obj_model(obj_path)?;

    let renderer = Renderer::from_settings(&settings)?;
    let output = renderer.render(&mesh);
    save_render_result(&output, &settings)?;

    info!("总耗时 {:?}", start_time.elapsed());
    Ok(())
}
