use crate::io::model::TriangleMesh;
use log::{debug, info, warn};
use nalgebra::Point3;
use std::io::BufReader;
use std::path::Path;

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,   // 将所有面转换为三角形
        single_index: false, // 只使用位置索引
        ignore_points: true, // 忽略点元素
        ignore_lines: true,  // 忽略线元素
    }
}

/// 把 tobj 的多个模型合并为一个三角形网格
///
/// 引用越界顶点的面会被跳过并记录警告。
fn merge_models(models: &[tobj::Model]) -> Result<TriangleMesh, String> {
    let mut positions: Vec<Point3<f64>> = Vec::new();
    let mut faces: Vec<[usize; 3]> = Vec::new();
    let mut skipped = 0usize;

    for model in models {
        let mesh = &model.mesh;
        let vertex_offset = positions.len();
        let num_vertices = mesh.positions.len() / 3;

        positions.extend(
            mesh.positions
                .chunks_exact(3)
                .map(|p| Point3::new(p[0] as f64, p[1] as f64, p[2] as f64)),
        );

        for (i, indices) in mesh.indices.chunks_exact(3).enumerate() {
            let [i0, i1, i2] = [indices[0], indices[1], indices[2]].map(|idx| idx as usize);

            // 边界检查
            if i0 >= num_vertices || i1 >= num_vertices || i2 >= num_vertices {
                warn!("模型 '{}' 的面 {} 包含越界的顶点索引，跳过", model.name, i);
                skipped += 1;
                continue;
            }
            faces.push([i0 + vertex_offset, i1 + vertex_offset, i2 + vertex_offset]);
        }
        debug!(
            "子模型 '{}': {} 个顶点, {} 个面",
            model.name,
            num_vertices,
            mesh.indices.len() / 3
        );
    }

    if skipped > 0 {
        warn!("共跳过 {} 个无效面", skipped);
    }

    TriangleMesh::new(positions, faces).map_err(|e| format!("合并模型失败: {}", e))
}

/// 加载 OBJ 文件为三角形网格；文件缺失或无法解析时返回错误
pub fn load_obj_model<P: AsRef<Path>>(obj_path: P) -> Result<TriangleMesh, String> {
    let obj_path_ref = obj_path.as_ref();
    info!("加载 OBJ 文件: {:?}", obj_path_ref);

    if !obj_path_ref.exists() {
        return Err(format!("错误：输入的 OBJ 文件未找到：{}", obj_path_ref.display()));
    }

    // 材质与本渲染器无关，忽略 MTL 加载结果
    let (models, _materials) = tobj::load_obj(obj_path_ref, &load_options())
        .map_err(|e| format!("加载 OBJ 失败: {}", e))?;

    let mesh = merge_models(&models)?;
    info!(
        "模型加载完成: {} 个顶点, {} 个面",
        mesh.vertex_count(),
        mesh.faces().len()
    );
    Ok(mesh)
}

/// 从内存中的 OBJ 文本解析网格（不加载 MTL）
pub fn parse_obj_content(content: &str) -> Result<TriangleMesh, String> {
    let mut reader = BufReader::new(content.as_bytes());
    let (models, _materials) = tobj::load_obj_buf(&mut reader, &load_options(), |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })
    .map_err(|e| format!("解析 OBJ 失败: {}", e))?;

    merge_models(&models)
}
