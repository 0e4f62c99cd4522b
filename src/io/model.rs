use nalgebra::Point3;

/// 渲染核心读取网格数据的唯一接口
///
/// 调用方保证 `face < face_count()` 且 `corner < 3`。
pub trait Model {
    fn face_count(&self) -> usize;
    fn vertex(&self, face: usize, corner: usize) -> Point3<f64>;
}

/// 索引三角形网格：每个面恰好引用 3 个顶点
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    positions: Vec<Point3<f64>>,
    faces: Vec<[usize; 3]>,
}

impl TriangleMesh {
    /// 构造网格，任一面引用越界顶点时返回错误
    pub fn new(positions: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Result<Self, String> {
        if let Some((i, face)) = faces
            .iter()
            .enumerate()
            .find(|(_, face)| face.iter().any(|&idx| idx >= positions.len()))
        {
            return Err(format!(
                "面 {} 的顶点索引 {:?} 越界（顶点数 {}）",
                i,
                face,
                positions.len()
            ));
        }
        Ok(Self { positions, faces })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

impl Model for TriangleMesh {
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn vertex(&self, face: usize, corner: usize) -> Point3<f64> {
        self.positions[self.faces[face][corner]]
    }
}
