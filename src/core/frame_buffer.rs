use crate::io::image_buffer::{Image, PixelFormat};
use crate::utils::color::Rgb;
use std::sync::atomic::{AtomicU64, Ordering};

/// 深度缓冲区的初始值，表示"尚未绘制"
pub const FAR_DEPTH: u8 = 0;

/// 未绘制像素的样本：深度与优先级都最低
const EMPTY_SAMPLE: u64 = 0;

// 样本布局：深度 [56, 64)，优先级 [24, 56)，RGB [0, 24)
// 优先级为 u32::MAX - order，故 order 越小优先级越高
#[inline]
fn pack(depth: u8, order: u32, color: Rgb) -> u64 {
    ((depth as u64) << 56)
        | (((u32::MAX - order) as u64) << 24)
        | ((color[0] as u64) << 16)
        | ((color[1] as u64) << 8)
        | color[2] as u64
}

/// 深度测试比较的键：先比深度，再比优先级
#[inline]
fn rank(sample: u64) -> u64 {
    sample >> 24
}

#[inline]
fn unpack_depth(sample: u64) -> u8 {
    (sample >> 56) as u8
}

#[inline]
fn unpack_color(sample: u64) -> Rgb {
    [(sample >> 16) as u8, (sample >> 8) as u8, sample as u8]
}

/// 帧缓冲区：颜色与深度
///
/// 每个像素的深度、写入优先级和 RGB 打包在同一个原子变量中，
/// 深度测试与颜色写入通过一次比较交换完成，因此可以从多个线程并行写入。
/// 深度约定：数值越大越靠近相机。深度相同时 order 较小者获胜，
/// 所以结果与写入的先后顺序无关。
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    samples: Vec<AtomicU64>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let samples = (0..width * height)
            .map(|_| AtomicU64::new(EMPTY_SAMPLE))
            .collect();

        FrameBuffer {
            width,
            height,
            samples,
        }
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// 深度测试并写入
    ///
    /// 仅当新深度严格大于已存深度时写入颜色和深度；相等时保留先写入者。
    /// 越界坐标直接丢弃。返回是否写入。
    pub fn composite(&self, x: usize, y: usize, depth: u8, color: Rgb) -> bool {
        self.composite_ordered(x, y, depth, 0, color)
    }

    /// 带写入顺序的深度测试
    ///
    /// 深度相同时 `order` 较小的片元获胜，`order` 也相同时保留先写入者。
    /// 深度为 `FAR_DEPTH` 的片元永远不会写入。
    pub fn composite_ordered(&self, x: usize, y: usize, depth: u8, order: u32, color: Rgb) -> bool {
        let Some(index) = self.index(x, y) else {
            return false;
        };
        if depth == FAR_DEPTH {
            return false;
        }
        let packed = pack(depth, order, color);
        self.samples[index]
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (rank(packed) > rank(current)).then_some(packed)
            })
            .is_ok()
    }

    pub fn depth_at(&self, x: usize, y: usize) -> Option<u8> {
        self.index(x, y)
            .map(|i| unpack_depth(self.samples[i].load(Ordering::Acquire)))
    }

    pub fn color_at(&self, x: usize, y: usize) -> Option<Rgb> {
        self.index(x, y)
            .map(|i| unpack_color(self.samples[i].load(Ordering::Acquire)))
    }

    /// 获取颜色缓冲区的字节数据（RGB，行主序，y 向上）
    pub fn get_color_buffer_bytes(&self) -> Vec<u8> {
        self.samples
            .iter()
            .flat_map(|sample| unpack_color(sample.load(Ordering::Acquire)))
            .collect()
    }

    /// 获取深度缓冲区的字节数据
    pub fn get_depth_buffer_bytes(&self) -> Vec<u8> {
        self.samples
            .iter()
            .map(|sample| unpack_depth(sample.load(Ordering::Acquire)))
            .collect()
    }

    /// 导出为 RGB 颜色图和灰度深度图
    pub fn to_images(&self) -> (Image, Image) {
        let mut color = Image::new(self.width, self.height, PixelFormat::Rgb);
        let mut depth = Image::new(self.width, self.height, PixelFormat::Grayscale);
        for y in 0..self.height {
            for x in 0..self.width {
                let sample = self.samples[y * self.width + x].load(Ordering::Acquire);
                color.set_pixel(x as i32, y as i32, &unpack_color(sample));
                depth.set_pixel(x as i32, y as i32, &[unpack_depth(sample)]);
            }
        }
        (color, depth)
    }
}
