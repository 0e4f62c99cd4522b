use image::ColorType;
use log::info;
use std::path::Path;

/// 像素格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Grayscale,
    Rgb,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Grayscale => 1,
            PixelFormat::Rgb => 3,
        }
    }

    fn color_type(&self) -> ColorType {
        match self {
            PixelFormat::Grayscale => ColorType::L8,
            PixelFormat::Rgb => ColorType::Rgb8,
        }
    }
}

/// 拥有所有权的二维像素缓冲区，所有访问都带边界检查
///
/// 坐标原点位于左下角（y 轴向上），写文件时垂直翻转。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: usize,
    height: usize,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Image {
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            data: vec![0; width * height * format.bytes_per_pixel()],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) * self.format.bytes_per_pixel())
    }

    /// 写入一个像素；越界或颜色通道不足时不做任何事并返回 false
    pub fn set_pixel(&mut self, x: i32, y: i32, color: &[u8]) -> bool {
        let bpp = self.format.bytes_per_pixel();
        if color.len() < bpp {
            return false;
        }
        match self.offset(x, y) {
            Some(start) => {
                self.data[start..start + bpp].copy_from_slice(&color[..bpp]);
                true
            }
            None => false,
        }
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Option<&[u8]> {
        let bpp = self.format.bytes_per_pixel();
        self.offset(x, y).map(|start| &self.data[start..start + bpp])
    }

    /// 写出到文件，格式由扩展名决定（tga、png 等）
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let row_bytes = self.width * self.format.bytes_per_pixel();
        // 翻转为自上而下的行顺序
        let flipped: Vec<u8> = if row_bytes == 0 {
            Vec::new()
        } else {
            self.data
                .chunks_exact(row_bytes)
                .rev()
                .flatten()
                .copied()
                .collect()
        };
        image::save_buffer(
            path,
            &flipped,
            self.width as u32,
            self.height as u32,
            self.format.color_type(),
        )
        .map_err(|e| format!("保存图像到 {} 时出错: {}", path.display(), e))?;
        info!("图像已保存到 {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_image_is_black() {
        let img = Image::new(4, 3, PixelFormat::Rgb);
        assert_eq!(img.as_bytes().len(), 36);
        assert!(img.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn set_and_get_pixel() {
        let mut img = Image::new(4, 4, PixelFormat::Rgb);
        assert!(img.set_pixel(1, 2, &[10, 20, 30]));
        assert_eq!(img.get_pixel(1, 2), Some(&[10u8, 20, 30][..]));
        assert_eq!(img.get_pixel(2, 1), Some(&[0u8, 0, 0][..]));
    }

    #[test]
    fn out_of_range_writes_are_dropped() {
        let mut img = Image::new(4, 4, PixelFormat::Grayscale);
        assert!(!img.set_pixel(-1, 0, &[255]));
        assert!(!img.set_pixel(0, 4, &[255]));
        assert!(!img.set_pixel(4, 0, &[255]));
        assert!(img.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(img.get_pixel(4, 4), None);
    }

    #[test]
    fn short_color_is_rejected() {
        let mut img = Image::new(2, 2, PixelFormat::Rgb);
        assert!(!img.set_pixel(0, 0, &[1, 2]));
    }

    #[test]
    fn grayscale_takes_first_channel() {
        let mut img = Image::new(2, 2, PixelFormat::Grayscale);
        assert!(img.set_pixel(1, 1, &[200, 1, 2]));
        assert_eq!(img.get_pixel(1, 1), Some(&[200u8][..]));
    }

    #[test]
    fn write_file_round_trips_through_png() {
        let mut img = Image::new(3, 2, PixelFormat::Rgb);
        img.set_pixel(0, 0, &[255, 0, 0]);
        let path = std::env::temp_dir().join(format!("zraster_image_{}.png", std::process::id()));
        img.write_file(&path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgb8();
        let _ = std::fs::remove_file(&path);
        // (0,0) 在左下角，翻转后位于文件的最后一行
        assert_eq!(loaded.get_pixel(0, 1).0, [255, 0, 0]);
        assert_eq!(loaded.get_pixel(0, 0).0, [0, 0, 0]);
    }
}
