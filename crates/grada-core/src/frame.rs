use image::{DynamicImage, RgbaImage};

/// Straight-alpha RGBA f32 frame.
///
/// Pixel data is interleaved RGBARGBA... and stays in the source's encoded
/// transfer (sRGB or Rec.709), not linear light. The grading stages decode
/// and re-encode internally.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Flat pixel data: [R, G, B, A, R, G, B, A, ...].
    pub data: Vec<f32>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0.0, 0.0, 0.0, 1.0])
    }

    pub fn filled(width: u32, height: u32, rgba: [f32; 4]) -> Self {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// 1x1 opaque black frame shown while a source is loading or after a failed load.
    pub fn placeholder() -> Self {
        Self::filled(1, 1, [0.0, 0.0, 0.0, 1.0])
    }

    pub fn from_data(width: u32, height: u32, data: Vec<f32>) -> anyhow::Result<Self> {
        let expected = (width * height * 4) as usize;
        anyhow::ensure!(
            data.len() == expected,
            "expected {expected} floats for {width}x{height} RGBA, got {}",
            data.len()
        );
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> anyhow::Result<Self> {
        let expected = (width * height * 4) as usize;
        anyhow::ensure!(
            bytes.len() == expected,
            "expected {expected} bytes for {width}x{height} RGBA8, got {}",
            bytes.len()
        );
        let data = bytes.iter().map(|&b| b as f32 / 255.0).collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_dynamic_image(img: &DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            width,
            height,
            data: rgba.as_raw().iter().map(|&b| b as f32 / 255.0).collect(),
        }
    }

    /// Quantize to RGBA8, clamping to [0,1] first.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect()
    }

    pub fn to_rgba_image(&self) -> anyhow::Result<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.to_rgba8())
            .ok_or_else(|| anyhow::anyhow!("frame buffer does not match {}x{}", self.width, self.height))
    }

    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Read a pixel with clamp-to-edge addressing.
    pub fn sample_clamped(&self, x: i64, y: i64) -> [f32; 4] {
        let cx = x.clamp(0, self.width as i64 - 1) as u32;
        let cy = y.clamp(0, self.height as i64 - 1) as u32;
        self.pixel(cx, cy)
    }

    /// 3x3 box average of the RGB channels with clamp-to-edge addressing.
    /// Alpha is carried from the center pixel.
    pub fn box_blur_3x3(&self) -> Frame {
        let mut data = Vec::with_capacity(self.data.len());
        for y in 0..self.height as i64 {
            for x in 0..self.width as i64 {
                let mut sum = [0.0_f32; 3];
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        let p = self.sample_clamped(x + dx, y + dy);
                        sum[0] += p[0];
                        sum[1] += p[1];
                        sum[2] += p[2];
                    }
                }
                let alpha = self.pixel(x as u32, y as u32)[3];
                data.extend_from_slice(&[sum[0] / 9.0, sum[1] / 9.0, sum[2] / 9.0, alpha]);
            }
        }
        Frame {
            width: self.width,
            height: self.height,
            data,
        }
    }
}
