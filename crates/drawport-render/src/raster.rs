//! Rendered images and their encodings.

use crate::renderer::{RenderError, RenderResult};

/// PNG text keyword under which an embedded scene is stored.
pub const SCENE_METADATA_KEY: &str = "application/vnd.excalidraw+json";

/// Amount of the dark-mode invert filter.
const DARK_MODE_INVERT: f32 = 0.93;

/// An RGBA8 image with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Wrap RGBA8 pixel data; the buffer must hold `width * height * 4` bytes.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> RenderResult<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RenderError::Encode(format!(
                "pixel buffer has {} bytes, expected {} for {}x{}",
                pixels.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Height divided by width.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width == 0 {
            return 1.0;
        }
        self.height as f64 / self.width as f64
    }

    /// Whether every pixel is fully opaque.
    pub fn is_opaque(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 255)
    }

    /// Split into an RGB plane and an alpha plane.
    pub fn split_alpha(&self) -> (Vec<u8>, Vec<u8>) {
        let count = self.pixels.len() / 4;
        let mut rgb = Vec::with_capacity(count * 3);
        let mut alpha = Vec::with_capacity(count);
        for px in self.pixels.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
            alpha.push(px[3]);
        }
        (rgb, alpha)
    }

    /// Apply the dark-mode look: `invert(93%) hue-rotate(180deg)`.
    ///
    /// Alpha is left untouched.
    pub fn apply_dark_mode_filter(&mut self) {
        let matrix = hue_rotate_matrix(std::f32::consts::PI);
        for px in self.pixels.chunks_exact_mut(4) {
            let inverted = [0, 1, 2].map(|c| {
                let v = px[c] as f32 / 255.0;
                v * (1.0 - DARK_MODE_INVERT) + (1.0 - v) * DARK_MODE_INVERT
            });
            for (c, row) in matrix.iter().enumerate() {
                let v = row[0] * inverted[0] + row[1] * inverted[1] + row[2] * inverted[2];
                px[c] = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
        }
    }

    /// Encode as PNG, optionally embedding scene JSON in an iTXt chunk.
    pub fn to_png(&self, scene_metadata: Option<&str>) -> RenderResult<Vec<u8>> {
        let mut png_data = Vec::new();
        {
            let mut encoder = ::png::Encoder::new(&mut png_data, self.width, self.height);
            encoder.set_color(::png::ColorType::Rgba);
            encoder.set_depth(::png::BitDepth::Eight);
            if let Some(metadata) = scene_metadata {
                encoder
                    .add_itxt_chunk(SCENE_METADATA_KEY.to_string(), metadata.to_string())
                    .map_err(|e| RenderError::Encode(e.to_string()))?;
            }
            let mut writer = encoder
                .write_header()
                .map_err(|e| RenderError::Encode(e.to_string()))?;
            writer
                .write_image_data(&self.pixels)
                .map_err(|e| RenderError::Encode(e.to_string()))?;
            writer
                .finish()
                .map_err(|e| RenderError::Encode(e.to_string()))?;
        }
        Ok(png_data)
    }
}

/// CSS `hue-rotate()` color matrix for an angle in radians.
fn hue_rotate_matrix(angle: f32) -> [[f32; 3]; 3] {
    let (sin, cos) = angle.sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RasterImage {
        let pixels = rgba.repeat((width * height) as usize);
        RasterImage::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_rejects_wrong_buffer_size() {
        assert!(RasterImage::new(2, 2, vec![0; 15]).is_err());
    }

    #[test]
    fn test_split_alpha() {
        let image = RasterImage::new(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let (rgb, alpha) = image.split_alpha();
        assert_eq!(rgb, vec![1, 2, 3, 5, 6, 7]);
        assert_eq!(alpha, vec![4, 8]);
        assert!(!image.is_opaque());
    }

    #[test]
    fn test_dark_mode_turns_white_dark_gray() {
        let mut image = solid(1, 1, [255, 255, 255, 255]);
        image.apply_dark_mode_filter();
        let [r, g, b, a] = image.pixel(0, 0).unwrap();
        for c in [r, g, b] {
            assert!((17..=19).contains(&c), "channel {c}");
        }
        assert_eq!(a, 255);
    }

    #[test]
    fn test_dark_mode_keeps_alpha() {
        let mut image = solid(1, 1, [0, 0, 0, 0]);
        image.apply_dark_mode_filter();
        assert_eq!(image.pixel(0, 0).unwrap()[3], 0);
    }

    #[test]
    fn test_png_signature_and_metadata() {
        let image = solid(3, 2, [10, 20, 30, 255]);
        let png = image.to_png(Some(r#"{"type":"excalidraw"}"#)).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

        let decoder = ::png::Decoder::new(std::io::Cursor::new(png));
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        assert_eq!((info.width, info.height), (3, 2));
        assert!(
            info.utf8_text
                .iter()
                .any(|chunk| chunk.keyword == SCENE_METADATA_KEY)
        );
    }
}
