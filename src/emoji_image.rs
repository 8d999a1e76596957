//! Image bytes on their way to becoming a guild emoji.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::imageops::FilterType;
use image::{GenericImageView, ImageFormat};
use log::{debug, warn};
use std::io::Cursor;

/// Edge length Discord renders emojis at.
pub const EMOJI_SIZE: u32 = 128;

/// Share of the shorter side kept when zooming into a generated image.
const CENTER_CROP_RATIO: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiImage {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

impl EmojiImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        let content_type = sniff_content_type(&bytes);
        EmojiImage {
            bytes,
            content_type,
        }
    }

    /// Data URI in the form the emoji endpoint accepts.
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.bytes)
        )
    }

    pub fn is_gif(&self) -> bool {
        self.content_type == "image/gif"
    }

    /// Zooms into the center of a generated image and scales it to emoji size.
    /// Falls back to the untouched bytes if the image can't be processed.
    pub fn prepare_generated(self) -> Self {
        match center_crop_and_resize(&self.bytes) {
            Ok(bytes) => EmojiImage::new(bytes),
            Err(e) => {
                warn!("⚠️ Image resize failed, using original: {}", e);
                self
            }
        }
    }

    /// Shrinks oversized static images. GIFs are left alone to keep their animation.
    pub fn prepare_static(self) -> Self {
        if self.is_gif() {
            return self;
        }

        match shrink_if_oversized(&self.bytes) {
            Ok(Some(bytes)) => EmojiImage::new(bytes),
            Ok(None) => self,
            Err(e) => {
                warn!("⚠️ Image resize failed, using original: {}", e);
                self
            }
        }
    }
}

fn sniff_content_type(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        Ok(ImageFormat::Gif) => "image/gif",
        _ => "image/png",
    }
}

fn center_crop_and_resize(bytes: &[u8]) -> image::ImageResult<Vec<u8>> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = img.dimensions();

    let crop = ((width.min(height) as f64) * CENTER_CROP_RATIO).round().max(1.0) as u32;
    let left = (width - crop) / 2;
    let top = (height - crop) / 2;
    debug!(
        "Cropping {}x{} image to {}x{} at ({}, {})",
        width, height, crop, crop, left, top
    );

    let resized = img
        .crop_imm(left, top, crop, crop)
        .resize_exact(EMOJI_SIZE, EMOJI_SIZE, FilterType::Lanczos3);
    encode_png(&resized)
}

fn shrink_if_oversized(bytes: &[u8]) -> image::ImageResult<Option<Vec<u8>>> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = img.dimensions();
    if width <= EMOJI_SIZE && height <= EMOJI_SIZE {
        return Ok(None);
    }

    let resized = img.resize_exact(EMOJI_SIZE, EMOJI_SIZE, FilterType::Lanczos3);
    encode_png(&resized).map(Some)
}

fn encode_png(img: &image::DynamicImage) -> image::ImageResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn png_of_size(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([255, 128, 0, 255]));
        encode_png(&DynamicImage::ImageRgba8(img)).unwrap()
    }

    fn dimensions_of(bytes: &[u8]) -> (u32, u32) {
        image::load_from_memory(bytes).unwrap().dimensions()
    }

    #[test]
    fn test_content_type_is_one_of_png_jpeg_gif() {
        assert_eq!(EmojiImage::new(b"GIF89a....".to_vec()).content_type, "image/gif");
        assert_eq!(
            EmojiImage::new(vec![0xFF, 0xD8, 0xFF, 0xE0, 0, 0]).content_type,
            "image/jpeg"
        );
        assert_eq!(EmojiImage::new(b"RIFF\0\0\0\0WEBPVP8 ".to_vec()).content_type, "image/png");
        assert_eq!(EmojiImage::new(b"not an image".to_vec()).content_type, "image/png");
    }

    #[test]
    fn test_prepare_generated_produces_emoji_sized_png() {
        let image = EmojiImage::new(png_of_size(300, 200)).prepare_generated();
        assert_eq!(image.content_type, "image/png");
        assert_eq!(dimensions_of(&image.bytes), (EMOJI_SIZE, EMOJI_SIZE));
    }

    #[test]
    fn test_prepare_generated_keeps_garbage_bytes() {
        let garbage = b"definitely not an image".to_vec();
        let image = EmojiImage::new(garbage.clone()).prepare_generated();
        assert_eq!(image.bytes, garbage);
    }

    #[test]
    fn test_prepare_static_leaves_small_images() {
        let original = png_of_size(64, 64);
        let image = EmojiImage::new(original.clone()).prepare_static();
        assert_eq!(image.bytes, original);
    }

    #[test]
    fn test_prepare_static_shrinks_large_images() {
        let image = EmojiImage::new(png_of_size(512, 256)).prepare_static();
        assert_eq!(dimensions_of(&image.bytes), (EMOJI_SIZE, EMOJI_SIZE));
    }

    #[test]
    fn test_gif_is_detected_and_untouched() {
        let gif = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;".to_vec();
        let image = EmojiImage::new(gif.clone());
        assert!(image.is_gif());
        assert_eq!(image.prepare_static().bytes, gif);
    }

    #[test]
    fn test_data_uri() {
        let image = EmojiImage {
            bytes: b"abc".to_vec(),
            content_type: "image/png",
        };
        assert_eq!(image.data_uri(), "data:image/png;base64,YWJj");
    }
}
