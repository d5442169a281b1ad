//! Face textures.
//!
//! Each page has two printed faces. A [`FaceRasterizer`] turns the face text
//! into an RGBA image; [`render_book_faces`] runs it over a whole book.

mod raster;

pub use raster::{GlyphBlockRasterizer, Palette};

use crate::error::{BookError, Result};
use crate::types::{BookContent, FaceStyle, PageSide};
use image::ImageEncoder;
use std::path::Path;

/// RGBA8 image data.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
    /// RGBA8 pixel data (4 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Create a new texture from RGBA data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// A texture filled with one color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect();
        Self::new(width, height, pixels)
    }

    pub fn from_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }

    /// Check if this texture has transparency.
    pub fn has_transparency(&self) -> bool {
        self.pixels.chunks(4).any(|pixel| pixel[3] < 255)
    }

    /// Get a pixel at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Encode as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let cursor = std::io::Cursor::new(&mut bytes);
        let encoder = image::codecs::png::PngEncoder::new(cursor);

        encoder
            .write_image(
                &self.pixels,
                self.width,
                self.height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| BookError::Texture(format!("Failed to encode PNG: {}", e)))?;

        Ok(bytes)
    }

    /// Write the texture to a PNG file.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_png()?)?;
        Ok(())
    }
}

/// Rasterizes the text of one face.
///
/// Implementations are treated as pure: the same text and style must always
/// produce the same image.
pub trait FaceRasterizer {
    fn rasterize(&self, text: &str, style: FaceStyle) -> Result<TextureData>;
}

/// Both printed faces of one page.
#[derive(Debug, Clone)]
pub struct PageTextures {
    pub front: TextureData,
    pub back: TextureData,
}

impl PageTextures {
    pub fn side(&self, side: PageSide) -> &TextureData {
        match side {
            PageSide::Front => &self.front,
            PageSide::Back => &self.back,
        }
    }
}

/// Rasterize every face of a book, covers included.
pub fn render_book_faces(
    book: &BookContent,
    rasterizer: &dyn FaceRasterizer,
) -> Result<Vec<PageTextures>> {
    book.pages
        .iter()
        .enumerate()
        .map(|(i, page)| {
            let front = rasterizer.rasterize(&page.front, book.face_style(i, PageSide::Front))?;
            let back = rasterizer.rasterize(&page.back, book.face_style(i, PageSide::Back))?;
            Ok(PageTextures { front, back })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PageContent;

    struct StyleProbe;

    impl FaceRasterizer for StyleProbe {
        fn rasterize(&self, _text: &str, style: FaceStyle) -> Result<TextureData> {
            let shade = if style.is_page() { 255 } else { 0 };
            Ok(TextureData::solid(1, 1, [shade, shade, shade, 255]))
        }
    }

    #[test]
    fn test_solid_texture() {
        let tex = TextureData::solid(2, 3, [10, 20, 30, 255]);
        assert_eq!(tex.pixels.len(), 2 * 3 * 4);
        assert_eq!(tex.get_pixel(1, 2), [10, 20, 30, 255]);
        assert!(!tex.has_transparency());
        assert!(TextureData::solid(1, 1, [0, 0, 0, 128]).has_transparency());
    }

    #[test]
    fn test_png_header() {
        let png = TextureData::solid(4, 4, [255, 255, 255, 255]).to_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.png");
        TextureData::solid(4, 4, [1, 2, 3, 255]).save_png(&path).unwrap();
        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.get_pixel(3, 3).0, [1, 2, 3, 255]);
    }

    #[test]
    fn test_covers_use_cover_style() {
        let book = BookContent::new(vec![PageContent::default(); 3]).unwrap();
        let faces = render_book_faces(&book, &StyleProbe).unwrap();
        assert_eq!(faces.len(), 3);
        assert_eq!(faces[0].front.get_pixel(0, 0)[0], 0);
        assert_eq!(faces[0].back.get_pixel(0, 0)[0], 255);
        assert_eq!(faces[1].side(PageSide::Front).get_pixel(0, 0)[0], 255);
        assert_eq!(faces[2].back.get_pixel(0, 0)[0], 0);
    }
}
