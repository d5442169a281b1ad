use super::{FaceRasterizer, TextureData};
use crate::config::TextureConfig;
use crate::error::{BookError, Result};
use crate::types::FaceStyle;
use image::{Rgba, RgbaImage};

/// Colors of one face style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: [u8; 4],
    pub ink: [u8; 4],
    /// Cover border; rule lines on pages.
    pub accent: [u8; 4],
}

impl Palette {
    pub fn page() -> Self {
        Self {
            background: [250, 246, 236, 255],
            ink: [48, 44, 40, 255],
            accent: [226, 220, 206, 255],
        }
    }

    pub fn cover() -> Self {
        Self {
            background: [34, 52, 88, 255],
            ink: [236, 214, 160, 255],
            accent: [200, 170, 110, 255],
        }
    }
}

/// Draws text as greeked glyph blocks: every visible character becomes a
/// small filled cell, laid out with greedy word wrapping.
///
/// Pages are left aligned under a top margin with faint rule lines. Covers
/// use larger cells, center each line both ways and get a framed border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphBlockRasterizer {
    pub width: u32,
    pub height: u32,
    pub page_palette: Palette,
    pub cover_palette: Palette,
}

impl GlyphBlockRasterizer {
    pub fn new(config: &TextureConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            page_palette: Palette::page(),
            cover_palette: Palette::cover(),
        }
    }

    fn layout(&self, style: FaceStyle) -> Layout {
        let margin = (self.width / 12).max(1);
        let cell_w = match style {
            FaceStyle::Page => (self.width / 48).max(2),
            FaceStyle::Cover => (self.width / 20).max(2),
        };
        let cell_h = cell_w * 2;
        let line_h = cell_h + cell_h / 2;
        let usable = self.width.saturating_sub(margin * 2);
        Layout {
            margin,
            cell_w,
            cell_h,
            line_h,
            columns: (usable / cell_w).max(1) as usize,
        }
    }
}

impl Default for GlyphBlockRasterizer {
    fn default() -> Self {
        Self::new(&TextureConfig::default())
    }
}

struct Layout {
    margin: u32,
    cell_w: u32,
    cell_h: u32,
    line_h: u32,
    columns: usize,
}

impl FaceRasterizer for GlyphBlockRasterizer {
    fn rasterize(&self, text: &str, style: FaceStyle) -> Result<TextureData> {
        if self.width == 0 || self.height == 0 {
            return Err(BookError::Texture(format!(
                "cannot rasterize a {}x{} face",
                self.width, self.height
            )));
        }

        let palette = match style {
            FaceStyle::Page => self.page_palette,
            FaceStyle::Cover => self.cover_palette,
        };
        let layout = self.layout(style);
        let mut img = RgbaImage::from_pixel(self.width, self.height, Rgba(palette.background));

        let lines = wrap(text, layout.columns);
        let max_lines = (self.height.saturating_sub(layout.margin * 2) / layout.line_h) as usize;
        if lines.len() > max_lines {
            log::debug!(
                "face text needs {} lines, {} fit; truncating",
                lines.len(),
                max_lines
            );
        }
        let shown = &lines[..lines.len().min(max_lines)];

        match style {
            FaceStyle::Page => {
                for row in 0..max_lines {
                    let y = layout.margin + row as u32 * layout.line_h + layout.cell_h + 1;
                    fill_rect(&mut img, layout.margin, y, self.width - layout.margin * 2, 1, palette.accent);
                }
                for (row, line) in shown.iter().enumerate() {
                    let y = layout.margin + row as u32 * layout.line_h;
                    draw_line(&mut img, line, layout.margin, y, &layout, palette.ink);
                }
            }
            FaceStyle::Cover => {
                let inset = layout.margin / 2;
                stroke_rect(&mut img, inset, inset, self.width - inset * 2, self.height - inset * 2, 3, palette.accent);

                let block_h = shown.len() as u32 * layout.line_h;
                let top = self.height.saturating_sub(block_h) / 2;
                for (row, line) in shown.iter().enumerate() {
                    let line_w = line.chars().count() as u32 * layout.cell_w;
                    let x = self.width.saturating_sub(line_w) / 2;
                    let y = top + row as u32 * layout.line_h;
                    draw_line(&mut img, line, x, y, &layout, palette.ink);
                }
            }
        }

        Ok(TextureData::from_image(img))
    }
}

/// Greedy word wrap to at most `columns` characters per line. Explicit
/// newlines start a new paragraph; overlong words are split.
pub(crate) fn wrap(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        let mut line_len = 0usize;

        for word in paragraph.split_whitespace() {
            let mut chars: Vec<char> = word.chars().collect();

            while chars.len() > columns {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                let rest = chars.split_off(columns);
                lines.push(chars.into_iter().collect());
                chars = rest;
            }

            let needed = if line_len == 0 { chars.len() } else { line_len + 1 + chars.len() };
            if needed > columns {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(chars.iter());
            line_len += chars.len();
        }

        if line_len > 0 {
            lines.push(line);
        }
    }
    lines
}

fn draw_line(img: &mut RgbaImage, line: &str, x: u32, y: u32, layout: &Layout, ink: [u8; 4]) {
    let glyph_w = layout.cell_w.saturating_sub(1).max(1);
    for (col, ch) in line.chars().enumerate() {
        if ch.is_whitespace() {
            continue;
        }
        // Lowercase sits on the baseline at x-height
        let glyph_h = if ch.is_lowercase() { layout.cell_h * 2 / 3 } else { layout.cell_h };
        let gx = x + col as u32 * layout.cell_w;
        let gy = y + (layout.cell_h - glyph_h);
        fill_rect(img, gx, gy, glyph_w, glyph_h, ink);
    }
}

fn fill_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: [u8; 4]) {
    let x_end = (x + w).min(img.width());
    let y_end = (y + h).min(img.height());
    for py in y.min(y_end)..y_end {
        for px in x.min(x_end)..x_end {
            img.put_pixel(px, py, Rgba(color));
        }
    }
}

fn stroke_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, thickness: u32, color: [u8; 4]) {
    fill_rect(img, x, y, w, thickness, color);
    fill_rect(img, x, (y + h).saturating_sub(thickness), w, thickness, color);
    fill_rect(img, x, y, thickness, h, color);
    fill_rect(img, (x + w).saturating_sub(thickness), y, thickness, h, color);
}
