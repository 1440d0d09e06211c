// texture.rs: panorama bitmap kept on the CPU so clicks can paint into it

use glam::Vec2;
use image::{imageops::FilterType, DynamicImage, RgbaImage};

#[derive(Debug, Clone, Copy)]
pub struct Brush {
    pub size: u32,
    pub color: [u8; 3],
    pub opacity: f32,
}

impl From<&crate::config::BrushConfig> for Brush {
    fn from(c: &crate::config::BrushConfig) -> Self {
        Self {
            size: c.size,
            color: c.color,
            opacity: c.opacity.clamp(0.0, 1.0),
        }
    }
}

/// The bitmap behind the sphere material. Paint is destructive; there is no
/// undo and no layering. `dirty` marks it for re-upload.
pub struct PanoramaTexture {
    image: RgbaImage,
    generation: u64,
    dirty: bool,
}

impl PanoramaTexture {
    /// Downscales to fit within `max_dimension` so the CPU copy and the GPU
    /// copy always have the same size.
    pub fn new(image: RgbaImage, max_dimension: u32) -> Self {
        let (src_w, src_h) = image.dimensions();

        let image = if max_dimension > 0 && (src_w > max_dimension || src_h > max_dimension) {
            let scale = max_dimension as f32 / src_w.max(src_h) as f32;
            let new_w = ((src_w as f32 * scale) as u32).max(1);
            let new_h = ((src_h as f32 * scale) as u32).max(1);
            log::warn!(
                "panorama {}x{} exceeds GPU limit {}, scaled to {}x{}",
                src_w,
                src_h,
                max_dimension,
                new_w,
                new_h
            );
            DynamicImage::ImageRgba8(image)
                .resize_exact(new_w, new_h, FilterType::Lanczos3)
                .to_rgba8()
        } else {
            image
        };

        Self {
            image,
            generation: 0,
            dirty: true,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Number of paint operations applied so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Texture pixel under a UV hit. UVs of exactly 1.0 land on the last pixel.
    pub fn pixel_at(&self, uv: Vec2) -> (u32, u32) {
        let (w, h) = self.image.dimensions();
        let x = (uv.x * w as f32).floor().clamp(0.0, w.saturating_sub(1) as f32) as u32;
        let y = (uv.y * h as f32).floor().clamp(0.0, h.saturating_sub(1) as f32) as u32;
        (x, y)
    }

    /// Blend a filled square centred on the UV onto the bitmap.
    pub fn paint(&mut self, uv: Vec2, brush: &Brush) {
        let (cx, cy) = self.pixel_at(uv);
        let (w, h) = self.image.dimensions();
        let half = (brush.size / 2) as i64;

        let x0 = (cx as i64 - half).max(0) as u32;
        let y0 = (cy as i64 - half).max(0) as u32;
        let x1 = (cx as i64 - half + brush.size as i64).clamp(0, w as i64) as u32;
        let y1 = (cy as i64 - half + brush.size as i64).clamp(0, h as i64) as u32;

        for y in y0..y1 {
            for x in x0..x1 {
                let px = self.image.get_pixel_mut(x, y);
                px.0 = blend_over(px.0, brush.color, brush.opacity);
            }
        }

        self.generation += 1;
        self.dirty = true;
        log::debug!("painted {}x{} patch at ({}, {})", brush.size, brush.size, cx, cy);
    }

    /// Hands out the bitmap once per change, for upload.
    pub fn take_update(&mut self) -> Option<&RgbaImage> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(&self.image)
    }
}

/// Source-over with straight (non-premultiplied) alpha on both sides.
fn blend_over(dst: [u8; 4], color: [u8; 3], alpha: f32) -> [u8; 4] {
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = alpha + dst_a * (1.0 - alpha);
    if out_a <= 0.0 {
        return dst;
    }
    let mix = |s: u8, d: u8| {
        ((s as f32 * alpha + d as f32 * dst_a * (1.0 - alpha)) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    [
        mix(color[0], dst[0]),
        mix(color[1], dst[1]),
        mix(color[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ]
}
