// overlay.rs: flat view: source image with the mask tinted on top

use crate::app::{MountContext, View, Viewport};
use crate::config::OverlayConfig;
use crate::error::{Result, ViewerError};
use crate::input::InputEvent;
use crate::listeners::{EventKind, Listeners, Subscriptions};
use crate::state::{AppState, Click, ClickLabel};
use egui::{Color32, ColorImage, Pos2, Rect, Sense, TextureHandle, TextureOptions, Vec2};
use image::imageops::{self, FilterType};
use image::RgbaImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    Width,
    Height,
}

/// Images wider (relative to height) than the viewport fill its width.
pub fn fit_mode(image: (u32, u32), viewport: Viewport) -> FitMode {
    let (w, h) = image;
    let image_aspect = if h == 0 { 1.0 } else { w as f32 / h as f32 };
    if image_aspect > viewport.aspect() {
        FitMode::Width
    } else {
        FitMode::Height
    }
}

/// Size to draw an image at inside `available`, keeping its aspect.
pub fn fit_size(image: (u32, u32), mode: FitMode, available: Vec2) -> Vec2 {
    let (w, h) = (image.0.max(1) as f32, image.1.max(1) as f32);
    match mode {
        FitMode::Width => Vec2::new(available.x, available.x * h / w),
        FitMode::Height => Vec2::new(available.y * w / h, available.y),
    }
}

/// Every pixel with any coverage takes the highlight color; alpha is kept.
pub fn tint_mask(mask: &mut RgbaImage, highlight: [u8; 3]) {
    for px in mask.pixels_mut() {
        if px.0[3] > 0 {
            px.0[0] = highlight[0];
            px.0[1] = highlight[1];
            px.0[2] = highlight[2];
        }
    }
}

pub fn check_dimensions(image: &RgbaImage, mask: &RgbaImage) -> Result<()> {
    if image.dimensions() == mask.dimensions() {
        return Ok(());
    }
    Err(ViewerError::DimensionMismatch {
        image_w: image.width(),
        image_h: image.height(),
        mask_w: mask.width(),
        mask_h: mask.height(),
    })
}

/// Copy of `pixels` shrunk to fit within `max_dimension` on both sides, or
/// `None` when it already fits. The canvas itself keeps its size.
fn scaled_for_upload(pixels: &RgbaImage, max_dimension: u32) -> Option<RgbaImage> {
    let (w, h) = pixels.dimensions();
    if max_dimension == 0 || (w <= max_dimension && h <= max_dimension) {
        return None;
    }
    let scale = max_dimension as f32 / w.max(h) as f32;
    let new_w = ((w as f32 * scale) as u32).clamp(1, max_dimension);
    let new_h = ((h as f32 * scale) as u32).clamp(1, max_dimension);
    log::warn!(
        "overlay {}x{} exceeds GPU limit {}, uploading {}x{}",
        w,
        h,
        max_dimension,
        new_w,
        new_h
    );
    Some(imageops::resize(pixels, new_w, new_h, FilterType::Triangle))
}

/// Pointer position inside `rect` to image pixel coordinates.
pub fn to_image_coords(pointer: Pos2, rect: Rect, image: (u32, u32)) -> Option<(f32, f32)> {
    if !rect.contains(pointer) || rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let x = (pointer.x - rect.min.x) / rect.width() * image.0 as f32;
    let y = (pointer.y - rect.min.y) / rect.height() * image.1 as f32;
    Some((x, y))
}

/// A CPU raster standing in for a 2D drawing surface.
struct Canvas {
    pixels: RgbaImage,
    draws: u64,
}

impl Canvas {
    fn new() -> Self {
        Self {
            pixels: RgbaImage::new(0, 0),
            draws: 0,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Resize to the source and draw it at the origin.
    fn draw(&mut self, source: &RgbaImage) {
        self.pixels.clone_from(source);
        self.draws += 1;
    }
}

pub struct OverlayView {
    config: OverlayConfig,
    subs: Subscriptions,
    viewport: Viewport,
    max_texture_dimension: u32,
    fit: FitMode,
    image_canvas: Option<Canvas>,
    mask_canvas: Option<Canvas>,
    seen_image: Option<u64>,
    seen_mask: Option<u64>,
    image_texture: Option<TextureHandle>,
    mask_texture: Option<TextureHandle>,
    last_hover: Option<(f32, f32)>,
}

impl OverlayView {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            subs: Subscriptions::default(),
            viewport: Viewport::new(1, 1),
            max_texture_dimension: 0,
            fit: FitMode::Width,
            image_canvas: None,
            mask_canvas: None,
            seen_image: None,
            seen_mask: None,
            image_texture: None,
            mask_texture: None,
            last_hover: None,
        }
    }

    fn refit(&mut self) {
        if let Some(canvas) = &self.image_canvas {
            self.fit = fit_mode(canvas.dimensions(), self.viewport);
        }
    }

    fn sync_image(&mut self, state: &AppState) {
        let slot = state.image();
        if self.seen_image == Some(slot.revision()) {
            return;
        }
        self.seen_image = Some(slot.revision());
        self.image_texture = None;

        match slot.get() {
            Some(image) => {
                let canvas = self.image_canvas.get_or_insert_with(Canvas::new);
                canvas.draw(image);
                log::debug!("image canvas {:?} drawn ({} draws)", canvas.dimensions(), canvas.draws);
                self.refit();
            }
            None => self.image_canvas = None,
        }
        // a new image can make the current mask (in)valid
        self.seen_mask = None;
    }

    fn sync_mask(&mut self, state: &AppState) {
        let slot = state.mask();
        if self.seen_mask == Some(slot.revision()) {
            return;
        }
        self.seen_mask = Some(slot.revision());
        self.mask_texture = None;

        let Some(mask) = slot.get() else {
            self.mask_canvas = None;
            return;
        };

        if let Some(image) = state.image().get() {
            if let Err(e) = check_dimensions(image, mask) {
                log::warn!("mask rejected: {}", e);
                self.mask_canvas = None;
                return;
            }
        }

        let canvas = self.mask_canvas.get_or_insert_with(Canvas::new);
        canvas.draw(mask);
        tint_mask(&mut canvas.pixels, self.config.highlight);
    }

    fn upload(ctx: &egui::Context, name: &str, canvas: &Canvas, max_dimension: u32) -> TextureHandle {
        let scaled = scaled_for_upload(&canvas.pixels, max_dimension);
        let pixels = scaled.as_ref().unwrap_or(&canvas.pixels);
        let (w, h) = pixels.dimensions();
        let image = ColorImage::from_rgba_unmultiplied([w as usize, h as usize], pixels.as_raw());
        ctx.load_texture(name, image, TextureOptions::LINEAR)
    }
}

impl View for OverlayView {
    fn name(&self) -> &'static str {
        "overlay"
    }

    fn mount(&mut self, cx: &mut MountContext<'_>) {
        self.viewport = cx.viewport;
        self.max_texture_dimension = cx.max_texture_dimension;
        self.seen_image = None;
        self.seen_mask = None;
        cx.listen(&mut self.subs, EventKind::Resize);
    }

    fn unmount(&mut self, listeners: &mut Listeners) {
        self.subs.release(listeners);
        self.image_texture = None;
        self.mask_texture = None;
    }

    fn handle(&mut self, event: &InputEvent, _state: &mut AppState) {
        if let InputEvent::Resized { width, height } = *event {
            self.viewport = Viewport::new(width, height);
            self.refit();
        }
    }

    fn update(&mut self, state: &mut AppState) {
        self.sync_image(state);
        self.sync_mask(state);
    }

    fn ui(&mut self, ctx: &egui::Context, state: &mut AppState) {
        let base = match (&self.image_canvas, &self.mask_canvas) {
            (Some(c), _) | (None, Some(c)) => c.dimensions(),
            (None, None) => return,
        };

        if self.image_texture.is_none() {
            if let Some(canvas) = &self.image_canvas {
                self.image_texture = Some(Self::upload(ctx, "overlay-image", canvas, self.max_texture_dimension));
            }
        }
        if self.mask_texture.is_none() {
            if let Some(canvas) = &self.mask_canvas {
                self.mask_texture = Some(Self::upload(ctx, "overlay-mask", canvas, self.max_texture_dimension));
            }
        }

        let screen = ctx.screen_rect().size();
        let fit = self.fit;
        let opacity = self.config.opacity.clamp(0.0, 1.0);
        let full_uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
        let mut hover = None;

        egui::Window::new("Segmentation")
            .default_size(screen * 0.4)
            .resizable(true)
            .show(ctx, |ui| {
                let size = fit_size(base, fit, ui.available_size());
                let (rect, response) = ui.allocate_exact_size(size, Sense::hover());

                if let Some(tex) = &self.image_texture {
                    ui.painter().image(tex.id(), rect, full_uv, Color32::WHITE);
                }
                if let Some(tex) = &self.mask_texture {
                    ui.painter()
                        .image(tex.id(), rect, full_uv, Color32::WHITE.gamma_multiply(opacity));
                }

                if let Some(pos) = response.hover_pos() {
                    let negative = ui.input(|i| i.pointer.secondary_down());
                    hover = to_image_coords(pos, rect, base).map(|p| (p, negative));
                }
            });

        if let Some(((x, y), negative)) = hover {
            if self.last_hover != Some((x, y)) {
                self.last_hover = Some((x, y));
                let label = if negative {
                    ClickLabel::Negative
                } else {
                    ClickLabel::Positive
                };
                state.set_clicks(Some(vec![Click { x, y, label }]));
            }
        }
    }
}
