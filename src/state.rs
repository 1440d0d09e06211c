// state.rs: shared view state: clicks, source image, mask bitmap

use image::RgbaImage;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickLabel {
    Negative = 0,
    Positive = 1,
}

/// A point in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Click {
    pub x: f32,
    pub y: f32,
    pub label: ClickLabel,
}

/// One value plus a revision that moves on every write, so readers can tell
/// whether it changed since they last looked.
#[derive(Debug)]
pub struct Slot<T> {
    value: Option<T>,
    revision: u64,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            value: None,
            revision: 0,
        }
    }
}

impl<T> Slot<T> {
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn set(&mut self, value: Option<T>) {
        self.value = value;
        self.revision += 1;
    }
}

/// The one state holder views read from. Setters are the only way in.
#[derive(Debug, Default)]
pub struct AppState {
    clicks: Slot<Vec<Click>>,
    image: Slot<Arc<RgbaImage>>,
    mask: Slot<Arc<RgbaImage>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clicks(&self) -> &Slot<Vec<Click>> {
        &self.clicks
    }

    pub fn set_clicks(&mut self, clicks: Option<Vec<Click>>) {
        self.clicks.set(clicks);
    }

    pub fn image(&self) -> &Slot<Arc<RgbaImage>> {
        &self.image
    }

    pub fn set_image(&mut self, image: Option<Arc<RgbaImage>>) {
        self.image.set(image);
    }

    pub fn mask(&self) -> &Slot<Arc<RgbaImage>> {
        &self.mask
    }

    pub fn set_mask(&mut self, mask: Option<Arc<RgbaImage>>) {
        self.mask.set(mask);
    }
}
