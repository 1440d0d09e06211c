// panorama.rs: the interactive 360° view: drag to look, double-click to paint

use crate::app::{MountContext, View, Viewport};
use crate::camera::DragTracker;
use crate::config::PanoramaConfig;
use crate::input::InputEvent;
use crate::listeners::{EventKind, Listeners, Subscriptions};
use crate::loader::{self, PendingLoad};
use crate::scene::Scene;
use crate::state::AppState;
use crate::texture::{Brush, PanoramaTexture};
use std::path::{Path, PathBuf};

pub struct PanoramaView {
    config: PanoramaConfig,
    source: PathBuf,
    brush: Brush,
    viewport: Viewport,
    max_texture_dimension: u32,
    scene: Option<Scene>,
    drag: DragTracker,
    pending: Option<PendingLoad>,
    subs: Subscriptions,
}

impl PanoramaView {
    pub fn new(config: PanoramaConfig) -> Self {
        Self {
            source: config.asset.clone(),
            brush: Brush::from(&config.brush),
            drag: DragTracker::new(config.drag_scale),
            config,
            viewport: Viewport::new(1, 1),
            max_texture_dimension: 0,
            scene: None,
            pending: None,
            subs: Subscriptions::default(),
        }
    }

    fn poll_texture(&mut self) {
        let Some(result) = self.pending.as_ref().and_then(|p| p.poll()) else {
            return;
        };
        self.pending = None;

        match result {
            Ok(img) => {
                if let Some(scene) = self.scene.as_mut() {
                    scene.set_texture(PanoramaTexture::new(img, self.max_texture_dimension));
                }
            }
            Err(e) => log::error!("panorama {:?} unavailable: {}", self.source, e),
        }
    }
}

impl View for PanoramaView {
    fn name(&self) -> &'static str {
        "panorama"
    }

    fn mount(&mut self, cx: &mut MountContext<'_>) {
        self.viewport = cx.viewport;
        self.max_texture_dimension = cx.max_texture_dimension;
        self.scene = Some(Scene::new(
            &self.config.scene,
            self.config.sphere_scale,
            self.config.max_latitude,
            self.viewport,
        ));
        self.drag.end();
        self.pending = Some(loader::spawn(self.source.clone()));

        for kind in [
            EventKind::PointerDown,
            EventKind::PointerMove,
            EventKind::PointerUp,
            EventKind::Resize,
            EventKind::DoubleClick,
        ] {
            cx.listen(&mut self.subs, kind);
        }
    }

    fn unmount(&mut self, listeners: &mut Listeners) {
        self.subs.release(listeners);
        // drops the receiver, so an unfinished load can't land in the next scene
        self.pending = None;
        self.scene = None;
        self.drag.end();
    }

    fn handle(&mut self, event: &InputEvent, _state: &mut AppState) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };

        match *event {
            InputEvent::PointerDown { position } => self.drag.begin(position, &scene.orientation),
            InputEvent::PointerMove { position } => {
                self.drag.update(position, &mut scene.orientation);
            }
            InputEvent::PointerUp { .. } => self.drag.end(),
            InputEvent::DoubleClick { position } => {
                if let Some(hit) = scene.paint_at(self.viewport.ndc(position), &self.brush) {
                    log::debug!("painted at {:?}: point {:?}, uv {:?}", position, hit.point, hit.uv);
                }
            }
            InputEvent::Resized { width, height } => {
                self.viewport = Viewport::new(width, height);
                scene.resize(self.viewport);
            }
        }
    }

    fn update(&mut self, _state: &mut AppState) {
        self.poll_texture();
        if let Some(scene) = self.scene.as_mut() {
            scene.update_camera();
        }
    }

    fn remounts_on_image_change(&self) -> bool {
        true
    }

    fn open_panorama(&mut self, path: &Path) -> bool {
        self.source = path.to_path_buf();
        true
    }

    fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Paints applied to the current texture.
    fn paint_count(&self) -> u64 {
        self.scene
            .as_ref()
            .and_then(|s| s.texture())
            .map_or(0, |t| t.generation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use image::{Rgba, RgbaImage};

    fn mount(view: &mut PanoramaView, listeners: &mut Listeners) {
        let mut cx = MountContext {
            listeners,
            owner: 0,
            viewport: Viewport::new(800, 600),
            max_texture_dimension: 8192,
        };
        view.mount(&mut cx);
    }

    fn view() -> PanoramaView {
        let mut config = PanoramaConfig::default();
        config.asset = PathBuf::from("/no/such/panorama.jpg");
        PanoramaView::new(config)
    }

    fn textured(view: &mut PanoramaView) {
        let scene = view.scene.as_mut().unwrap();
        scene.set_texture(PanoramaTexture::new(
            RgbaImage::from_pixel(360, 180, Rgba([0, 0, 0, 255])),
            8192,
        ));
        scene.take_texture_update();
    }

    #[test]
    fn mount_registers_every_handler_once() {
        let mut listeners = Listeners::new();
        let mut v = view();
        mount(&mut v, &mut listeners);
        assert_eq!(listeners.len(), 5);
        assert!(v.scene().is_some());
        assert!(v.is_loading());
    }

    #[test]
    fn remount_does_not_duplicate_handlers() {
        let mut listeners = Listeners::new();
        let mut v = view();
        for _ in 0..3 {
            mount(&mut v, &mut listeners);
            v.unmount(&mut listeners);
        }
        assert!(listeners.is_empty());
        assert!(v.scene().is_none());
        assert!(!v.is_loading());

        mount(&mut v, &mut listeners);
        assert_eq!(listeners.targets(EventKind::DoubleClick).len(), 1);
        assert_eq!(listeners.targets(EventKind::PointerMove).len(), 1);
    }

    #[test]
    fn drag_cycle_through_events() {
        let mut listeners = Listeners::new();
        let mut v = view();
        mount(&mut v, &mut listeners);
        let mut state = AppState::new();

        v.handle(&InputEvent::PointerDown { position: Vec2::new(300.0, 200.0) }, &mut state);
        v.handle(&InputEvent::PointerMove { position: Vec2::new(250.0, 260.0) }, &mut state);
        v.handle(&InputEvent::PointerUp { position: Vec2::new(250.0, 260.0) }, &mut state);
        // moves after release are ignored
        v.handle(&InputEvent::PointerMove { position: Vec2::new(0.0, 0.0) }, &mut state);

        let o = v.scene().unwrap().orientation;
        assert!((o.longitude() - 5.0).abs() < 1e-4);
        assert!((o.latitude() - 6.0).abs() < 1e-4);
    }

    #[test]
    fn double_click_paints_once_textured() {
        let mut listeners = Listeners::new();
        let mut v = view();
        mount(&mut v, &mut listeners);
        let mut state = AppState::new();

        v.handle(&InputEvent::DoubleClick { position: Vec2::new(400.0, 300.0) }, &mut state);
        assert_eq!(v.paint_count(), 0);

        textured(&mut v);
        v.handle(&InputEvent::DoubleClick { position: Vec2::new(400.0, 300.0) }, &mut state);
        assert_eq!(v.paint_count(), 1);
        assert!(v.scene_mut().unwrap().take_texture_update().is_some());
    }

    #[test]
    fn failed_load_leaves_sphere_untextured() {
        let mut listeners = Listeners::new();
        let mut v = view();
        mount(&mut v, &mut listeners);
        let mut state = AppState::new();

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while v.is_loading() {
            assert!(std::time::Instant::now() < deadline);
            v.update(&mut state);
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(!v.scene().unwrap().has_texture());
    }

    #[test]
    fn opening_a_panorama_switches_source() {
        let mut v = view();
        assert!(v.open_panorama(Path::new("other.jpg")));
        assert_eq!(v.source, PathBuf::from("other.jpg"));
    }
}
