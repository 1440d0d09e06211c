// display.rs: display-only panorama for a given image and container

use crate::app::{MountContext, View, Viewport};
use crate::camera::MAX_LATITUDE;
use crate::config::DisplayConfig;
use crate::input::InputEvent;
use crate::listeners::{EventKind, Listeners, Subscriptions};
use crate::loader::{self, PendingLoad};
use crate::scene::Scene;
use crate::state::AppState;
use crate::texture::PanoramaTexture;
use std::path::{Path, PathBuf};

/// Same scene and frame loop as the interactive view, without drag or paint.
/// While unmounted it is detached and hands no scene to the renderer.
pub struct DisplayView {
    config: DisplayConfig,
    image: PathBuf,
    container: Viewport,
    max_texture_dimension: u32,
    scene: Option<Scene>,
    pending: Option<PendingLoad>,
    subs: Subscriptions,
}

impl DisplayView {
    pub fn new(config: DisplayConfig, image: PathBuf) -> Self {
        Self {
            config,
            image,
            container: Viewport::new(1, 1),
            max_texture_dimension: 0,
            scene: None,
            pending: None,
            subs: Subscriptions::default(),
        }
    }
}

impl View for DisplayView {
    fn name(&self) -> &'static str {
        "display"
    }

    fn mount(&mut self, cx: &mut MountContext<'_>) {
        self.container = cx.viewport;
        self.max_texture_dimension = cx.max_texture_dimension;
        self.scene = Some(Scene::new(
            &self.config.scene,
            self.config.sphere_scale,
            MAX_LATITUDE,
            self.container,
        ));
        self.pending = Some(loader::spawn(self.image.clone()));
        cx.listen(&mut self.subs, EventKind::Resize);
    }

    fn unmount(&mut self, listeners: &mut Listeners) {
        self.subs.release(listeners);
        self.pending = None;
        self.scene = None;
    }

    fn handle(&mut self, event: &InputEvent, _state: &mut AppState) {
        if let InputEvent::Resized { width, height } = *event {
            self.container = Viewport::new(width, height);
            if let Some(scene) = self.scene.as_mut() {
                scene.resize(self.container);
            }
        }
    }

    fn update(&mut self, _state: &mut AppState) {
        if let Some(result) = self.pending.as_ref().and_then(|p| p.poll()) {
            self.pending = None;
            match result {
                Ok(img) => {
                    if let Some(scene) = self.scene.as_mut() {
                        scene.set_texture(PanoramaTexture::new(img, self.max_texture_dimension));
                    }
                }
                Err(e) => log::error!("panorama {:?} unavailable: {}", self.image, e),
            }
        }

        if let Some(scene) = self.scene.as_mut() {
            scene.update_camera();
        }
    }

    fn open_panorama(&mut self, path: &Path) -> bool {
        self.image = path.to_path_buf();
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn mounted(listeners: &mut Listeners) -> DisplayView {
        let mut v = DisplayView::new(DisplayConfig::default(), PathBuf::from("/no/such/room.jpg"));
        let mut cx = MountContext {
            listeners,
            owner: 3,
            viewport: Viewport::new(1280, 720),
            max_texture_dimension: 8192,
        };
        v.mount(&mut cx);
        v
    }

    #[test]
    fn listens_to_resize_only() {
        let mut listeners = Listeners::new();
        let _v = mounted(&mut listeners);
        assert_eq!(listeners.len(), 1);
        assert_eq!(listeners.targets(EventKind::Resize), vec![3]);
    }

    #[test]
    fn unmount_detaches_and_unregisters() {
        let mut listeners = Listeners::new();
        let mut v = mounted(&mut listeners);
        assert!(v.scene.is_some());

        v.unmount(&mut listeners);
        assert!(!v.scene.is_some());
        assert!(v.scene().is_none());
        assert!(listeners.is_empty());
    }

    #[test]
    fn pointer_input_does_not_move_the_camera() {
        let mut listeners = Listeners::new();
        let mut v = mounted(&mut listeners);
        let mut state = AppState::new();

        v.handle(&InputEvent::PointerDown { position: Vec2::ZERO }, &mut state);
        v.handle(&InputEvent::PointerMove { position: Vec2::new(500.0, 500.0) }, &mut state);
        let o = v.scene().unwrap().orientation;
        assert_eq!((o.longitude(), o.latitude()), (0.0, 0.0));
    }

    #[test]
    fn resize_reaches_the_camera() {
        let mut listeners = Listeners::new();
        let mut v = mounted(&mut listeners);
        let mut state = AppState::new();
        v.handle(&InputEvent::Resized { width: 300, height: 100 }, &mut state);
        assert_eq!(v.scene().unwrap().camera.aspect, 3.0);
    }
}
