// app.rs: the stage: owns shared state, mounts views, routes events to them

use crate::input::InputEvent;
use crate::listeners::{EventKind, Listeners, Subscriptions, ViewId};
use crate::loader::{self, PendingLoad};
use crate::scene::Scene;
use crate::state::AppState;
use glam::Vec2;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Drawable area in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel position to normalized device coordinates, +Y up.
    pub fn ndc(&self, position: Vec2) -> Vec2 {
        let w = self.width.max(1) as f32;
        let h = self.height.max(1) as f32;
        Vec2::new(position.x / w * 2.0 - 1.0, -(position.y / h) * 2.0 + 1.0)
    }
}

pub struct MountContext<'a> {
    pub listeners: &'a mut Listeners,
    pub owner: ViewId,
    pub viewport: Viewport,
    pub max_texture_dimension: u32,
}

impl MountContext<'_> {
    pub fn listen(&mut self, subs: &mut Subscriptions, kind: EventKind) {
        subs.listen(self.listeners, kind, self.owner);
    }
}

/// A mountable piece of UI. Everything a view registers in `mount` it must
/// release in `unmount`.
pub trait View {
    fn name(&self) -> &'static str;

    fn mount(&mut self, cx: &mut MountContext<'_>);

    fn unmount(&mut self, listeners: &mut Listeners);

    fn handle(&mut self, event: &InputEvent, state: &mut AppState);

    /// Once per frame, before drawing.
    fn update(&mut self, _state: &mut AppState) {}

    fn remounts_on_image_change(&self) -> bool {
        false
    }

    /// Returns true if the view now wants a remount to pick up the new source.
    fn open_panorama(&mut self, _path: &Path) -> bool {
        false
    }

    fn scene(&self) -> Option<&Scene> {
        None
    }

    fn scene_mut(&mut self) -> Option<&mut Scene> {
        None
    }

    fn is_loading(&self) -> bool {
        false
    }

    fn paint_count(&self) -> u64 {
        0
    }

    fn ui(&mut self, _ctx: &egui::Context, _state: &mut AppState) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    Image,
    Mask,
}

pub struct Stage {
    state: AppState,
    views: Vec<Box<dyn View>>,
    listeners: Listeners,
    viewport: Viewport,
    max_texture_dimension: u32,
    mounted: bool,
    image_revision: u64,
    feeds: Vec<(Feed, PendingLoad)>,
}

impl Stage {
    pub fn new(views: Vec<Box<dyn View>>, viewport: Viewport, max_texture_dimension: u32) -> Self {
        Self {
            state: AppState::new(),
            views,
            listeners: Listeners::new(),
            viewport,
            max_texture_dimension,
            mounted: false,
            image_revision: 0,
            feeds: Vec::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        for id in 0..self.views.len() {
            self.mount_view(id);
        }
        self.image_revision = self.state.image().revision();
        self.mounted = true;
    }

    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        for view in self.views.iter_mut() {
            view.unmount(&mut self.listeners);
            log::info!("unmounted {}", view.name());
        }
        self.feeds.clear();
        self.mounted = false;
        if !self.listeners.is_empty() {
            log::warn!("{} listeners survived unmount", self.listeners.len());
        }
    }

    fn mount_view(&mut self, id: ViewId) {
        let mut cx = MountContext {
            listeners: &mut self.listeners,
            owner: id,
            viewport: self.viewport,
            max_texture_dimension: self.max_texture_dimension,
        };
        self.views[id].mount(&mut cx);
        log::info!("mounted {}", self.views[id].name());
    }

    fn remount_view(&mut self, id: ViewId) {
        self.views[id].unmount(&mut self.listeners);
        self.mount_view(id);
    }

    pub fn dispatch(&mut self, event: &InputEvent) {
        if let InputEvent::Resized { width, height } = *event {
            self.viewport = Viewport::new(width, height);
        }
        if !self.mounted {
            return;
        }
        for owner in self.listeners.targets(EventKind::of(event)) {
            if let Some(view) = self.views.get_mut(owner) {
                view.handle(event, &mut self.state);
            }
        }
    }

    /// Start decoding an image or mask; it lands in the shared state when done.
    pub fn request(&mut self, feed: Feed, path: PathBuf) {
        self.feeds.retain(|(f, _)| *f != feed);
        self.feeds.push((feed, loader::spawn(path)));
    }

    pub fn open_panorama(&mut self, path: &Path) {
        for id in 0..self.views.len() {
            if self.views[id].open_panorama(path) && self.mounted {
                self.remount_view(id);
            }
        }
    }

    pub fn update(&mut self) {
        self.poll_feeds();
        if !self.mounted {
            return;
        }

        let revision = self.state.image().revision();
        if revision != self.image_revision {
            self.image_revision = revision;
            for id in 0..self.views.len() {
                if self.views[id].remounts_on_image_change() {
                    self.remount_view(id);
                }
            }
        }

        for view in self.views.iter_mut() {
            view.update(&mut self.state);
        }
    }

    fn poll_feeds(&mut self) {
        let mut i = 0;
        while i < self.feeds.len() {
            let Some(result) = self.feeds[i].1.poll() else {
                i += 1;
                continue;
            };
            let (feed, pending) = self.feeds.remove(i);
            match result {
                Ok(img) => {
                    let img = Some(Arc::new(img));
                    match feed {
                        Feed::Image => self.state.set_image(img),
                        Feed::Mask => self.state.set_mask(img),
                    }
                }
                Err(e) => log::error!("{:?} {:?} not loaded: {}", feed, pending.path(), e),
            }
        }
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.views.iter().find_map(|v| v.scene())
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.views.iter_mut().find_map(|v| v.scene_mut())
    }

    pub fn is_loading(&self) -> bool {
        !self.feeds.is_empty() || self.views.iter().any(|v| v.is_loading())
    }

    pub fn paint_count(&self) -> u64 {
        self.views.iter().map(|v| v.paint_count()).sum()
    }

    pub fn ui(&mut self, ctx: &egui::Context) {
        for view in self.views.iter_mut() {
            view.ui(ctx, &mut self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Registers one listener per kind given and bumps the clicks revision
    /// for every delivery, so deliveries can be counted from the state.
    struct Probe {
        kinds: Vec<EventKind>,
        subs: Subscriptions,
        remount: bool,
    }

    impl Probe {
        fn boxed(kinds: &[EventKind], remount: bool) -> Box<dyn View> {
            Box::new(Self {
                kinds: kinds.to_vec(),
                subs: Subscriptions::default(),
                remount,
            })
        }
    }

    impl View for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn mount(&mut self, cx: &mut MountContext<'_>) {
            for kind in self.kinds.clone() {
                cx.listen(&mut self.subs, kind);
            }
        }

        fn unmount(&mut self, listeners: &mut Listeners) {
            self.subs.release(listeners);
        }

        fn handle(&mut self, _event: &InputEvent, state: &mut AppState) {
            state.set_clicks(None);
        }

        fn remounts_on_image_change(&self) -> bool {
            self.remount
        }
    }

    #[test]
    fn ndc_maps_corners_and_centre() {
        let vp = Viewport::new(800, 600);
        assert_eq!(vp.ndc(Vec2::new(0.0, 0.0)), Vec2::new(-1.0, 1.0));
        assert_eq!(vp.ndc(Vec2::new(800.0, 600.0)), Vec2::new(1.0, -1.0));
        assert_eq!(vp.ndc(Vec2::new(400.0, 300.0)), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn events_reach_only_subscribed_views() {
        let mut stage = Stage::new(
            vec![
                Probe::boxed(&[EventKind::Resize], false),
                Probe::boxed(&[EventKind::PointerDown, EventKind::Resize], false),
            ],
            Viewport::new(100, 100),
            8192,
        );
        stage.mount();
        assert_eq!(stage.listeners().len(), 3);

        stage.dispatch(&InputEvent::PointerDown {
            position: Vec2::new(1.0, 2.0),
        });
        stage.dispatch(&InputEvent::Resized {
            width: 640,
            height: 480,
        });
        assert_eq!(stage.viewport(), Viewport::new(640, 480));
        // one pointer-down delivery, two resize deliveries
        assert_eq!(stage.state().clicks().revision(), 3);
    }

    #[test]
    fn unmount_removes_every_listener() {
        let all = [
            EventKind::Resize,
            EventKind::PointerDown,
            EventKind::PointerMove,
            EventKind::PointerUp,
            EventKind::DoubleClick,
        ];
        let mut stage = Stage::new(vec![Probe::boxed(&all, false)], Viewport::new(10, 10), 8192);
        stage.mount();
        assert_eq!(stage.listeners().len(), 5);

        stage.unmount();
        assert!(stage.listeners().is_empty());

        stage.mount();
        for kind in all {
            assert_eq!(stage.listeners().targets(kind).len(), 1);
        }
    }

    #[test]
    fn image_change_remounts_without_duplicating_listeners() {
        let mut stage = Stage::new(
            vec![Probe::boxed(&[EventKind::PointerDown, EventKind::Resize], true)],
            Viewport::new(10, 10),
            8192,
        );
        stage.mount();

        for n in 0..3u32 {
            stage
                .state_mut()
                .set_image(Some(Arc::new(image::RgbaImage::new(2 + n, 2))));
            stage.update();
        }

        assert_eq!(stage.listeners().targets(EventKind::PointerDown).len(), 1);
        assert_eq!(stage.listeners().targets(EventKind::Resize).len(), 1);

        stage.dispatch(&InputEvent::PointerDown { position: Vec2::ZERO });
        assert_eq!(stage.state().clicks().revision(), 1);
    }

    #[test]
    fn unmounted_stage_ignores_events() {
        let mut stage = Stage::new(
            vec![Probe::boxed(&[EventKind::PointerDown], false)],
            Viewport::new(10, 10),
            8192,
        );
        stage.dispatch(&InputEvent::PointerDown { position: Vec2::ZERO });
        assert!(stage.listeners().is_empty());
        assert!(!stage.is_mounted());
        assert_eq!(stage.state().clicks().revision(), 0);
    }
}
