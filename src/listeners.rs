// listeners.rs: which mounted view hears which kind of event

use crate::input::InputEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Resize,
    PointerDown,
    PointerMove,
    PointerUp,
    DoubleClick,
}

impl EventKind {
    pub fn of(event: &InputEvent) -> Self {
        match event {
            InputEvent::Resized { .. } => EventKind::Resize,
            InputEvent::PointerDown { .. } => EventKind::PointerDown,
            InputEvent::PointerMove { .. } => EventKind::PointerMove,
            InputEvent::PointerUp { .. } => EventKind::PointerUp,
            InputEvent::DoubleClick { .. } => EventKind::DoubleClick,
        }
    }
}

/// Index of a view on the stage.
pub type ViewId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug)]
struct Entry {
    id: ListenerId,
    kind: EventKind,
    owner: ViewId,
}

/// Registry of handlers. Every registration is one delivery per event, so a
/// view that registered twice hears everything twice.
#[derive(Debug, Default)]
pub struct Listeners {
    next_id: u64,
    entries: Vec<Entry>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: EventKind, owner: ViewId) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, kind, owner });
        log::debug!("listener {:?} added: {:?} -> view {}", id, kind, owner);
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before != self.entries.len()
    }

    /// Owners to deliver `kind` to, in registration order.
    pub fn targets(&self, kind: EventKind) -> Vec<ViewId> {
        self.entries
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.owner)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The registrations one view made while mounted.
#[derive(Debug, Default)]
pub struct Subscriptions {
    ids: Vec<ListenerId>,
}

impl Subscriptions {
    pub fn listen(&mut self, listeners: &mut Listeners, kind: EventKind, owner: ViewId) {
        self.ids.push(listeners.add(kind, owner));
    }

    pub fn release(&mut self, listeners: &mut Listeners) {
        for id in self.ids.drain(..) {
            if !listeners.remove(id) {
                log::warn!("listener {:?} was already gone", id);
            }
        }
    }
}
