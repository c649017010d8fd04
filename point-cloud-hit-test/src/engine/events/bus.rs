use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// An event that can be routed by kind.
pub trait BusEvent {
    type Kind: Copy + Eq + Hash + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

/// Identifies one registration, for targeted removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener<E> = Box<dyn FnMut(&E) + Send + Sync>;

/// Synchronous publish/subscribe registry.
///
/// Listeners for a kind run in registration order. A panicking listener is not
/// contained and unwinds through `fire`.
pub struct EventBus<E: BusEvent> {
    listeners: HashMap<E::Kind, Vec<(ListenerId, Listener<E>)>>,
    next_id: u64,
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            listeners: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<E: BusEvent> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<_, _> = self
            .listeners
            .iter()
            .map(|(kind, list)| (*kind, list.len()))
            .collect();
        f.debug_struct("EventBus").field("listeners", &counts).finish()
    }
}

impl<E: BusEvent> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, kind: E::Kind, listener: impl FnMut(&E) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Remove one listener, or every listener of `kind` when `id` is `None`.
    /// Returns how many were removed.
    pub fn off(&mut self, kind: E::Kind, id: Option<ListenerId>) -> usize {
        match id {
            None => self.listeners.remove(&kind).map_or(0, |list| list.len()),
            Some(id) => {
                let Some(list) = self.listeners.get_mut(&kind) else {
                    return 0;
                };
                let before = list.len();
                list.retain(|(existing, _)| *existing != id);
                let removed = before - list.len();
                if list.is_empty() {
                    self.listeners.remove(&kind);
                }
                removed
            }
        }
    }

    /// Remove every listener of every kind.
    pub fn off_all(&mut self) {
        self.listeners.clear();
    }

    /// Deliver `event` to the listeners of its kind. Returns how many ran.
    pub fn fire(&mut self, event: &E) -> usize {
        let Some(list) = self.listeners.get_mut(&event.kind()) else {
            return 0;
        };
        for (_, listener) in list.iter_mut() {
            listener(event);
        }
        list.len()
    }

    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
