//! Change notifications delivered synchronously to subscribers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crossbeam_channel::{Receiver, unbounded};
use lattice_coords::{BlockPosition, ChunkPosition, InChunkPosition};
use lattice_voxel::BlockStateId;

use crate::world::World;

/// Something observable changed in the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorldEvent {
    BlockSet {
        position: BlockPosition,
        previous: BlockStateId,
        state: BlockStateId,
    },
    /// Sent once per chunk after the per-block events of a batched delta.
    MultiBlockSet {
        chunk: ChunkPosition,
        changes: Vec<(InChunkPosition, BlockStateId)>,
    },
    /// Light of one section changed. `same_chunk` is false when the change
    /// originated in a neighbouring chunk.
    ChunkLightUpdate {
        chunk: ChunkPosition,
        section_height: i32,
        same_chunk: bool,
    },
    ChunkDataChange {
        chunk: ChunkPosition,
    },
    ChunkUnload {
        chunk: ChunkPosition,
    },
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Receives every event on the thread that caused it.
pub type Listener = Arc<dyn Fn(&World, &WorldEvent) + Send + Sync>;

/// Synchronous fan-out of [`WorldEvent`]s.
///
/// Listeners run on the mutating thread after the change is complete. The
/// listener list is copied before dispatch, so a listener may subscribe or
/// unsubscribe without deadlocking.
pub struct EventBus {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(ListenerId, Listener)>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&World, &WorldEvent) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(listener, _)| *listener != id);
        listeners.len() != before
    }

    /// Forwards every event into a channel, for consumers on other threads.
    ///
    /// The listener stays subscribed after the receiver is dropped; sends
    /// then fail silently.
    pub fn channel(&self) -> (ListenerId, Receiver<WorldEvent>) {
        let (sender, receiver) = unbounded();
        let id = self.subscribe(move |_, event| {
            let _ = sender.send(event.clone());
        });
        (id, receiver)
    }

    pub fn len(&self) -> usize {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn fire(&self, world: &World, event: WorldEvent) {
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(world, &event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
