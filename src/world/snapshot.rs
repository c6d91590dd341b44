/// Double-buffered world: simulation edits `next` while frames render
/// from an immutable `current` snapshot. `publish` is the only point where
/// the renderer-visible grid changes, and it is called between frames.
use super::World;
use std::sync::Arc;

pub struct WorldBuffers {
    current: Arc<World>,
    next: World,
    generation: u64,
}

impl WorldBuffers {
    pub fn new(world: World) -> Self {
        Self {
            current: Arc::new(world.clone()),
            next: world,
            generation: 0,
        }
    }

    /// Snapshot for the next frame. A frame keeps rendering the snapshot it
    /// was handed even if `publish` runs meanwhile.
    pub fn current(&self) -> Arc<World> {
        Arc::clone(&self.current)
    }

    /// Grid being edited. Changes stay invisible until [`WorldBuffers::publish`].
    pub fn next_mut(&mut self) -> &mut World {
        &mut self.next
    }

    /// Make pending edits visible. Returns false when nothing changed.
    pub fn publish(&mut self) -> bool {
        if *self.current == self.next {
            return false;
        }
        self.current = Arc::new(self.next.clone());
        self.generation += 1;
        log::debug!("published world generation {}", self.generation);
        true
    }

    /// Number of snapshots published so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
