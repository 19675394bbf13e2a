//! Pooled presentation handles mirroring the logical board.
//!
//! The engine never allocates or frees presentation resources; it only
//! signals acquisition and release through events. This module plays that
//! collaborator: a free-list arena per entity category plus the
//! coordinate-to-handle registry a renderer would consult. Released slots
//! are reused before the arena grows, like any object pool worth the name.

use std::collections::HashMap;

use gemfall_core::{BoardView, Cell, CellCoord, Event};

/// Category a pooled handle is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Category {
    Tile,
    Obstacle,
}

/// Identifier of a pooled presentation entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Handle {
    category: Category,
    slot: usize,
}

/// Free-list arena plus the registry of live, board-placed handles.
#[derive(Debug, Default)]
pub(crate) struct PresentationPool {
    live: HashMap<CellCoord, Handle>,
    free_tiles: Vec<usize>,
    free_obstacles: Vec<usize>,
    allocated_tiles: usize,
    allocated_obstacles: usize,
    reused: usize,
}

impl PresentationPool {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the registry from a board snapshot, recycling every handle
    /// currently held. Used right after level creation, where the snapshot
    /// rather than the event stream is authoritative.
    pub(crate) fn adopt_board(&mut self, view: &BoardView<'_>) {
        let held: Vec<Handle> = self.live.drain().map(|(_, handle)| handle).collect();
        for handle in held {
            self.release(handle);
        }

        for row in 0..view.total_rows() {
            for column in 0..view.columns() {
                let coord = CellCoord::new(column, row);
                match view.cell(coord) {
                    Some(Cell::Tile { .. }) => self.place(coord, Category::Tile),
                    Some(Cell::Obstacle { .. }) => self.place(coord, Category::Obstacle),
                    _ => {}
                }
            }
        }
    }

    /// Applies one batch of world events, in order, to the registry.
    pub(crate) fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::CellCleared { at, .. } => {
                    if let Some(handle) = self.live.remove(at) {
                        self.release(handle);
                    }
                }
                Event::TileSpawned { at, .. } => self.place(*at, Category::Tile),
                Event::MoveIssued { from, to } => {
                    if let Some(handle) = self.live.remove(from) {
                        if let Some(displaced) = self.live.insert(*to, handle) {
                            self.release(displaced);
                        }
                    }
                }
                Event::SwapAccepted { first, second, .. }
                | Event::SwapReverted { first, second, .. } => {
                    let a = self.live.remove(first);
                    let b = self.live.remove(second);
                    if let Some(handle) = a {
                        let _ = self.live.insert(*second, handle);
                    }
                    if let Some(handle) = b {
                        let _ = self.live.insert(*first, handle);
                    }
                }
                _ => {}
            }
        }
    }

    /// Number of handles currently placed on the board.
    pub(crate) fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of allocated handles sitting in the free lists.
    pub(crate) fn idle_count(&self) -> usize {
        self.free_tiles.len() + self.free_obstacles.len()
    }

    /// Number of acquisitions served from the free lists instead of growth.
    pub(crate) fn reuse_count(&self) -> usize {
        self.reused
    }

    fn place(&mut self, coord: CellCoord, category: Category) {
        let handle = self.acquire(category);
        if let Some(displaced) = self.live.insert(coord, handle) {
            self.release(displaced);
        }
    }

    fn acquire(&mut self, category: Category) -> Handle {
        let (free, allocated) = match category {
            Category::Tile => (&mut self.free_tiles, &mut self.allocated_tiles),
            Category::Obstacle => (&mut self.free_obstacles, &mut self.allocated_obstacles),
        };

        let slot = match free.pop() {
            Some(slot) => {
                self.reused += 1;
                slot
            }
            None => {
                let slot = *allocated;
                *allocated += 1;
                slot
            }
        };

        Handle { category, slot }
    }

    fn release(&mut self, handle: Handle) {
        match handle.category {
            Category::Tile => self.free_tiles.push(handle.slot),
            Category::Obstacle => self.free_obstacles.push(handle.slot),
        }
    }
}
