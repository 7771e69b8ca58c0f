//! What the block editor needs from the host world.

use glam::{IVec2, Vec2};
use rustc_hash::FxHashMap;
use serde::Serialize;
use web_time::Duration;

/// Query and mutation surface of an editable block world.
///
/// Positions are raw screen coordinates; projecting them into the world
/// (ray casts, grid snapping) is the implementor's job.
pub trait BlockWorld {
    /// Block kind placed by taps on empty space.
    type Block: Clone;

    /// The block under `position`, or `None` for empty space.
    fn block_at(&self, position: Vec2) -> Option<Self::Block>;
    /// Place `block` at `position`.
    fn place_block(&mut self, position: Vec2, block: Self::Block);
    /// Remove whatever block is at `position`.
    fn remove_block(&mut self, position: Vec2);
}

/// Fire-and-forget vibration.
pub trait HapticSink {
    /// Request a pulse of length `pulse`.
    fn vibrate(&mut self, pulse: Duration);
}

impl<F: FnMut(Duration)> HapticSink for F {
    fn vibrate(&mut self, pulse: Duration) {
        self(pulse);
    }
}

/// One mutation applied to a [`GridWorld`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "edit", rename_all = "snake_case")]
pub enum WorldEdit<B> {
    /// A block was placed.
    Place {
        /// Grid cell.
        cell: IVec2,
        /// Block placed.
        block: B,
    },
    /// A block was removed.
    Remove {
        /// Grid cell.
        cell: IVec2,
    },
}

/// Flat screen-space grid world that logs every edit.
///
/// Used by the replay tool and handy as a stand-in world in host tests.
#[derive(Debug, Clone)]
pub struct GridWorld<B> {
    cell_size: f32,
    cells: FxHashMap<IVec2, B>,
    edits: Vec<WorldEdit<B>>,
}

impl<B: Clone> GridWorld<B> {
    /// Empty world with square cells of `cell_size` pixels.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            cells: FxHashMap::default(),
            edits: Vec::new(),
        }
    }

    /// Grid cell containing `position`.
    #[must_use]
    pub fn cell_of(&self, position: Vec2) -> IVec2 {
        (position / self.cell_size).floor().as_ivec2()
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every edit so far, oldest first.
    #[must_use]
    pub fn edits(&self) -> &[WorldEdit<B>] {
        &self.edits
    }

    /// Drain the edit log.
    pub fn take_edits(&mut self) -> Vec<WorldEdit<B>> {
        std::mem::take(&mut self.edits)
    }
}

impl<B: Clone> BlockWorld for GridWorld<B> {
    type Block = B;

    fn block_at(&self, position: Vec2) -> Option<B> {
        self.cells.get(&self.cell_of(position)).cloned()
    }

    fn place_block(&mut self, position: Vec2, block: B) {
        let cell = self.cell_of(position);
        let _ = self.cells.insert(cell, block.clone());
        self.edits.push(WorldEdit::Place { cell, block });
    }

    fn remove_block(&mut self, position: Vec2) {
        let cell = self.cell_of(position);
        if self.cells.remove(&cell).is_some() {
            self.edits.push(WorldEdit::Remove { cell });
        }
    }
}
