//! Grid alignment shared by every agent.

use glam::Vec2;

use crate::components::{Dir, Pos};
use crate::constants::ALIGN_TOLERANCE;
use crate::maze::Maze;

/// Continuous position plus travel direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mover {
    pub position: Vec2,
    pub dir: Dir,
}

impl Mover {
    pub fn at_tile(tile: Pos, dir: Dir) -> Self {
        Self {
            position: tile.center(),
            dir,
        }
    }

    pub fn tile(&self) -> Pos {
        Pos::containing(self.position)
    }

    /// True when both axes are within `tolerance` pixels of the current
    /// tile's centre. Turns and state changes happen only here.
    pub fn at_cell_center(&self, tolerance: f32) -> bool {
        let offset = (self.position - self.tile().center()).abs();
        offset.x <= tolerance && offset.y <= tolerance
    }

    /// [`Mover::at_cell_center`] with the shared agent tolerance.
    pub fn is_aligned(&self) -> bool {
        self.at_cell_center(ALIGN_TOLERANCE)
    }

    pub fn snap_to_center(&mut self) {
        self.position = self.tile().center();
    }

    pub fn advance(&mut self, speed: f32) {
        self.position += self.dir.vector() * speed;
    }

    /// Teleports across the left/right edge, keeping `y` and direction.
    pub fn apply_wraparound(&mut self, maze: &Maze) {
        let width = maze.pixel_width();
        if width <= 0.0 {
            return;
        }
        if self.position.x < 0.0 {
            self.position.x += width;
        } else if self.position.x >= width {
            self.position.x -= width;
        }
    }
}
