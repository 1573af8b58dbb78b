use glam::Vec2;

use crate::components::{Dir, Pos};
use crate::constants::{DEATH_ANIMATION_TICKS, PLAYER_SPEED};
use crate::maze::Maze;
use crate::movement::Mover;

/// Raised by [`Player::update`] once the death animation has run out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerSignal {
    Dead,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub mover: Mover,
    desired: Option<Dir>,
    moving: bool,
    frozen: bool,
    alive: bool,
    death_ticks: u32,
    death_signalled: bool,
}

impl Player {
    pub fn new(spawn: Pos) -> Self {
        Self {
            mover: Mover::at_tile(spawn, Dir::Left),
            desired: None,
            moving: true,
            frozen: false,
            alive: true,
            death_ticks: 0,
            death_signalled: false,
        }
    }

    pub fn tile(&self) -> Pos {
        self.mover.tile()
    }

    pub fn position(&self) -> Vec2 {
        self.mover.position
    }

    pub fn facing(&self) -> Dir {
        self.mover.dir
    }

    pub fn desired(&self) -> Option<Dir> {
        self.desired
    }

    pub fn is_moving(&self) -> bool {
        self.moving && !self.frozen && self.alive
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Alive flag is down but the death animation has not finished.
    pub fn is_dying(&self) -> bool {
        !self.alive && !self.death_signalled
    }

    /// Buffers a turn request. `None` keeps whatever is already buffered.
    pub fn request(&mut self, intent: Option<Dir>) {
        if intent.is_some() {
            self.desired = intent;
        }
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Starts the death sequence. Further calls are ignored.
    pub fn kill(&mut self) {
        if self.alive {
            self.alive = false;
            self.death_ticks = DEATH_ANIMATION_TICKS;
        }
    }

    pub fn update(&mut self, maze: &Maze) -> Option<PlayerSignal> {
        if !self.alive {
            return self.tick_death();
        }
        if self.frozen {
            return None;
        }

        if let Some(want) = self.desired {
            if want == self.mover.dir.reverse() {
                self.mover.dir = want;
                self.moving = true;
                self.desired = None;
            }
        }

        if self.mover.is_aligned() {
            let tile = self.mover.tile();
            if let Some(want) = self.desired {
                if maze.is_walkable(maze.neighbor(tile, want)) {
                    self.mover.snap_to_center();
                    self.mover.dir = want;
                    self.moving = true;
                    self.desired = None;
                }
            }
            if !maze.is_walkable(maze.neighbor(tile, self.mover.dir)) {
                self.mover.snap_to_center();
                self.moving = false;
            }
        }

        if self.moving {
            self.mover.advance(PLAYER_SPEED);
            self.mover.apply_wraparound(maze);
        }
        None
    }

    fn tick_death(&mut self) -> Option<PlayerSignal> {
        if self.death_signalled {
            return None;
        }
        self.death_ticks = self.death_ticks.saturating_sub(1);
        if self.death_ticks == 0 {
            self.death_signalled = true;
            return Some(PlayerSignal::Dead);
        }
        None
    }
}
