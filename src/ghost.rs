use glam::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::{Dir, Pos};
use crate::constants::{
    DECISION_COOLDOWN_TICKS, GHOST_CRUISE_SPEED, GHOST_FRIGHTENED_SPEED, GHOST_PEN_SPEED,
    GHOST_PURSUIT_SPEED, GHOST_SCATTER_SPEED, TILE_SIZE,
};
use crate::level::{GhostSpawn, PenBounds};
use crate::maze::{Maze, SafeTiles};
use crate::movement::Mover;
use crate::personality::{hunt_target, Personality, TargetInputs};
use crate::scheduler::Phase;

/// Navigation state. Scatter and pursuit share `Pursuing`; the orthogonal
/// `hunting` flag on [`Ghost`] tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GhostState {
    /// Bobbing in the pen, waiting for release.
    Dormant,
    /// Scripted walk out through the gate.
    ExitingHome,
    Pursuing,
    Frightened,
    /// Captured; heading back to the pen through walls.
    Returning,
    /// Frozen by the game on death or level end.
    Stopped,
}

/// Transitions the game has to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostSignal {
    LeftHome,
    ReachedHome,
}

/// Shared per-tick view of the world for ghost updates.
#[derive(Debug, Clone, Copy)]
pub struct GhostContext {
    pub phase: Phase,
    /// Own tile and corner are filled in by each ghost.
    pub targets: TargetInputs,
}

#[derive(Debug, Clone)]
pub struct Ghost {
    pub personality: Option<Personality>,
    pub mover: Mover,
    state: GhostState,
    hunting: bool,
    cruise: bool,
    destination: Vec2,
    home: Pos,
    corner: Pos,
    pen: PenBounds,
    exit: Pos,
    safe: SafeTiles,
    cooldown: u32,
}

impl Ghost {
    pub fn new(spawn: &GhostSpawn, pen: PenBounds, exit: Pos) -> Self {
        Self {
            personality: spawn.personality,
            mover: Mover::at_tile(spawn.home, Dir::Up),
            state: GhostState::Dormant,
            hunting: false,
            cruise: false,
            destination: spawn.corner.center(),
            home: spawn.home,
            corner: spawn.corner,
            pen,
            exit,
            safe: SafeTiles::PenEntry,
            cooldown: 0,
        }
    }

    pub fn state(&self) -> GhostState {
        self.state
    }

    pub fn tile(&self) -> Pos {
        self.mover.tile()
    }

    pub fn position(&self) -> Vec2 {
        self.mover.position
    }

    pub fn direction(&self) -> Dir {
        self.mover.dir
    }

    pub fn destination(&self) -> Vec2 {
        self.destination
    }

    pub fn safe_tiles(&self) -> SafeTiles {
        self.safe
    }

    pub fn corner(&self) -> Pos {
        self.corner
    }

    /// Whether the destination is recomputed every tick.
    pub fn is_hunting(&self) -> bool {
        self.hunting || self.cruise
    }

    pub fn speed(&self) -> f32 {
        match self.state {
            GhostState::Dormant | GhostState::ExitingHome => GHOST_PEN_SPEED,
            GhostState::Pursuing if self.cruise => GHOST_CRUISE_SPEED,
            GhostState::Pursuing if self.hunting => GHOST_PURSUIT_SPEED,
            GhostState::Pursuing => GHOST_SCATTER_SPEED,
            GhostState::Frightened => GHOST_FRIGHTENED_SPEED,
            GhostState::Returning => GHOST_CRUISE_SPEED,
            GhostState::Stopped => 0.0,
        }
    }

    /// Starts the walk out of the pen. Only dormant ghosts can leave.
    pub fn release(&mut self) -> bool {
        if self.state != GhostState::Dormant {
            return false;
        }
        self.state = GhostState::ExitingHome;
        true
    }

    /// Global phase broadcast. Only ghosts loose in the maze listen; each
    /// switch into Pursuit reverses them on the spot.
    pub fn apply_phase(&mut self, phase: Phase) {
        if self.state != GhostState::Pursuing {
            return;
        }
        self.set_hunting(phase == Phase::Pursuit);
        if phase == Phase::Pursuit {
            self.mover.dir = self.mover.dir.reverse();
        }
    }

    pub fn frighten(&mut self) {
        if self.state == GhostState::Pursuing {
            self.state = GhostState::Frightened;
        }
    }

    /// Frightened window closed: back to pursuing, and `phase` is
    /// re-broadcast to every ghost loose in the maze.
    pub fn end_frightened(&mut self, phase: Phase) {
        if self.state == GhostState::Frightened {
            self.state = GhostState::Pursuing;
        }
        self.apply_phase(phase);
    }

    /// Player caught this ghost while frightened.
    pub fn capture(&mut self) -> bool {
        if self.state != GhostState::Frightened {
            return false;
        }
        self.state = GhostState::Returning;
        self.safe = SafeTiles::PenEntry;
        true
    }

    pub fn stop(&mut self) {
        self.state = GhostState::Stopped;
    }

    /// Forced hunting at cruise speed. Ignored outside `Pursuing`.
    pub fn set_cruise(&mut self, on: bool) {
        self.cruise = on;
    }

    fn set_hunting(&mut self, hunting: bool) {
        self.hunting = hunting;
        if !hunting {
            self.destination = self.corner.center();
        }
    }

    pub fn update(
        &mut self,
        maze: &Maze,
        ctx: &GhostContext,
        rng: &mut impl Rng,
    ) -> Option<GhostSignal> {
        self.cooldown = self.cooldown.saturating_sub(1);
        match self.state {
            GhostState::Stopped => None,
            GhostState::Dormant => {
                self.bob();
                None
            }
            GhostState::ExitingHome => self.exit_home(ctx.phase),
            GhostState::Pursuing => {
                if self.is_hunting() {
                    let inputs = TargetInputs {
                        own_tile: self.tile(),
                        corner: self.corner,
                        ..ctx.targets
                    };
                    self.destination = hunt_target(self.personality, &inputs);
                }
                self.navigate(maze, rng);
                None
            }
            GhostState::Frightened => {
                self.navigate(maze, rng);
                None
            }
            GhostState::Returning => self.return_home(),
        }
    }

    fn bob(&mut self) {
        let home = self.home.center();
        let top = home.y - TILE_SIZE * 0.5;
        let bottom = home.y + TILE_SIZE * 0.5;
        self.mover.position.x = home.x;
        if self.mover.dir != Dir::Down {
            self.mover.dir = Dir::Up;
        }
        self.mover.advance(GHOST_PEN_SPEED);
        if self.mover.position.y <= top {
            self.mover.position.y = top;
            self.mover.dir = Dir::Down;
        } else if self.mover.position.y >= bottom {
            self.mover.position.y = bottom;
            self.mover.dir = Dir::Up;
        }
    }

    /// Lines up with the exit column, then climbs to the exit tile.
    fn exit_home(&mut self, phase: Phase) -> Option<GhostSignal> {
        let target = self.exit.center();
        let position = &mut self.mover.position;
        let dx = target.x - position.x;
        if dx != 0.0 {
            self.mover.dir = if dx > 0.0 { Dir::Right } else { Dir::Left };
            position.x += dx.clamp(-GHOST_PEN_SPEED, GHOST_PEN_SPEED);
        } else {
            self.mover.dir = Dir::Up;
            position.y = (position.y - GHOST_PEN_SPEED).max(target.y);
        }

        if *position != target {
            return None;
        }
        self.safe = SafeTiles::Maze;
        self.state = GhostState::Pursuing;
        self.mover.dir = Dir::Left;
        self.cooldown = 0;
        self.set_hunting(phase == Phase::Pursuit);
        Some(GhostSignal::LeftHome)
    }

    /// Vertical gap first while outside the pen's rows, horizontal after.
    fn return_home(&mut self) -> Option<GhostSignal> {
        let target = self.home.center();
        let position = self.mover.position;
        if !self.pen.row_band_contains(position.y) {
            let dy = target.y - position.y;
            self.mover.dir = if dy > 0.0 { Dir::Down } else { Dir::Up };
            self.mover.position.y += dy.clamp(-GHOST_CRUISE_SPEED, GHOST_CRUISE_SPEED);
        } else {
            let dx = target.x - position.x;
            self.mover.dir = if dx > 0.0 { Dir::Right } else { Dir::Left };
            self.mover.position.x += dx.clamp(-GHOST_CRUISE_SPEED, GHOST_CRUISE_SPEED);
        }

        if !self.pen.contains_pixel(self.mover.position) {
            return None;
        }
        self.state = GhostState::Dormant;
        self.mover = Mover::at_tile(self.home, Dir::Up);
        self.hunting = false;
        Some(GhostSignal::ReachedHome)
    }

    fn navigate(&mut self, maze: &Maze, rng: &mut impl Rng) {
        let speed = self.speed();
        if self.mover.is_aligned() {
            let tile = self.mover.tile();
            let ahead_safe = maze.is_safe(maze.neighbor(tile, self.mover.dir), self.safe);
            if self.cooldown == 0 || !ahead_safe {
                if let Some(dir) = self.choose_exit(maze, tile, rng) {
                    if dir != self.mover.dir {
                        self.mover.snap_to_center();
                        self.mover.dir = dir;
                    }
                    self.cooldown = DECISION_COOLDOWN_TICKS;
                }
            }
            if !maze.is_safe(maze.neighbor(tile, self.mover.dir), self.safe) {
                self.mover.snap_to_center();
                return;
            }
        }
        self.mover.advance(speed);
        self.mover.apply_wraparound(maze);
    }

    /// Picks the exit to take from `tile`. Reverse only at dead ends.
    pub(crate) fn choose_exit(&self, maze: &Maze, tile: Pos, rng: &mut impl Rng) -> Option<Dir> {
        let current = self.mover.dir;
        let reverse = current.reverse();
        let candidates: Vec<Dir> = Dir::ALL
            .into_iter()
            .filter(|dir| *dir != reverse && maze.is_safe(maze.neighbor(tile, *dir), self.safe))
            .collect();

        if candidates.is_empty() {
            return maze
                .is_safe(maze.neighbor(tile, reverse), self.safe)
                .then_some(reverse);
        }
        if self.state == GhostState::Frightened {
            return candidates.choose(rng).copied();
        }

        let mut best = candidates[0];
        let mut best_distance = f32::INFINITY;
        for dir in candidates {
            let distance = maze.neighbor(tile, dir).center().distance(self.destination);
            if distance < best_distance {
                best = dir;
                best_distance = distance;
            }
        }

        let current_safe = maze.is_safe(maze.neighbor(tile, current), self.safe);
        if best == Dir::Up && maze.is_no_upward_entry(tile) && current_safe {
            return Some(current);
        }
        Some(best)
    }
}
