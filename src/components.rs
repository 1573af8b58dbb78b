use glam::Vec2;

use crate::constants::TILE_SIZE;

/// Cell kinds of the static layout. Pellet cells are walkable; whether the
/// pellet is still there is tracked by the game, not the maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Empty,
    Pellet,
    Power,
    Gate,
}

impl Tile {
    pub fn is_walkable(self) -> bool {
        matches!(self, Tile::Empty | Tile::Pellet | Tile::Power)
    }

    pub fn pellet(self) -> Option<PelletKind> {
        match self {
            Tile::Pellet => Some(PelletKind::Normal),
            Tile::Power => Some(PelletKind::Power),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PelletKind {
    Normal,
    Power,
}

/// Integer grid coordinate. May point outside the maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, dir: Dir) -> Pos {
        let (dx, dy) = dir.delta();
        Pos {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Pixel position of the centre of this tile.
    pub fn center(self) -> Vec2 {
        Vec2::new(
            self.x as f32 * TILE_SIZE + TILE_SIZE * 0.5,
            self.y as f32 * TILE_SIZE + TILE_SIZE * 0.5,
        )
    }

    /// Tile containing the given pixel position.
    pub fn containing(pixel: Vec2) -> Pos {
        Pos {
            x: (pixel.x / TILE_SIZE).floor() as i32,
            y: (pixel.y / TILE_SIZE).floor() as i32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    /// Canonical enumeration order. Ghost exit ties resolve to the first
    /// candidate in this order.
    pub const ALL: [Dir; 4] = [Dir::Left, Dir::Right, Dir::Up, Dir::Down];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    pub fn vector(self) -> Vec2 {
        let (dx, dy) = self.delta();
        Vec2::new(dx as f32, dy as f32)
    }

    pub fn reverse(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Dir::Left | Dir::Right)
    }
}
