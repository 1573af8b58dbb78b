use std::collections::HashSet;

use crate::components::{Dir, Pos, Tile};
use crate::constants::TILE_SIZE;
use crate::level::LevelData;

/// Which tiles a ghost may path through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafeTiles {
    /// Walkable tiles plus the pen gate. Ghosts in or bound for the pen.
    PenEntry,
    /// Walkable tiles only. Ghosts loose in the maze.
    Maze,
}

/// Immutable tile grid for one level. Anything off the grid is a wall.
#[derive(Debug, Clone)]
pub struct Maze {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    no_upward_entry: HashSet<Pos>,
    tunnel_rows: HashSet<i32>,
}

impl Maze {
    pub fn new(level: &LevelData) -> Self {
        let width = level.width();
        let height = level.height();
        let tiles: Vec<Tile> = level.grid.iter().flatten().copied().collect();
        let tunnel_rows = level
            .grid
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                matches!(
                    (row.first(), row.last()),
                    (Some(a), Some(b)) if a.is_walkable() && b.is_walkable()
                )
            })
            .map(|(y, _)| y as i32)
            .collect();
        Self {
            width,
            height,
            tiles,
            no_upward_entry: level.no_upward_entry.iter().copied().collect(),
            tunnel_rows,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * TILE_SIZE
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Tile at `pos`, treating everything off the grid as wall.
    pub fn tile(&self, pos: Pos) -> Tile {
        if !self.in_bounds(pos) {
            return Tile::Wall;
        }
        self.tiles[pos.y as usize * self.width + pos.x as usize]
    }

    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.tile(pos).is_walkable()
    }

    pub fn is_safe(&self, pos: Pos, safe: SafeTiles) -> bool {
        match (self.tile(pos), safe) {
            (Tile::Gate, SafeTiles::PenEntry) => true,
            (tile, _) => tile.is_walkable(),
        }
    }

    pub fn is_no_upward_entry(&self, pos: Pos) -> bool {
        self.no_upward_entry.contains(&pos)
    }

    pub fn is_tunnel_row(&self, y: i32) -> bool {
        self.tunnel_rows.contains(&y)
    }

    /// Adjacent tile in `dir`. Wraps horizontally on tunnel rows; elsewhere
    /// the result may lie off the grid.
    pub fn neighbor(&self, pos: Pos, dir: Dir) -> Pos {
        let mut next = pos.step(dir);
        if dir.is_horizontal() && self.is_tunnel_row(pos.y) && self.width > 0 {
            next.x = next.x.rem_euclid(self.width as i32);
        }
        next
    }

    /// Neighbours in canonical order: left, right, up, down.
    pub fn neighbors_of(&self, pos: Pos) -> [(Dir, Pos); 4] {
        Dir::ALL.map(|dir| (dir, self.neighbor(pos, dir)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::create_level;

    fn classic() -> Maze {
        Maze::new(&create_level().unwrap())
    }

    #[test]
    fn off_grid_is_not_walkable() {
        let maze = classic();
        assert!(maze.is_walkable(Pos::new(1, 1)));
        assert!(!maze.is_walkable(Pos::new(0, 0)));
        assert!(!maze.is_walkable(Pos::new(-1, 5)));
        assert!(!maze.is_walkable(Pos::new(28, 5)));
        assert!(!maze.is_walkable(Pos::new(3, 999)));
        assert_eq!(maze.tile(Pos::new(-4, -4)), Tile::Wall);
    }

    #[test]
    fn gate_is_safe_only_for_pen_entry() {
        let maze = classic();
        let gate = Pos::new(13, 12);
        assert!(!maze.is_walkable(gate));
        assert!(maze.is_safe(gate, SafeTiles::PenEntry));
        assert!(!maze.is_safe(gate, SafeTiles::Maze));
    }

    #[test]
    fn tunnel_row_wraps_neighbors() {
        let maze = classic();
        assert!(maze.is_tunnel_row(14));
        assert!(!maze.is_tunnel_row(5));
        assert_eq!(maze.neighbor(Pos::new(0, 14), Dir::Left), Pos::new(27, 14));
        assert_eq!(maze.neighbor(Pos::new(27, 14), Dir::Right), Pos::new(0, 14));
        assert_eq!(maze.neighbor(Pos::new(0, 5), Dir::Left), Pos::new(-1, 5));
    }

    #[test]
    fn neighbors_follow_canonical_order() {
        let maze = classic();
        let dirs: Vec<Dir> = maze
            .neighbors_of(Pos::new(5, 5))
            .iter()
            .map(|(dir, _)| *dir)
            .collect();
        assert_eq!(dirs, vec![Dir::Left, Dir::Right, Dir::Up, Dir::Down]);
    }

    #[test]
    fn no_upward_entry_tiles() {
        let maze = classic();
        assert!(maze.is_no_upward_entry(Pos::new(12, 11)));
        assert!(!maze.is_no_upward_entry(Pos::new(13, 11)));
    }
}
