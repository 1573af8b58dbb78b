//! Level collaborator: the static description of a level handed to the core
//! at load time, plus the built-in classic board.

use glam::Vec2;

use crate::components::{Pos, Tile};
use crate::constants::TILE_SIZE;
use crate::error::LevelError;
use crate::personality::Personality;

/// Classic board. `#` wall, `.` pellet, `o` power pellet, `=` pen gate,
/// `P` player spawn, space empty.
pub const RAW_BOARD: [&str; 31] = [
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.##### ## #####.######",
    "######.##### ## #####.######",
    "######.##          ##.######",
    "######.## ###==### ##.######",
    "######.## #      # ##.######",
    "      .   #      #   .      ",
    "######.## #      # ##.######",
    "######.## ######## ##.######",
    "######.##          ##.######",
    "######.## ######## ##.######",
    "######.## ######## ##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#.####.#####.##.#####.####.#",
    "#o..##.......P .......##..o#",
    "###.##.##.########.##.##.###",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
];

/// Tile-space bounding box of the ghost pen, walls included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenBounds {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PenBounds {
    pub fn contains(&self, pos: Pos) -> bool {
        pos.x >= self.x0 && pos.x <= self.x1 && pos.y >= self.y0 && pos.y <= self.y1
    }

    pub fn contains_pixel(&self, pixel: Vec2) -> bool {
        self.contains(Pos::containing(pixel))
    }

    /// Whether a pixel row lies within the pen's rows.
    pub fn row_band_contains(&self, y: f32) -> bool {
        y >= self.y0 as f32 * TILE_SIZE && y < (self.y1 + 1) as f32 * TILE_SIZE
    }
}

/// When a dormant ghost is first allowed to leave the pen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseRule {
    Immediate,
    /// Once strictly more than this many pellets have been eaten.
    AfterEaten(usize),
    /// Once remaining pellets drop below `total / denominator`.
    BelowFraction(usize),
}

impl ReleaseRule {
    pub fn is_met(self, eaten: usize, remaining: usize, total: usize) -> bool {
        match self {
            ReleaseRule::Immediate => true,
            ReleaseRule::AfterEaten(count) => eaten > count,
            ReleaseRule::BelowFraction(denominator) => remaining * denominator < total,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostSpawn {
    /// `None` for an unrecognised personality code.
    pub personality: Option<Personality>,
    pub home: Pos,
    pub corner: Pos,
    pub release: ReleaseRule,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelData {
    pub grid: Vec<Vec<Tile>>,
    pub player_start: Pos,
    pub pen_bounds: PenBounds,
    /// Tile directly above the gate; leaving ghosts stop here.
    pub pen_exit: Pos,
    pub no_upward_entry: Vec<Pos>,
    pub ghosts: Vec<GhostSpawn>,
}

pub fn create_level() -> Result<LevelData, LevelError> {
    let (grid, player_start) = LevelData::parse_grid(&RAW_BOARD)?;
    let ghosts = [
        ('B', Pos::new(13, 14), Pos::new(25, -3), ReleaseRule::Immediate),
        ('P', Pos::new(14, 14), Pos::new(2, -3), ReleaseRule::AfterEaten(30)),
        ('I', Pos::new(11, 14), Pos::new(27, 31), ReleaseRule::BelowFraction(3)),
        ('C', Pos::new(16, 14), Pos::new(0, 31), ReleaseRule::AfterEaten(60)),
    ]
    .into_iter()
    .map(|(code, home, corner, release)| GhostSpawn {
        personality: Personality::from_code(code),
        home,
        corner,
        release,
    })
    .collect();

    let level = LevelData {
        grid,
        player_start,
        pen_bounds: PenBounds {
            x0: 10,
            y0: 12,
            x1: 17,
            y1: 16,
        },
        pen_exit: Pos::new(13, 11),
        no_upward_entry: vec![
            Pos::new(12, 11),
            Pos::new(15, 11),
            Pos::new(12, 23),
            Pos::new(15, 23),
        ],
        ghosts,
    };
    level.validate()?;
    Ok(level)
}

impl LevelData {
    /// Parses tile rows into a grid and the player spawn tile.
    pub fn parse_grid(rows: &[&str]) -> Result<(Vec<Vec<Tile>>, Pos), LevelError> {
        let width = rows.first().ok_or(LevelError::Empty)?.chars().count();
        if width == 0 {
            return Err(LevelError::Empty);
        }

        let mut grid = Vec::with_capacity(rows.len());
        let mut spawn = None;
        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(LevelError::Ragged {
                    row: y,
                    found,
                    expected: width,
                });
            }
            let mut line = Vec::with_capacity(width);
            for (x, code) in row.chars().enumerate() {
                let tile = match code {
                    '#' => Tile::Wall,
                    '.' => Tile::Pellet,
                    'o' => Tile::Power,
                    '=' => Tile::Gate,
                    ' ' => Tile::Empty,
                    'P' => {
                        if spawn.is_some() {
                            return Err(LevelError::DuplicateSpawn);
                        }
                        spawn = Some(Pos::new(x as i32, y as i32));
                        Tile::Empty
                    }
                    _ => return Err(LevelError::UnknownTile { code, x, y }),
                };
                line.push(tile);
            }
            grid.push(line);
        }

        let spawn = spawn.ok_or(LevelError::MissingSpawn)?;
        Ok((grid, spawn))
    }

    pub fn width(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.grid.len()
    }

    fn tile(&self, pos: Pos) -> Option<Tile> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        self.grid
            .get(pos.y as usize)
            .and_then(|row| row.get(pos.x as usize))
            .copied()
    }

    pub fn count_pellets(&self) -> usize {
        self.grid
            .iter()
            .flat_map(|row| row.iter())
            .filter(|tile| tile.pellet().is_some())
            .count()
    }

    /// Rejects levels the core could not run safely.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.height() == 0 || self.width() == 0 {
            return Err(LevelError::Empty);
        }
        for (y, row) in self.grid.iter().enumerate() {
            if row.len() != self.width() {
                return Err(LevelError::Ragged {
                    row: y,
                    found: row.len(),
                    expected: self.width(),
                });
            }
        }

        let in_bounds = |what: &'static str, pos: Pos| match self.tile(pos) {
            Some(tile) => Ok(tile),
            None => Err(LevelError::OutOfBounds { what, pos }),
        };

        if !in_bounds("player spawn", self.player_start)?.is_walkable() {
            return Err(LevelError::Blocked {
                what: "player spawn",
                pos: self.player_start,
            });
        }
        if !in_bounds("pen exit", self.pen_exit)?.is_walkable() {
            return Err(LevelError::Blocked {
                what: "pen exit",
                pos: self.pen_exit,
            });
        }
        let pen = self.pen_bounds;
        in_bounds("pen corner", Pos::new(pen.x0, pen.y0))?;
        in_bounds("pen corner", Pos::new(pen.x1, pen.y1))?;
        if pen.contains(self.pen_exit) {
            return Err(LevelError::Misplaced {
                what: "pen exit",
                pos: self.pen_exit,
            });
        }
        for ghost in &self.ghosts {
            if in_bounds("ghost home", ghost.home)? == Tile::Wall {
                return Err(LevelError::Blocked {
                    what: "ghost home",
                    pos: ghost.home,
                });
            }
            // returning ghosts only settle once they are inside the pen box
            if !pen.contains(ghost.home) {
                return Err(LevelError::Misplaced {
                    what: "ghost home",
                    pos: ghost.home,
                });
            }
        }

        if self.count_pellets() == 0 {
            return Err(LevelError::NoPellets);
        }
        Ok(())
    }
}
