//! Ghost destination heuristics. Every function here is pure: the same
//! inputs always give the same destination.

use glam::Vec2;

use crate::components::{Dir, Pos};
use crate::constants::{AMBUSH_LEAD_TILES, SHY_RADIUS_TILES, TILE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Personality {
    /// Heads straight for the player.
    Chaser,
    /// Aims ahead of the player.
    Ambusher,
    /// Reflects the Chaser through the player.
    Mirror,
    /// Hunts from afar, retreats to its corner up close.
    Shy,
}

impl Personality {
    pub const ALL: [Personality; 4] = [
        Personality::Chaser,
        Personality::Ambusher,
        Personality::Mirror,
        Personality::Shy,
    ];

    /// Layout code used by level descriptions.
    pub fn from_code(code: char) -> Option<Personality> {
        match code {
            'B' => Some(Personality::Chaser),
            'P' => Some(Personality::Ambusher),
            'I' => Some(Personality::Mirror),
            'C' => Some(Personality::Shy),
            _ => None,
        }
    }
}

/// Everything a personality may look at when picking a destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInputs {
    pub player_tile: Pos,
    pub player_facing: Dir,
    /// `None` when the level has no Chaser.
    pub chaser_tile: Option<Pos>,
    pub own_tile: Pos,
    pub corner: Pos,
    pub maze_width: usize,
    pub maze_height: usize,
}

impl TargetInputs {
    fn clamp(&self, point: Vec2) -> Vec2 {
        let half = TILE_SIZE * 0.5;
        let max = Vec2::new(
            (self.maze_width.max(1) as f32 - 1.0) * TILE_SIZE + half,
            (self.maze_height.max(1) as f32 - 1.0) * TILE_SIZE + half,
        );
        point.clamp(Vec2::splat(half), max)
    }
}

/// Pixel destination for a hunting ghost. An unknown personality patrols.
pub fn hunt_target(personality: Option<Personality>, inputs: &TargetInputs) -> Vec2 {
    let player = inputs.player_tile.center();
    match personality {
        Some(Personality::Chaser) => player,
        Some(Personality::Ambusher) => {
            let lead = inputs.player_facing.vector() * AMBUSH_LEAD_TILES * TILE_SIZE;
            inputs.clamp(player + lead)
        }
        Some(Personality::Mirror) => match inputs.chaser_tile {
            Some(chaser) => inputs.clamp(player + (player - chaser.center())),
            None => inputs.corner.center(),
        },
        Some(Personality::Shy) => {
            let distance = inputs.own_tile.center().distance(player);
            if distance > SHY_RADIUS_TILES * TILE_SIZE {
                player
            } else {
                inputs.corner.center()
            }
        }
        None => inputs.corner.center(),
    }
}
