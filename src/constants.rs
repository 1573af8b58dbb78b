//! Tuning values for the simulation. Speeds are pixels per tick, times are
//! simulated milliseconds.

/// Side of one maze tile, in pixels.
pub const TILE_SIZE: f32 = 8.0;

pub const PLAYER_SPEED: f32 = 1.0;
pub const GHOST_PURSUIT_SPEED: f32 = 1.0;
/// Patrolling is slower than hunting.
pub const GHOST_SCATTER_SPEED: f32 = 0.875;
pub const GHOST_FRIGHTENED_SPEED: f32 = 0.5;
/// Shared by returning ghosts and the Chaser once it goes on cruise.
pub const GHOST_CRUISE_SPEED: f32 = 1.125;
pub const GHOST_PEN_SPEED: f32 = 0.5;

/// Cell-centre tolerance in pixels: half the fastest step, so no agent can
/// step over a centre without being seen there at least once.
pub const ALIGN_TOLERANCE: f32 = GHOST_CRUISE_SPEED * 0.5;

/// Ticks a ghost waits after a turn decision before it may decide again.
pub const DECISION_COOLDOWN_TICKS: u32 = 3;

pub const FRIGHTENED_MS: u64 = 6_000;
pub const RESPAWN_DELAY_MS: u64 = 1_000;
pub const LEVEL_COMPLETE_DELAY_MS: u64 = 2_000;
pub const GHOST_REEXIT_MAX_MS: u64 = 3_000;
pub const DEATH_ANIMATION_TICKS: u32 = 90;

pub const PELLET_SCORE: u32 = 10;
pub const POWER_SCORE: u32 = 50;
pub const GHOST_SCORE: u32 = 200;
pub const LEVEL_BONUS: u32 = 1_000;

pub const STARTING_LIVES: u32 = 3;

/// Below this many remaining pellets the Chaser stops patrolling.
pub const CRUISE_THRESHOLD: usize = 20;

/// Half-extent of the agent hitboxes used for ghost collisions.
pub const HIT_HALF_EXTENT: f32 = TILE_SIZE * 0.375;

/// Ambusher aims this many tiles ahead of the player.
pub const AMBUSH_LEAD_TILES: f32 = 4.0;
/// Shy ghost hunts only while farther than this many tiles from the player.
pub const SHY_RADIUS_TILES: f32 = 8.0;
