//! The orchestrator: owns every agent, the scheduler and the counters, and
//! is the only part of the core with effects visible to collaborators.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::components::{Dir, PelletKind, Pos};
use crate::config::Config;
use crate::constants::{
    CRUISE_THRESHOLD, GHOST_REEXIT_MAX_MS, GHOST_SCORE, HIT_HALF_EXTENT, LEVEL_BONUS,
    LEVEL_COMPLETE_DELAY_MS, PELLET_SCORE, POWER_SCORE, RESPAWN_DELAY_MS,
};
use crate::error::LevelError;
use crate::ghost::{Ghost, GhostContext, GhostSignal, GhostState};
use crate::level::{LevelData, ReleaseRule};
use crate::maze::Maze;
use crate::personality::{Personality, TargetInputs};
use crate::player::{Player, PlayerSignal};
use crate::scheduler::{ModeChange, ModeScheduler, Phase};
use crate::timeline::Timeline;

/// One tick of input from the input collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intent {
    pub direction: Option<Dir>,
    /// While set, ticks do nothing and simulated time stands still.
    pub paused: bool,
}

/// Score and lifecycle notifications.
pub trait GameListener {
    fn on_score_update(&mut self, score: u32, lives: u32, level: u32);

    /// Sent exactly once per game.
    fn on_game_over(&mut self, final_score: u32);

    /// The level was cleared and its closing delay has run out.
    fn on_level_complete(&mut self, _level: u32) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Playing,
    /// Player hit; waiting for the death animation and the respawn delay.
    Dying,
    /// Last pellet eaten; waiting out the closing delay.
    LevelComplete,
    /// Waiting for [`Game::next_level`].
    Cleared,
    GameOver,
}

/// Stable index of a ghost in the game's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GhostId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    ReleaseGhost(GhostId),
    Respawn,
    FinishLevel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub position: Vec2,
    pub tile: Pos,
    pub facing: Dir,
    pub alive: bool,
    pub dying: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostView {
    pub id: GhostId,
    pub personality: Option<Personality>,
    pub position: Vec2,
    pub tile: Pos,
    pub direction: Dir,
    pub state: GhostState,
    pub hunting: bool,
}

pub struct Game {
    level_data: LevelData,
    maze: Maze,
    tick_ms: u64,
    rng: StdRng,
    player: Player,
    ghosts: Vec<Ghost>,
    /// Per ghost: has its release rule fired this level.
    released: Vec<bool>,
    scheduler: ModeScheduler,
    timeline: Timeline<Action>,
    pellets: Vec<Option<PelletKind>>,
    total_pellets: usize,
    remaining: usize,
    eaten: usize,
    score: u32,
    lives: u32,
    level: u32,
    clock_ms: u64,
    status: Status,
}

impl Game {
    /// Validates the level and starts level 1. A level that fails validation
    /// never produces a game.
    pub fn new(level_data: LevelData, config: &Config) -> Result<Game, LevelError> {
        level_data.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let maze = Maze::new(&level_data);
        let player = Player::new(level_data.player_start);

        let mut game = Game {
            maze,
            tick_ms: config.tick_ms.max(1),
            rng,
            player,
            ghosts: Vec::new(),
            released: Vec::new(),
            scheduler: ModeScheduler::default(),
            timeline: Timeline::default(),
            pellets: Vec::new(),
            total_pellets: 0,
            remaining: 0,
            eaten: 0,
            score: 0,
            lives: config.lives,
            level: 1,
            clock_ms: 0,
            status: Status::Playing,
            level_data,
        };
        game.load_level();
        Ok(game)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn phase(&self) -> Phase {
        self.scheduler.phase()
    }

    pub fn is_frightened(&self) -> bool {
        self.scheduler.is_frightened()
    }

    pub fn total_pellets(&self) -> usize {
        self.total_pellets
    }

    pub fn remaining_pellets(&self) -> usize {
        self.remaining
    }

    pub fn pellets_eaten(&self) -> usize {
        self.eaten
    }

    pub fn pellet_at(&self, pos: Pos) -> Option<PelletKind> {
        self.pellet_index(pos).and_then(|idx| self.pellets[idx])
    }

    pub fn player_view(&self) -> PlayerView {
        PlayerView {
            position: self.player.position(),
            tile: self.player.tile(),
            facing: self.player.facing(),
            alive: self.player.is_alive(),
            dying: self.player.is_dying(),
        }
    }

    pub fn ghost_views(&self) -> Vec<GhostView> {
        self.ghosts
            .iter()
            .enumerate()
            .map(|(idx, ghost)| GhostView {
                id: GhostId(idx),
                personality: ghost.personality,
                position: ghost.position(),
                tile: ghost.tile(),
                direction: ghost.direction(),
                state: ghost.state(),
                hunting: ghost.is_hunting(),
            })
            .collect()
    }

    /// Starts the next level on the same layout once the current one is
    /// cleared. Ignored in any other status.
    pub fn next_level(&mut self, listener: &mut impl GameListener) {
        if self.status != Status::Cleared {
            return;
        }
        self.level += 1;
        self.load_level();
        info!(level = self.level, "next level");
        listener.on_score_update(self.score, self.lives, self.level);
    }

    /// Advances the simulation by one tick.
    pub fn tick(&mut self, intent: Intent, listener: &mut impl GameListener) {
        if intent.paused || matches!(self.status, Status::Cleared | Status::GameOver) {
            return;
        }
        self.clock_ms += self.tick_ms;
        for action in self.timeline.drain_due(self.clock_ms) {
            self.run_action(action, listener);
        }

        match self.status {
            Status::Playing => {
                if let Some(change) = self.scheduler.tick(self.tick_ms) {
                    self.broadcast(change);
                }
                self.player.request(intent.direction);
                self.player.update(&self.maze);
                self.update_ghosts();
                self.consume_pellet(listener);
                if self.status == Status::Playing {
                    self.resolve_ghost_collisions(listener);
                }
                if self.status == Status::Playing {
                    self.update_release_gates();
                }
            }
            Status::Dying => {
                if self.player.update(&self.maze) == Some(PlayerSignal::Dead) {
                    self.on_player_dead(listener);
                }
            }
            Status::LevelComplete | Status::Cleared | Status::GameOver => {}
        }
    }

    /// Resets everything level-scoped: pellets, agents, scheduler and every
    /// pending delayed action.
    fn load_level(&mut self) {
        self.timeline.clear();
        self.scheduler.reset();
        self.pellets = self
            .level_data
            .grid
            .iter()
            .flatten()
            .map(|tile| tile.pellet())
            .collect();
        self.total_pellets = self.level_data.count_pellets();
        self.remaining = self.total_pellets;
        self.eaten = 0;
        self.player = Player::new(self.level_data.player_start);
        self.ghosts = self.spawn_ghosts();
        self.released = vec![false; self.ghosts.len()];
        self.status = Status::Playing;
        for idx in 0..self.ghosts.len() {
            if self.level_data.ghosts[idx].release == ReleaseRule::Immediate {
                self.release(GhostId(idx));
            }
        }
        info!(
            level = self.level,
            pellets = self.total_pellets,
            ghosts = self.ghosts.len(),
            "level loaded"
        );
    }

    fn spawn_ghosts(&self) -> Vec<Ghost> {
        let level = &self.level_data;
        level
            .ghosts
            .iter()
            .map(|spawn| Ghost::new(spawn, level.pen_bounds, level.pen_exit))
            .collect()
    }

    fn pellet_index(&self, pos: Pos) -> Option<usize> {
        self.maze
            .in_bounds(pos)
            .then(|| pos.y as usize * self.maze.width() + pos.x as usize)
    }

    fn release(&mut self, id: GhostId) {
        if let Some(ghost) = self.ghosts.get_mut(id.0) {
            if ghost.release() {
                self.released[id.0] = true;
                debug!(ghost = id.0, personality = ?ghost.personality, "ghost released");
            }
        }
    }

    fn schedule_reexit(&mut self, id: GhostId) {
        let delay = self.rng.gen_range(0..=GHOST_REEXIT_MAX_MS);
        self.timeline
            .schedule(self.clock_ms + delay, Action::ReleaseGhost(id));
    }

    fn run_action(&mut self, action: Action, listener: &mut impl GameListener) {
        match action {
            Action::ReleaseGhost(id) if self.status == Status::Playing => self.release(id),
            Action::Respawn if self.status == Status::Dying => self.respawn(),
            Action::FinishLevel if self.status == Status::LevelComplete => {
                self.status = Status::Cleared;
                info!(level = self.level, "level finished");
                listener.on_level_complete(self.level);
            }
            _ => debug!(?action, status = ?self.status, "stale action dropped"),
        }
    }

    fn broadcast(&mut self, change: ModeChange) {
        match change {
            ModeChange::Phase(phase) => {
                info!(?phase, "phase change");
                for ghost in &mut self.ghosts {
                    ghost.apply_phase(phase);
                }
            }
            ModeChange::FrightenedOver(phase) => {
                info!(?phase, "frightened over");
                for ghost in &mut self.ghosts {
                    ghost.end_frightened(phase);
                }
            }
        }
    }

    fn update_ghosts(&mut self) {
        let chaser_tile = self
            .ghosts
            .iter()
            .find(|ghost| ghost.personality == Some(Personality::Chaser))
            .map(Ghost::tile);
        let ctx = GhostContext {
            phase: self.scheduler.phase(),
            targets: TargetInputs {
                player_tile: self.player.tile(),
                player_facing: self.player.facing(),
                chaser_tile,
                own_tile: Pos::default(),
                corner: Pos::default(),
                maze_width: self.maze.width(),
                maze_height: self.maze.height(),
            },
        };
        let cruise = self.remaining < CRUISE_THRESHOLD;

        for idx in 0..self.ghosts.len() {
            let ghost = &mut self.ghosts[idx];
            if ghost.personality == Some(Personality::Chaser) {
                ghost.set_cruise(cruise);
            }
            match ghost.update(&self.maze, &ctx, &mut self.rng) {
                Some(GhostSignal::ReachedHome) => {
                    debug!(ghost = idx, "ghost back in pen");
                    self.schedule_reexit(GhostId(idx));
                }
                Some(GhostSignal::LeftHome) => debug!(ghost = idx, "ghost left pen"),
                None => {}
            }
        }
    }

    fn consume_pellet(&mut self, listener: &mut impl GameListener) {
        let Some(idx) = self.pellet_index(self.player.tile()) else {
            return;
        };
        let Some(kind) = self.pellets[idx].take() else {
            return;
        };
        self.remaining = self.remaining.saturating_sub(1);
        self.eaten += 1;
        match kind {
            PelletKind::Normal => self.score += PELLET_SCORE,
            PelletKind::Power => {
                self.score += POWER_SCORE;
                self.frighten_ghosts();
            }
        }
        listener.on_score_update(self.score, self.lives, self.level);

        if self.remaining == 0 {
            self.complete_level(listener);
        }
    }

    fn frighten_ghosts(&mut self) {
        info!(remaining = self.remaining, "power pellet eaten");
        self.scheduler.frighten();
        for ghost in &mut self.ghosts {
            ghost.frighten();
        }
    }

    fn resolve_ghost_collisions(&mut self, listener: &mut impl GameListener) {
        let player = self.player.position();
        for idx in 0..self.ghosts.len() {
            if !boxes_overlap(player, self.ghosts[idx].position()) {
                continue;
            }
            match self.ghosts[idx].state() {
                GhostState::Frightened => {
                    self.ghosts[idx].capture();
                    self.score += GHOST_SCORE;
                    info!(ghost = idx, score = self.score, "ghost captured");
                    listener.on_score_update(self.score, self.lives, self.level);
                }
                GhostState::Returning | GhostState::Dormant | GhostState::Stopped => {}
                GhostState::Pursuing | GhostState::ExitingHome => {
                    self.kill_player(idx, listener);
                    return;
                }
            }
        }
    }

    fn kill_player(&mut self, culprit: usize, listener: &mut impl GameListener) {
        self.lives = self.lives.saturating_sub(1);
        info!(ghost = culprit, lives = self.lives, "player caught");
        listener.on_score_update(self.score, self.lives, self.level);
        self.player.kill();
        for ghost in &mut self.ghosts {
            ghost.stop();
        }
        self.scheduler.cancel_frightened();
        self.timeline.clear();
        self.status = Status::Dying;
    }

    fn on_player_dead(&mut self, listener: &mut impl GameListener) {
        if self.lives == 0 {
            self.status = Status::GameOver;
            self.timeline.clear();
            info!(score = self.score, "game over");
            listener.on_game_over(self.score);
            return;
        }
        self.timeline
            .schedule(self.clock_ms + RESPAWN_DELAY_MS, Action::Respawn);
    }

    /// Back to the level-start arrangement, keeping pellets and counters.
    /// Ghosts that had already been let out come back after a short random
    /// delay instead of waiting on their release rule again.
    fn respawn(&mut self) {
        self.player = Player::new(self.level_data.player_start);
        self.ghosts = self.spawn_ghosts();
        self.status = Status::Playing;
        for idx in 0..self.ghosts.len() {
            if self.level_data.ghosts[idx].release == ReleaseRule::Immediate {
                self.release(GhostId(idx));
            } else if self.released[idx] {
                self.schedule_reexit(GhostId(idx));
            }
        }
        info!(lives = self.lives, "player respawned");
    }

    fn complete_level(&mut self, listener: &mut impl GameListener) {
        self.score += LEVEL_BONUS;
        info!(level = self.level, score = self.score, "level complete");
        listener.on_score_update(self.score, self.lives, self.level);
        self.player.freeze();
        for ghost in &mut self.ghosts {
            ghost.stop();
        }
        self.scheduler.cancel_frightened();
        self.timeline.clear();
        self.timeline.schedule(
            self.clock_ms + LEVEL_COMPLETE_DELAY_MS,
            Action::FinishLevel,
        );
        self.status = Status::LevelComplete;
    }

    fn update_release_gates(&mut self) {
        for idx in 0..self.ghosts.len() {
            if self.released[idx] {
                continue;
            }
            let rule = self.level_data.ghosts[idx].release;
            if rule.is_met(self.eaten, self.remaining, self.total_pellets) {
                self.release(GhostId(idx));
            }
        }
    }
}

fn boxes_overlap(a: Vec2, b: Vec2) -> bool {
    let gap = (a - b).abs();
    gap.x < HIT_HALF_EXTENT * 2.0 && gap.y < HIT_HALF_EXTENT * 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{GHOST_CRUISE_SPEED, GHOST_FRIGHTENED_SPEED, GHOST_SCATTER_SPEED};
    use crate::level::create_level;
    use crate::movement::Mover;
    use crate::scheduler::{Span, CLASSIC_TABLE};

    #[derive(Default)]
    struct Recorder {
        updates: Vec<(u32, u32, u32)>,
        game_overs: Vec<u32>,
    }

    impl GameListener for Recorder {
        fn on_score_update(&mut self, score: u32, lives: u32, level: u32) {
            self.updates.push((score, lives, level));
        }

        fn on_game_over(&mut self, final_score: u32) {
            self.game_overs.push(final_score);
        }
    }

    fn config() -> Config {
        Config {
            seed: Some(11),
            ..Config::default()
        }
    }

    fn classic() -> Game {
        Game::new(create_level().unwrap(), &config()).unwrap()
    }

    fn outside_pen(game: &Game) -> usize {
        game.ghosts
            .iter()
            .filter(|ghost| ghost.state() != GhostState::Dormant)
            .count()
    }

    /// Walks ghost `idx` out of the pen, then parks it on `tile`.
    fn loose_ghost(game: &mut Game, idx: usize, tile: Pos) {
        let ctx = GhostContext {
            phase: Phase::Scatter,
            targets: TargetInputs {
                player_tile: game.player.tile(),
                player_facing: Dir::Left,
                chaser_tile: None,
                own_tile: Pos::default(),
                corner: Pos::default(),
                maze_width: 28,
                maze_height: 31,
            },
        };
        game.ghosts[idx].release();
        for _ in 0..500 {
            let signal = game.ghosts[idx].update(&game.maze, &ctx, &mut game.rng);
            if signal == Some(GhostSignal::LeftHome) {
                break;
            }
        }
        assert_eq!(game.ghosts[idx].state(), GhostState::Pursuing);
        game.ghosts[idx].mover = Mover::at_tile(tile, Dir::Left);
    }

    #[test]
    fn one_ghost_leaves_at_start() {
        let game = classic();
        assert_eq!(outside_pen(&game), 1);
        assert_eq!(game.ghosts[0].state(), GhostState::ExitingHome);
        assert_eq!(game.status(), Status::Playing);
        assert_eq!(game.lives(), 3);
        assert_eq!(game.remaining_pellets(), game.total_pellets());
    }

    #[test]
    fn release_gates_fire_once_each() {
        let mut game = classic();
        game.eaten = 30;
        game.update_release_gates();
        assert_eq!(outside_pen(&game), 1);

        game.eaten = 31;
        game.remaining = game.total_pellets - 31;
        game.update_release_gates();
        assert_eq!(outside_pen(&game), 2);
        assert_eq!(game.ghosts[1].state(), GhostState::ExitingHome);

        game.update_release_gates();
        assert_eq!(outside_pen(&game), 2);

        game.remaining = game.total_pellets / 3 - 1;
        game.update_release_gates();
        assert_eq!(outside_pen(&game), 3);
        assert_eq!(game.ghosts[2].state(), GhostState::ExitingHome);
        assert_eq!(game.ghosts[3].state(), GhostState::Dormant);
    }

    #[test]
    fn frightened_ghost_is_captured() {
        let mut game = classic();
        let mut recorder = Recorder::default();
        let tile = game.player.tile();
        loose_ghost(&mut game, 1, tile);
        game.frighten_ghosts();
        assert_eq!(game.ghosts[1].state(), GhostState::Frightened);

        game.resolve_ghost_collisions(&mut recorder);
        assert_eq!(game.score(), GHOST_SCORE);
        assert_eq!(game.lives(), 3);
        assert_eq!(game.ghosts[1].state(), GhostState::Returning);
        assert_eq!(recorder.updates, vec![(GHOST_SCORE, 3, 1)]);

        // returning ghosts pass through the player
        game.resolve_ghost_collisions(&mut recorder);
        assert_eq!(game.score(), GHOST_SCORE);
        assert_eq!(game.lives(), 3);
        assert_eq!(game.ghosts[1].state(), GhostState::Returning);
        assert_eq!(game.status(), Status::Playing);
    }

    #[test]
    fn hunting_ghost_kills_the_player() {
        let mut game = classic();
        let mut recorder = Recorder::default();
        let tile = game.player.tile();
        loose_ghost(&mut game, 1, tile);

        game.resolve_ghost_collisions(&mut recorder);
        assert_eq!(game.lives(), 2);
        assert_eq!(game.score(), 0);
        assert_eq!(game.status(), Status::Dying);
        assert!(game.player.is_dying());
        assert!(game
            .ghosts
            .iter()
            .all(|ghost| ghost.state() == GhostState::Stopped));
        assert_eq!(recorder.updates, vec![(0, 2, 1)]);
    }

    #[test]
    fn respawn_restores_level_start_and_requeues_released_ghosts() {
        let mut game = classic();
        let mut recorder = Recorder::default();
        game.eaten = 31;
        game.update_release_gates();
        let tile = game.player.tile();
        loose_ghost(&mut game, 1, tile);
        game.resolve_ghost_collisions(&mut recorder);
        assert_eq!(game.status(), Status::Dying);

        let mut ticks = 0;
        while game.status() == Status::Dying {
            game.tick(Intent::default(), &mut recorder);
            ticks += 1;
            assert!(ticks < 1_000, "never respawned");
        }
        assert_eq!(game.status(), Status::Playing);
        assert_eq!(game.lives(), 2);
        assert_eq!(game.player.tile(), game.level_data.player_start);
        assert!(game.player.is_alive());
        // the early ghost is out again, the released one waits on a timer
        assert_ne!(game.ghosts[0].state(), GhostState::Dormant);
        assert_eq!(game.ghosts[1].state(), GhostState::Dormant);
        assert_eq!(game.timeline.len(), 1);
        assert_eq!(game.ghosts[2].state(), GhostState::Dormant);
        assert!(recorder.game_overs.is_empty());
    }

    #[test]
    fn last_life_ends_the_game_once() {
        let config = Config {
            lives: 1,
            ..config()
        };
        let mut game = Game::new(create_level().unwrap(), &config).unwrap();
        let mut recorder = Recorder::default();
        let tile = game.player.tile();
        loose_ghost(&mut game, 0, tile);
        game.resolve_ghost_collisions(&mut recorder);
        assert_eq!(game.lives(), 0);

        for _ in 0..500 {
            game.tick(Intent::default(), &mut recorder);
        }
        assert_eq!(game.status(), Status::GameOver);
        assert_eq!(recorder.game_overs, vec![0]);
        let clock = game.clock_ms();
        game.tick(Intent::default(), &mut recorder);
        assert_eq!(game.clock_ms(), clock);
    }

    #[test]
    fn power_pellet_frightens_and_pauses_the_timetable() {
        let mut game = classic();
        let mut recorder = Recorder::default();
        loose_ghost(&mut game, 0, Pos::new(6, 5));
        game.player.mover = Mover::at_tile(Pos::new(1, 3), Dir::Up);
        let before = game.scheduler.remaining();
        game.consume_pellet(&mut recorder);

        assert_eq!(game.score(), POWER_SCORE);
        assert!(game.is_frightened());
        assert_eq!(game.ghosts[0].state(), GhostState::Frightened);
        assert_eq!(game.pellet_at(Pos::new(1, 3)), None);
        assert_eq!(game.remaining_pellets(), game.total_pellets() - 1);
        assert_eq!(game.scheduler.remaining(), before);
    }

    #[test]
    fn paused_ticks_freeze_the_clock() {
        let mut game = classic();
        let mut recorder = Recorder::default();
        game.tick(Intent::default(), &mut recorder);
        let clock = game.clock_ms();
        let player = game.player_view();
        let ghosts = game.ghost_views();
        for _ in 0..100 {
            game.tick(
                Intent {
                    direction: Some(Dir::Right),
                    paused: true,
                },
                &mut recorder,
            );
        }
        assert_eq!(game.clock_ms(), clock);
        assert_eq!(game.player_view(), player);
        assert_eq!(game.ghost_views(), ghosts);
    }

    #[test]
    fn reaching_home_schedules_a_reexit() {
        let mut game = classic();
        let mut recorder = Recorder::default();
        loose_ghost(&mut game, 0, Pos::new(13, 11));
        game.frighten_ghosts();
        game.ghosts[0].capture();
        for _ in 0..400 {
            game.tick(Intent::default(), &mut recorder);
            if game.ghosts[0].state() == GhostState::Dormant {
                break;
            }
        }
        assert_eq!(game.ghosts[0].state(), GhostState::Dormant);
        let fire_at = game.timeline.next_fire_time().unwrap();
        assert!(fire_at <= game.clock_ms() + GHOST_REEXIT_MAX_MS);

        loop {
            game.tick(Intent::default(), &mut recorder);
            if game.clock_ms() >= fire_at {
                break;
            }
        }
        assert_eq!(game.ghosts[0].state(), GhostState::ExitingHome);
    }

    #[test]
    fn next_level_tears_down_pending_state() {
        let mut game = classic();
        let mut recorder = Recorder::default();
        game.frighten_ghosts();
        game.schedule_reexit(GhostId(2));
        game.next_level(&mut recorder);
        assert_eq!(game.level(), 1, "ignored until the level is cleared");

        game.status = Status::Cleared;
        game.next_level(&mut recorder);
        assert_eq!(game.level(), 2);
        assert!(game.timeline.is_empty());
        assert!(!game.is_frightened());
        assert_eq!(game.remaining_pellets(), game.total_pellets());
        assert_eq!(outside_pen(&game), 1);
        assert_eq!(recorder.updates.last(), Some(&(0, 3, 2)));
    }

    #[test]
    fn few_pellets_left_puts_only_the_chaser_on_cruise() {
        let mut game = classic();
        let mut recorder = Recorder::default();
        loose_ghost(&mut game, 0, Pos::new(6, 5));
        loose_ghost(&mut game, 1, Pos::new(21, 5));
        game.tick(Intent::default(), &mut recorder);
        assert_eq!(game.phase(), Phase::Scatter);
        assert!(!game.ghosts[0].is_hunting());
        assert_eq!(game.ghosts[0].speed(), GHOST_SCATTER_SPEED);

        game.remaining = CRUISE_THRESHOLD - 1;
        game.tick(Intent::default(), &mut recorder);
        assert_eq!(game.phase(), Phase::Scatter);
        assert_eq!(game.ghosts[0].state(), GhostState::Pursuing);
        assert!(game.ghosts[0].is_hunting());
        assert_eq!(game.ghosts[0].speed(), GHOST_CRUISE_SPEED);
        assert!(!game.ghosts[1].is_hunting());
        assert_eq!(game.ghosts[1].speed(), GHOST_SCATTER_SPEED);
        assert!(game.ghosts[2..]
            .iter()
            .all(|ghost| ghost.speed() < GHOST_CRUISE_SPEED));

        // fright still slows the Chaser down
        game.frighten_ghosts();
        game.tick(Intent::default(), &mut recorder);
        assert_eq!(game.ghosts[0].state(), GhostState::Frightened);
        assert_eq!(game.ghosts[0].speed(), GHOST_FRIGHTENED_SPEED);
    }

    #[test]
    fn end_of_fright_resumes_the_paused_phase() {
        let mut game = classic();
        let mut recorder = Recorder::default();
        // two-tick frightened window
        game.scheduler = ModeScheduler::new(CLASSIC_TABLE.to_vec(), 32);
        loose_ghost(&mut game, 1, Pos::new(6, 5));

        let change = game.scheduler.tick(7_000);
        assert_eq!(change, Some(ModeChange::Phase(Phase::Pursuit)));
        game.broadcast(ModeChange::Phase(Phase::Pursuit));
        assert!(game.ghosts[1].is_hunting());
        assert_eq!(game.scheduler.tick(5_000), None);
        let saved = game.scheduler.remaining();
        assert_eq!(saved, Span::Millis(15_000));

        game.player.mover = Mover::at_tile(Pos::new(1, 3), Dir::Up);
        game.consume_pellet(&mut recorder);
        assert!(game.is_frightened());
        assert_eq!(game.ghosts[1].state(), GhostState::Frightened);

        game.tick(Intent::default(), &mut recorder);
        assert!(game.is_frightened());
        assert_eq!(game.ghosts[1].state(), GhostState::Frightened);
        let heading = game.ghosts[1].direction();

        game.tick(Intent::default(), &mut recorder);
        assert!(!game.is_frightened());
        assert_eq!(game.phase(), Phase::Pursuit);
        assert_eq!(game.scheduler.remaining(), saved);
        assert_eq!(game.ghosts[1].state(), GhostState::Pursuing);
        assert!(game.ghosts[1].is_hunting());
        assert_eq!(game.ghosts[1].direction(), heading.reverse());
    }

    #[test]
    fn overlap_is_coarse_box_test() {
        let a = Pos::new(5, 5).center();
        assert!(boxes_overlap(a, a + Vec2::new(5.5, -5.5)));
        assert!(!boxes_overlap(a, a + Vec2::new(6.0, 0.0)));
        assert!(!boxes_overlap(a, Pos::new(6, 5).center()));
    }
}
