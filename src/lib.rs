//! Simulation core for a grid maze-chase game: a player collecting pellets
//! while four ghosts with distinct targeting rules hunt them.
//!
//! [`game::Game`] is the entry point. It is driven one tick at a time with
//! an [`game::Intent`] and reports through a [`game::GameListener`].

pub mod components;
pub mod config;
pub mod constants;
pub mod error;
pub mod game;
pub mod ghost;
pub mod level;
pub mod maze;
pub mod movement;
pub mod personality;
pub mod player;
pub mod scheduler;
pub mod timeline;

pub use config::Config;
pub use error::{GameError, GameResult, LevelError};
pub use game::{Game, GameListener, Intent, Status};
