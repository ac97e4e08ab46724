pub mod autoplay;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod hex;
pub mod motion;
pub mod pathfinding;
pub mod rng;
pub mod rules;
pub mod scenario;
pub mod session;
pub mod snapshot;
pub mod systems;
pub mod territory;
pub mod web;
pub mod world;

pub use engine::{BuildOutcome, EngineBuilder, MoveOutcome, Phase, TurnEngine};
pub use error::{GameError, GameResult};
pub use scenario::Scenario;
pub use world::GameState;
