//! Player agents
//!
//! Scripted players that speak the table protocol like any other client.
//! A [`Strategy`] decides what to play from a [`PlayerView`]; [`play`] runs
//! one connection from the name line to the end of the game.

pub mod runner;
pub mod strategy;
pub mod view;

pub use take_six_core as core;
pub use take_six_types as types;

pub use runner::{play, AgentError, GameSummary};
pub use strategy::{LeastRisk, LowestCard, Strategy, StrategyKind};
pub use view::PlayerView;
