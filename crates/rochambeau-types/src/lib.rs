//! Shared domain types for the Rochambeau project.

pub mod clock;
pub mod config;
pub mod events;
pub mod hand;
pub mod hud;
pub mod moves;
pub mod vision;

mod errors;

pub use errors::{Result, RochambeauError};
