//! Configuration module
//!
//! Contains the player configuration and its defaults.

mod player_config;

pub use player_config::*;
