//! Application module
//!
//! Contains the egui window that hosts playback.

mod player_app;

pub use player_app::{window_size, PlayerApp};
