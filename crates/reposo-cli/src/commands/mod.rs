//! CLI command implementations.

pub mod ambience;
pub mod common;
pub mod config;
pub mod depth;
pub mod devices;
pub mod play;
pub mod render;
