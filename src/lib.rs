//! Furrow library crate — the farming core of a tile-based farming game.
//!
//! The binary crate (`main.rs`) is a headless demo that drives the core for a
//! few in-game days. This library exposes the modules so that `tests/`
//! integration tests and an embedding game can use the grid, the tool latch
//! and the plugins without a window or GPU.

pub mod shared;
pub mod data;
pub mod farming;
pub mod player;
pub mod save;
