//! Dungeon server - real-time multiplayer maze game backend
//!
//! This crate provides:
//! - Procedural dungeon generation (rooms joined by corridors)
//! - Server-authoritative player movement and goal detection
//! - `WebSocket` fan-out of the maze and every player's position
//! - Fire-and-forget persistence of completed-round statistics

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod game;
pub mod gateway;
pub mod maze;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod stats;
