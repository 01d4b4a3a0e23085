//! `TaskFlow` record service library.
//!
//! In-memory record tables implementing the board/task record contract, and
//! an axum HTTP server exposing them. The client embeds the tables directly
//! for its offline demo mode and tests.

pub mod config;
pub mod server;
pub mod store;
