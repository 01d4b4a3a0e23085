//! `TaskFlow`: a terminal task board backed by a hosted record service.

pub mod app;
pub mod config;
pub mod notify;
pub mod prefs;
pub mod records;
pub mod service;
pub mod store;
pub mod sync;
pub mod tasks;
pub mod ui;
