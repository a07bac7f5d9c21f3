//! Personal reading tracker: pace objectives, daily progress and reading
//! statistics over a local SQLite library.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod tracker;
pub mod tui;
