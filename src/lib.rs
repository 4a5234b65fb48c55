pub mod app;
pub mod catalog;
pub mod clipboard;
pub mod config;
pub mod domain;
pub mod error;
pub mod link;
pub mod output;
pub mod search;
pub mod telemetry;
pub mod tui;
