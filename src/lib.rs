pub mod analysis;
pub mod browser;
pub mod catalog;
pub mod config;
pub mod diag;
pub mod error;
pub mod export;
pub mod output;
pub mod params;
pub mod tui;
