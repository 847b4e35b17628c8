pub mod audio;
pub mod avatar;
pub mod cli;
pub mod config;
pub mod core;
pub mod link;
pub mod session;
pub mod telemetry;
pub mod ui;
