pub mod app;
pub mod classify;
pub mod config;
pub mod copy_state;
pub mod segment;
