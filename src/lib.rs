// The binary entry point is main.rs; the module tree lives here so that
// integration tests can drive sessions through `learnloop::session::*`.

pub mod app;
pub mod config;
pub mod content;
pub mod event;
pub mod logging;
pub mod session;
pub mod ui;
