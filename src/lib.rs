pub mod command;
pub mod config;
pub mod format;
pub mod memory;
pub mod run_wrapper;
pub mod session;

pub mod error;
