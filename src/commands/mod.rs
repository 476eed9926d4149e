//! Application command handlers for melodyq.
//!
//! # Commands
//! - `listen`: Interactive trigger screen (default)
//! - `once`: One trigger with line output, for scripts and pipes
//! - `config`: Open configuration file in user's preferred editor
//! - `logs`: Display recent log entries

pub mod config;
pub mod listen;
pub mod logs;
pub mod once;

pub use config::handle_config;
pub use listen::handle_listen;
pub use logs::handle_logs;
pub use once::handle_once;
