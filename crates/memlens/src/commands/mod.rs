//! Command handlers for the memlens CLI.

pub mod decode;
pub mod types;

pub use decode::handle_decode_command;
pub use types::handle_types_command;
