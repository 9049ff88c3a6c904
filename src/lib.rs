// Library module for treemirror
// Re-exports modules for use in integration tests and the binary

pub mod config;
pub mod fs;
pub mod hash;
pub mod logging;
pub mod sync;
