//! Translate Relay — SMS ↔ operator console bridge with machine translation.

pub mod config;
pub mod console;
pub mod delivery;
pub mod error;
pub mod relay;
pub mod server;
pub mod translate;
