//! Garden server library: yield optimization and pairing engine plus the
//! reader and HTTP layers around it. See `main.rs` for the binary.

pub mod config;
pub mod engine;
pub mod readers;
pub mod routes;
pub mod server;
