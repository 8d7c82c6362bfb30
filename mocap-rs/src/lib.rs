//! mocap-rs library
//!
//! Command implementations and output helpers behind the `mocap-rs` binary.

pub mod cli;
pub mod commands;
pub mod utils;
