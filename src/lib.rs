// ABOUTME: Library root for berth - exposes the control plane and its layers.
// ABOUTME: The CLI binary is in main.rs.

pub mod bridge;
pub mod config;
pub mod decode;
pub mod error;
pub mod model;
pub mod runtime;
pub mod service;
pub mod types;
