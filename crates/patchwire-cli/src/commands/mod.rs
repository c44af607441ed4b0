//! CLI command implementations.

pub mod bank;
pub mod common;
pub mod config;
pub mod decode;
pub mod devices;
pub mod encode;
pub mod info;
pub mod pack;
pub mod request;
