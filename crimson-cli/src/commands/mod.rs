//! Command implementations for the crimson CLI

pub mod config;
pub mod map;
