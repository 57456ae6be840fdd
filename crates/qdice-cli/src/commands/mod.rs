//! CLI command implementations.

pub mod common;
pub mod histogram;
pub mod render;
pub mod roll;
pub mod steps;
