//! CLI command implementations.

pub mod benchmark;
pub mod common;
pub mod compress;
pub mod view;
