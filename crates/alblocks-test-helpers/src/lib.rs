//! Shared fixtures for alblocks tests: a terse block-building vocabulary
//! and one-call generation helpers.

pub mod blocks;
pub mod generate;

pub use generate::{generate, generate_json, generate_value, generate_with_config};
