//! Shared CLI helpers

pub mod pause;
