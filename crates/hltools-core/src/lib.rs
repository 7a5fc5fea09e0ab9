//! Core data structures shared by the GoldSrc container decoders and the
//! asset verifier.
//!
//! This crate defines the error taxonomy and the verification report type
//! used throughout the hltools workspace.

pub mod error;
pub mod report;

pub type Result<T, E = error::Error> = std::result::Result<T, E>;
