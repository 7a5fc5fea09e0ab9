//! Checks that a map's external dependencies (texture archives, textures,
//! sprites, sounds and models) are present in a mod's directory layout.

pub mod asset;
pub mod config;
pub mod fs;
pub mod verifier;

#[cfg(test)]
mod fixtures;

pub use asset::{AssetRef, PathMatch};
pub use config::VerifierConfig;
pub use fs::{DiskFs, GameFs};
pub use verifier::{MapOutcome, Verifier};
