//! Implementations of the `hltools` subcommands.

pub(crate) mod entities;
pub(crate) mod inspect;
pub(crate) mod verify;
pub(crate) mod wad;
