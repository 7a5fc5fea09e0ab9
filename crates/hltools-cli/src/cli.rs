use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "hltools",
    version,
    about = "Inspect GoldSrc maps and texture archives, and verify map dependencies.",
    long_about = "Inspect GoldSrc maps (.bsp v30) and texture archives (WAD3), and verify that a map's textures, sprites, sounds and models exist in a mod.\n\nNotes:\n  - Assets are looked up in the mod directory first, then in the fallback game directory (`valve`).\n  - Logging is controlled with RUST_LOG (default `warn`)."
)]
pub(crate) struct Cli {
    /// Emit machine-readable JSON instead of human output.
    #[arg(long)]
    pub(crate) json: bool,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short)]
    pub(crate) verbose: bool,

    /// JSON file overriding directory and extension names.
    #[arg(long, value_name = "FILE")]
    pub(crate) config: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) cmd: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Check that maps' texture archives, textures and assets are present.
    Verify {
        /// Game install directory (the one holding `valve/`).
        #[arg(long)]
        base: PathBuf,
        /// Mod directory under the base directory (e.g. `cstrike`).
        #[arg(long = "mod", value_name = "NAME")]
        mod_dir: String,
        /// Map names under `<mod>/maps`; all maps when omitted.
        #[arg(value_name = "MAP")]
        maps: Vec<String>,
        /// Exit with an error unless every map is client-capable.
        #[arg(long)]
        fail_on_missing: bool,
    },
    /// Print a map's version, lump directory, record counts and textures.
    Inspect {
        /// Map file path.
        path: PathBuf,
    },
    /// Print the entities stored in a map.
    Entities {
        /// Map file path.
        path: PathBuf,
        /// Only print entities of this classname.
        #[arg(long)]
        class: Option<String>,
    },
    /// Print a texture archive's header and entries.
    Wad {
        /// Archive file path.
        path: PathBuf,
    },
}
