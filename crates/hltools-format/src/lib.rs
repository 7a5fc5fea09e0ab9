//! Readers for the GoldSrc map (`.bsp`, version 30) and texture archive
//! (`WAD3`) containers, plus the parser for the entity text embedded in maps.

mod cursor;
pub mod bsp;
pub mod entity;
pub mod records;
pub mod wad;

pub use cursor::{ascii_lossy, map_file, ByteCursor, MappedReader};

pub use bsp::{
    BspFile, DirectoryEntry, LumpDirectory, LumpKind, LumpOutcome, LumpVisitor, BSP_VERSION,
    HEADER_SIZE, LUMP_COUNT,
};
pub use entity::{EntityParser, EntityRecord, EntityTable, Records};
pub use records::{
    BoundBox, ClipNode, Edge, Face, Leaf, LumpRecord, MarkSurface, MipTexture, Model, Node, Plane,
    Record, ShortBounds, SurfEdge, TexInfo, Vec3,
};
pub use wad::{ArchiveEntry, EntryKind, WadFile, WadHeader, WAD3_MAGIC};
