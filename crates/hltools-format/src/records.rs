//! Fixed-layout records stored in map lumps.
//!
//! Every record is decoded field by field in little-endian order; the
//! `STRIDE` of each type is the exact on-disk size of one record.

use hltools_core::error::Error;
use std::io::{Read, Seek};

use crate::bsp::LumpKind;
use crate::cursor::ByteCursor;

pub trait Record: Sized {
    const STRIDE: u64;

    fn decode<R: Read + Seek>(c: &mut ByteCursor<R>) -> Result<Self, Error>;
}

/// A record stored as a plain array filling one lump.
pub trait LumpRecord: Record {
    const LUMP: LumpKind;
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Record for Vec3 {
    const STRIDE: u64 = 12;

    fn decode<R: Read + Seek>(c: &mut ByteCursor<R>) -> Result<Self, Error> {
        Ok(Self {
            x: c.read_f32()?,
            y: c.read_f32()?,
            z: c.read_f32()?,
        })
    }
}

impl LumpRecord for Vec3 {
    const LUMP: LumpKind = LumpKind::Vertices;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub dist: f32,
    /// Axis classification (0-2 axial, 3-5 closest to an axis).
    pub kind: i32,
}

impl Record for Plane {
    const STRIDE: u64 = 20;

    fn decode<R: Read + Seek>(c: &mut ByteCursor<R>) -> Result<Self, Error> {
        Ok(Self {
            normal: Vec3::decode(c)?,
            dist: c.read_f32()?,
            kind: c.read_i32()?,
        })
    }
}

impl LumpRecord for Plane {
    const LUMP: LumpKind = LumpKind::Planes;
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundBox {
    pub fn contains(&self, p: Vec3) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }
}

impl Record for BoundBox {
    const STRIDE: u64 = 24;

    fn decode<R: Read + Seek>(c: &mut ByteCursor<R>) -> Result<Self, Error> {
        Ok(Self {
            min: Vec3::decode(c)?,
            max: Vec3::decode(c)?,
        })
    }
}

/// Integer bounds used by nodes and leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShortBounds {
    pub min: [i16; 3],
    pub max: [i16; 3],
}

impl ShortBounds {
    pub fn contains(&self, p: Vec3) -> bool {
        let axes = [p.x, p.y, p.z];
        axes.iter()
            .enumerate()
            .all(|(i, &v)| f32::from(self.min[i]) <= v && v <= f32::from(self.max[i]))
    }
}

impl Record for ShortBounds {
    const STRIDE: u64 = 12;

    fn decode<R: Read + Seek>(c: &mut ByteCursor<R>) -> Result<Self, Error> {
        Ok(Self {
            min: [c.read_i16()?, c.read_i16()?, c.read_i16()?],
            max: [c.read_i16()?, c.read_i16()?, c.read_i16()?],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipTexture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Offsets of the four mip levels, relative to the texture header.
    pub offsets: [u32; 4],
}

impl MipTexture {
    pub const NAME_LEN: usize = 16;

    /// Pixel data lives in a WAD archive rather than in the map.
    pub fn is_external(&self) -> bool {
        self.offsets.iter().all(|&o| o == 0)
    }
}

impl Record for MipTexture {
    const STRIDE: u64 = 40;

    fn decode<R: Read + Seek>(c: &mut ByteCursor<R>) -> Result<Self, Error> {
        Ok(Self {
            name: c.read_fixed_string(Self::NAME_LEN)?,
            width: c.read_u32()?,
            height: c.read_u32()?,
            offsets: [c.read_u32()?, c.read_u32()?, c.read_u32()?, c.read_u32()?],
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub plane: u32,
    /// Negative children are `-(leaf + 1)`.
    pub children: [i16; 2],
    pub bounds: ShortBounds,
    pub first_face: u16,
    pub face_count: u16,
}

impl Record for Node {
    const STRIDE: u64 = 24;

    fn decode<R: Read + Seek>(c: &mut ByteCursor<R>) -> Result<Self, Error> {
        Ok(Self {
            plane: c.read_u32()?,
            children: [c.read_i16()?, c.read_i16()?],
            bounds: ShortBounds::decode(c)?,
            first_face: c.read_u16()?,
            face_count: c.read_u16()?,
        })
    }
}

impl LumpRecord for Node {
    const LUMP: LumpKind = LumpKind::Nodes;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexInfo {
    pub s: Vec3,
    pub s_shift: f32,
    pub t: Vec3,
    pub t_shift: f32,
    pub miptex: u32,
    pub flags: u32,
}

impl Record for TexInfo {
    const STRIDE: u64 = 40;

    fn decode<R: Read + Seek>(c: &mut ByteCursor<R>) -> Result<Self, Error> {
        Ok(Self {
            s: Vec3::decode(c)?,
            s_shift: c.read_f32()?,
            t: Vec3::decode(c)?,
            t_shift: c.read_f32()?,
            miptex: c.read_u32()?,
            flags: c.read_u32()?,
        })
    }
}

impl LumpRecord for TexInfo {
    const LUMP: LumpKind = LumpKind::TexInfo;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub plane: u16,
    pub side: u16,
    pub first_edge: i32,
    pub edge_count: u16,
    pub tex_info: u16,
    pub styles: [u8; 4],
    pub light_offset: i32,
}

impl Record for Face {
    const STRIDE: u64 = 20;

    fn decode<R: Read + Seek>(c: &mut ByteCursor<R>) -> Result<Self, Error> {
        Ok(Self {
            plane: c.read_u16()?,
            side: c.read_u16()?,
            first_edge: c.read_i32()?,
            edge_count: c.read_u16()?,
            tex_info: c.read_u16()?,
            styles: c.read_array::<4>()?,
            light_offset: c.read_i32()?,
        })
    }
}

impl LumpRecord for Face {
    const LUMP: LumpKind = LumpKind::Faces;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipNode {
    pub plane: i32,
    pub children: [i16; 2],
}

impl Record for ClipNode {
    const STRIDE: u64 = 8;

    fn decode<R: Read + Seek>(c: &mut ByteCursor<R>) -> Result<Self, Error> {
        Ok(Self {
            plane: c.read_i32()?,
            children: [c.read_i16()?, c.read_i16()?],
        })
    }
}

impl LumpRecord for ClipNode {
    const LUMP: LumpKind = LumpKind::ClipNodes;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leaf {
    pub contents: i32,
    pub vis_offset: i32,
    pub bounds: ShortBounds,
    pub first_mark_surface: u16,
    pub mark_surface_count: u16,
    /// Ambient sound levels: water, sky, slime, lava.
    pub ambient_levels: [u8; 4],
}

impl Record for Leaf {
    const STRIDE: u64 = 28;

    fn decode<R: Read + Seek>(c: &mut ByteCursor<R>) -> Result<Self, Error> {
        Ok(Self {
            contents: c.read_i32()?,
            vis_offset: c.read_i32()?,
            bounds: ShortBounds::decode(c)?,
            first_mark_surface: c.read_u16()?,
            mark_surface_count: c.read_u16()?,
            ambient_levels: c.read_array::<4>()?,
        })
    }
}

impl LumpRecord for Leaf {
    const LUMP: LumpKind = LumpKind::Leaves;
}

/// Index into the face lump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkSurface(pub u16);

impl Record for MarkSurface {
    const STRIDE: u64 = 2;

    fn decode<R: Read + Seek>(c: &mut ByteCursor<R>) -> Result<Self, Error> {
        Ok(Self(c.read_u16()?))
    }
}

impl LumpRecord for MarkSurface {
    const LUMP: LumpKind = LumpKind::MarkSurfaces;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub vertices: [u16; 2],
}

impl Record for Edge {
    const STRIDE: u64 = 4;

    fn decode<R: Read + Seek>(c: &mut ByteCursor<R>) -> Result<Self, Error> {
        Ok(Self {
            vertices: [c.read_u16()?, c.read_u16()?],
        })
    }
}

impl LumpRecord for Edge {
    const LUMP: LumpKind = LumpKind::Edges;
}

/// Signed edge index; a negative value walks the edge backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfEdge(pub i32);

impl Record for SurfEdge {
    const STRIDE: u64 = 4;

    fn decode<R: Read + Seek>(c: &mut ByteCursor<R>) -> Result<Self, Error> {
        Ok(Self(c.read_i32()?))
    }
}

impl LumpRecord for SurfEdge {
    const LUMP: LumpKind = LumpKind::SurfEdges;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Model {
    pub bounds: BoundBox,
    pub origin: Vec3,
    pub head_nodes: [i32; 4],
    pub vis_leaves: i32,
    pub first_face: i32,
    pub face_count: i32,
}

impl Record for Model {
    const STRIDE: u64 = 64;

    fn decode<R: Read + Seek>(c: &mut ByteCursor<R>) -> Result<Self, Error> {
        Ok(Self {
            bounds: BoundBox::decode(c)?,
            origin: Vec3::decode(c)?,
            head_nodes: [c.read_i32()?, c.read_i32()?, c.read_i32()?, c.read_i32()?],
            vis_leaves: c.read_i32()?,
            first_face: c.read_i32()?,
            face_count: c.read_i32()?,
        })
    }
}

impl LumpRecord for Model {
    const LUMP: LumpKind = LumpKind::Models;
}
