//! Map container (`.bsp` version 30) reader.
//!
//! The file starts with an `i32` version followed by a directory of 15
//! `(offset, size)` pairs, one per [`LumpKind`]. Each lump is decoded on
//! demand and independently of the others: a damaged lump fails only the
//! call that reads it.

use hltools_core::error::{Error, FormatError};
use log::{debug, trace};
use std::io::{Read, Seek};
use std::path::Path;

use crate::cursor::{ascii_lossy, map_file, ByteCursor, MappedReader};
use crate::records::{
    ClipNode, Edge, Face, Leaf, LumpRecord, MarkSurface, MipTexture, Model, Node, Plane, Record,
    SurfEdge, TexInfo, Vec3,
};

pub const BSP_VERSION: i32 = 30;
pub const LUMP_COUNT: usize = 15;
pub const HEADER_SIZE: u64 = 4 + LUMP_COUNT as u64 * 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LumpKind {
    Entities,
    Planes,
    Textures,
    Vertices,
    Visibility,
    Nodes,
    TexInfo,
    Faces,
    Lightmaps,
    ClipNodes,
    Leaves,
    MarkSurfaces,
    Edges,
    SurfEdges,
    Models,
}

impl LumpKind {
    /// Directory order.
    pub const ALL: [LumpKind; LUMP_COUNT] = [
        Self::Entities,
        Self::Planes,
        Self::Textures,
        Self::Vertices,
        Self::Visibility,
        Self::Nodes,
        Self::TexInfo,
        Self::Faces,
        Self::Lightmaps,
        Self::ClipNodes,
        Self::Leaves,
        Self::MarkSurfaces,
        Self::Edges,
        Self::SurfEdges,
        Self::Models,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Entities => "entities",
            Self::Planes => "planes",
            Self::Textures => "textures",
            Self::Vertices => "vertices",
            Self::Visibility => "visibility",
            Self::Nodes => "nodes",
            Self::TexInfo => "texinfo",
            Self::Faces => "faces",
            Self::Lightmaps => "lightmaps",
            Self::ClipNodes => "clipnodes",
            Self::Leaves => "leaves",
            Self::MarkSurfaces => "marksurfaces",
            Self::Edges => "edges",
            Self::SurfEdges => "surfedges",
            Self::Models => "models",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectoryEntry {
    pub offset: u32,
    pub size: u32,
}

impl DirectoryEntry {
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.size)
    }

    /// Whole records of `stride` bytes; a trailing partial record is ignored.
    pub fn record_count(&self, stride: u64) -> u64 {
        u64::from(self.size) / stride
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumpDirectory {
    pub version: i32,
    pub entries: [DirectoryEntry; LUMP_COUNT],
    /// Length of the container when the directory was read.
    pub container_len: u64,
}

impl LumpDirectory {
    pub fn get(&self, kind: LumpKind) -> DirectoryEntry {
        self.entries[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (LumpKind, DirectoryEntry)> + '_ {
        LumpKind::ALL.iter().map(move |&k| (k, self.get(k)))
    }

    /// The entry for `kind`, rejected if it reaches past the container.
    pub fn checked(&self, kind: LumpKind) -> Result<DirectoryEntry, FormatError> {
        let entry = self.get(kind);
        if entry.end() > self.container_len {
            return Err(FormatError::LumpOutOfRange {
                lump: kind.name(),
                offset: entry.offset,
                size: entry.size,
                container_len: self.container_len,
            });
        }
        Ok(entry)
    }
}

/// Push-style consumer of decoded lumps.
///
/// `wants` decides which lumps [`BspFile::visit`] decodes at all; lumps that
/// are not wanted are never read from the stream.
pub trait LumpVisitor {
    fn wants(&self, kind: LumpKind) -> bool;

    fn entities(&mut self, _text: &str) {}
    fn plane(&mut self, _plane: Plane) {}
    fn texture(&mut self, _texture: MipTexture) {}
    fn vertex(&mut self, _vertex: Vec3) {}
    fn visibility(&mut self, _data: &[u8]) {}
    fn node(&mut self, _node: Node) {}
    fn tex_info(&mut self, _tex_info: TexInfo) {}
    fn face(&mut self, _face: Face) {}
    fn lightmaps(&mut self, _data: &[u8]) {}
    fn clip_node(&mut self, _node: ClipNode) {}
    fn leaf(&mut self, _leaf: Leaf) {}
    fn mark_surface(&mut self, _mark: MarkSurface) {}
    fn edge(&mut self, _edge: Edge) {}
    fn surf_edge(&mut self, _edge: SurfEdge) {}
    fn model(&mut self, _model: Model) {}
}

/// Result of streaming one lump through a [`LumpVisitor`].
#[derive(Debug)]
pub struct LumpOutcome {
    pub kind: LumpKind,
    /// Number of records (or bytes, for raw lumps) delivered.
    pub result: Result<u64, Error>,
}

#[derive(Debug)]
pub struct BspFile<R = MappedReader> {
    cursor: ByteCursor<R>,
    directory: Option<LumpDirectory>,
    texture_offsets: Option<Vec<i32>>,
}

impl BspFile<MappedReader> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::new(map_file(path)?)
    }
}

impl<R: Read + Seek> BspFile<R> {
    pub fn new(reader: R) -> Result<Self, Error> {
        Ok(Self {
            cursor: ByteCursor::new(reader)?,
            directory: None,
            texture_offsets: None,
        })
    }

    pub fn len(&self) -> u64 {
        self.cursor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.is_empty()
    }

    pub fn directory(&self) -> Option<&LumpDirectory> {
        self.directory.as_ref()
    }

    /// Read the version tag and lump directory.
    ///
    /// On failure the previously loaded directory (if any) is left in place.
    pub fn load_directory(&mut self) -> Result<&LumpDirectory, Error> {
        let directory = match self.read_directory() {
            Ok(directory) => directory,
            Err(err) if err.is_unexpected_eof() => {
                return Err(FormatError::MalformedContainer {
                    reason: format!("directory table truncated: {err}"),
                }
                .into());
            }
            Err(err) => return Err(err),
        };
        if directory.version != BSP_VERSION {
            debug!(
                "map version {} differs from {BSP_VERSION}; decoding anyway",
                directory.version
            );
        }
        Ok(self.directory.insert(directory))
    }

    fn read_directory(&mut self) -> Result<LumpDirectory, Error> {
        self.cursor.seek(0)?;
        let version = self.cursor.read_i32()?;
        let mut entries = [DirectoryEntry::default(); LUMP_COUNT];
        for entry in &mut entries {
            entry.offset = self.cursor.read_u32()?;
            entry.size = self.cursor.read_u32()?;
        }
        Ok(LumpDirectory {
            version,
            entries,
            container_len: self.cursor.len(),
        })
    }

    fn lump_entry(&self, kind: LumpKind) -> Result<DirectoryEntry, Error> {
        let directory = self
            .directory
            .as_ref()
            .ok_or(FormatError::DirectoryNotLoaded)?;
        Ok(directory.checked(kind)?)
    }

    /// Number of whole records a lump holds, without decoding any of them.
    pub fn record_count<T: LumpRecord>(&self) -> Result<u64, Error> {
        Ok(self.lump_entry(T::LUMP)?.record_count(T::STRIDE))
    }

    pub fn read_lump_bytes(&mut self, kind: LumpKind) -> Result<Vec<u8>, Error> {
        let entry = self.lump_entry(kind)?;
        self.cursor.seek(u64::from(entry.offset))?;
        self.cursor.read_bytes(entry.size as usize)
    }

    /// The entity lump as text. The whole lump is returned, including any
    /// trailing NUL the compiler wrote.
    pub fn read_entity_text(&mut self) -> Result<String, Error> {
        let bytes = self.read_lump_bytes(LumpKind::Entities)?;
        Ok(ascii_lossy(&bytes))
    }

    pub fn visibility(&mut self) -> Result<Vec<u8>, Error> {
        self.read_lump_bytes(LumpKind::Visibility)
    }

    pub fn lightmaps(&mut self) -> Result<Vec<u8>, Error> {
        self.read_lump_bytes(LumpKind::Lightmaps)
    }

    /// Read the texture lump's own directory: an `i32` count followed by
    /// that many lump-relative `i32` offsets.
    pub fn load_texture_offsets(&mut self) -> Result<&[i32], Error> {
        let entry = self.lump_entry(LumpKind::Textures)?;
        let offsets = if entry.size == 0 {
            Vec::new()
        } else {
            self.cursor.seek(u64::from(entry.offset))?;
            let count = self.cursor.read_i32()?;
            let fits = u64::try_from(count)
                .ok()
                .filter(|&n| 4 + n * 4 <= u64::from(entry.size));
            let Some(count) = fits else {
                return Err(FormatError::MalformedContainer {
                    reason: format!(
                        "texture count {count} does not fit in a {} byte lump",
                        entry.size
                    ),
                }
                .into());
            };
            let mut offsets = Vec::with_capacity(count as usize);
            for _ in 0..count {
                offsets.push(self.cursor.read_i32()?);
            }
            offsets
        };
        trace!("loaded {} texture offsets", offsets.len());
        Ok(self.texture_offsets.insert(offsets).as_slice())
    }

    pub fn texture_offsets(&self) -> Option<&[i32]> {
        self.texture_offsets.as_deref()
    }

    pub fn load_textures(&mut self) -> Result<Vec<MipTexture>, Error> {
        let mut out = Vec::new();
        self.for_each_texture(Some(&mut |t: MipTexture| out.push(t)))?;
        Ok(out)
    }

    /// Stream texture headers into `sink`. Requires
    /// [`load_texture_offsets`](Self::load_texture_offsets) first.
    pub fn for_each_texture<F>(&mut self, sink: Option<&mut F>) -> Result<u64, Error>
    where
        F: FnMut(MipTexture),
    {
        let Some(sink) = sink else {
            return Ok(0);
        };
        let offsets = self
            .texture_offsets
            .clone()
            .ok_or(FormatError::TextureOffsetsNotLoaded)?;
        let entry = self.lump_entry(LumpKind::Textures)?;
        let mut delivered = 0;
        for offset in offsets {
            // The compiler writes -1 for textures it could not find.
            let Ok(rel) = u64::try_from(offset) else {
                debug!("skipping texture slot with offset {offset}");
                continue;
            };
            let at = u64::from(entry.offset) + rel;
            if at + MipTexture::STRIDE > entry.end() {
                return Err(FormatError::MalformedContainer {
                    reason: format!("texture header at lump offset {rel} runs past the lump"),
                }
                .into());
            }
            self.cursor.seek(at)?;
            sink(MipTexture::decode(&mut self.cursor)?);
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Decode every whole record of `T`'s lump into a vector.
    pub fn read_lump<T: LumpRecord>(&mut self) -> Result<Vec<T>, Error> {
        let mut out = Vec::with_capacity(self.record_count::<T>()? as usize);
        self.for_each_record(Some(&mut |r: T| out.push(r)))?;
        Ok(out)
    }

    /// Decode `T`'s lump record by record into `sink`.
    ///
    /// With no sink nothing is read and `Ok(0)` is returned.
    pub fn for_each_record<T, F>(&mut self, sink: Option<&mut F>) -> Result<u64, Error>
    where
        T: LumpRecord,
        F: FnMut(T),
    {
        let Some(sink) = sink else {
            return Ok(0);
        };
        let entry = self.lump_entry(T::LUMP)?;
        let count = entry.record_count(T::STRIDE);
        for i in 0..count {
            self.cursor.seek(u64::from(entry.offset) + i * T::STRIDE)?;
            sink(T::decode(&mut self.cursor)?);
        }
        Ok(count)
    }

    pub fn planes(&mut self) -> Result<Vec<Plane>, Error> {
        self.read_lump()
    }

    pub fn vertices(&mut self) -> Result<Vec<Vec3>, Error> {
        self.read_lump()
    }

    pub fn nodes(&mut self) -> Result<Vec<Node>, Error> {
        self.read_lump()
    }

    pub fn tex_infos(&mut self) -> Result<Vec<TexInfo>, Error> {
        self.read_lump()
    }

    pub fn faces(&mut self) -> Result<Vec<Face>, Error> {
        self.read_lump()
    }

    pub fn clip_nodes(&mut self) -> Result<Vec<ClipNode>, Error> {
        self.read_lump()
    }

    pub fn leaves(&mut self) -> Result<Vec<Leaf>, Error> {
        self.read_lump()
    }

    pub fn mark_surfaces(&mut self) -> Result<Vec<MarkSurface>, Error> {
        self.read_lump()
    }

    pub fn edges(&mut self) -> Result<Vec<Edge>, Error> {
        self.read_lump()
    }

    pub fn surf_edges(&mut self) -> Result<Vec<SurfEdge>, Error> {
        self.read_lump()
    }

    pub fn models(&mut self) -> Result<Vec<Model>, Error> {
        self.read_lump()
    }

    /// Texture headers, loading the texture offsets first if needed.
    pub fn textures(&mut self) -> Result<Vec<MipTexture>, Error> {
        if self.texture_offsets.is_none() {
            self.load_texture_offsets()?;
        }
        self.load_textures()
    }

    /// Stream every lump the visitor wants, in directory order.
    ///
    /// A failing lump is reported in its outcome and does not stop the
    /// remaining lumps.
    pub fn visit<V: LumpVisitor>(&mut self, visitor: &mut V) -> Result<Vec<LumpOutcome>, Error> {
        if self.directory.is_none() {
            return Err(FormatError::DirectoryNotLoaded.into());
        }
        let mut outcomes = Vec::new();
        for kind in LumpKind::ALL {
            if !visitor.wants(kind) {
                continue;
            }
            let result = self.stream_lump(kind, visitor);
            if let Err(err) = &result {
                debug!("lump {} failed: {err}", kind.name());
            }
            outcomes.push(LumpOutcome { kind, result });
        }
        Ok(outcomes)
    }

    fn stream_lump<V: LumpVisitor>(&mut self, kind: LumpKind, v: &mut V) -> Result<u64, Error> {
        match kind {
            LumpKind::Entities => {
                let text = self.read_entity_text()?;
                v.entities(&text);
                Ok(text.len() as u64)
            }
            LumpKind::Visibility => {
                let data = self.visibility()?;
                v.visibility(&data);
                Ok(data.len() as u64)
            }
            LumpKind::Lightmaps => {
                let data = self.lightmaps()?;
                v.lightmaps(&data);
                Ok(data.len() as u64)
            }
            LumpKind::Textures => {
                if self.texture_offsets.is_none() {
                    self.load_texture_offsets()?;
                }
                self.for_each_texture(Some(&mut |t: MipTexture| v.texture(t)))
            }
            LumpKind::Planes => self.for_each_record(Some(&mut |r: Plane| v.plane(r))),
            LumpKind::Vertices => self.for_each_record(Some(&mut |r: Vec3| v.vertex(r))),
            LumpKind::Nodes => self.for_each_record(Some(&mut |r: Node| v.node(r))),
            LumpKind::TexInfo => self.for_each_record(Some(&mut |r: TexInfo| v.tex_info(r))),
            LumpKind::Faces => self.for_each_record(Some(&mut |r: Face| v.face(r))),
            LumpKind::ClipNodes => self.for_each_record(Some(&mut |r: ClipNode| v.clip_node(r))),
            LumpKind::Leaves => self.for_each_record(Some(&mut |r: Leaf| v.leaf(r))),
            LumpKind::MarkSurfaces => {
                self.for_each_record(Some(&mut |r: MarkSurface| v.mark_surface(r)))
            }
            LumpKind::Edges => self.for_each_record(Some(&mut |r: Edge| v.edge(r))),
            LumpKind::SurfEdges => self.for_each_record(Some(&mut |r: SurfEdge| v.surf_edge(r))),
            LumpKind::Models => self.for_each_record(Some(&mut |r: Model| v.model(r))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::Cursor;

    fn put_u32(buf: &mut [u8], offset: usize, v: u32) {
        buf[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
    }

    fn put_i32(buf: &mut [u8], offset: usize, v: i32) {
        buf[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
    }

    fn mip_header(name: &str, offsets: [u32; 4]) -> Vec<u8> {
        let mut b = vec![0u8; MipTexture::STRIDE as usize];
        b[..name.len()].copy_from_slice(name.as_bytes());
        put_u32(&mut b, 16, 16);
        put_u32(&mut b, 20, 16);
        for (i, o) in offsets.iter().enumerate() {
            put_u32(&mut b, 24 + i * 4, *o);
        }
        b
    }

    fn texture_lump(textures: &[Vec<u8>]) -> Vec<u8> {
        let head = 4 + textures.len() * 4;
        let mut lump = vec![0u8; head];
        put_i32(&mut lump, 0, textures.len() as i32);
        for (i, t) in textures.iter().enumerate() {
            let at = lump.len() as i32;
            put_i32(&mut lump, 4 + i * 4, at);
            lump.extend_from_slice(t);
        }
        lump
    }

    /// Header followed by the given lumps laid out back to back.
    fn build_map(lumps: &BTreeMap<LumpKind, Vec<u8>>) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_SIZE as usize];
        put_i32(&mut buf, 0, BSP_VERSION);
        for kind in LumpKind::ALL {
            let data = lumps.get(&kind).cloned().unwrap_or_default();
            let at = 4 + kind.index() * 8;
            let start = buf.len() as u32;
            put_u32(&mut buf, at, start);
            put_u32(&mut buf, at + 4, data.len() as u32);
            buf.extend_from_slice(&data);
        }
        buf
    }

    fn open(bytes: Vec<u8>) -> BspFile<Cursor<Vec<u8>>> {
        BspFile::new(Cursor::new(bytes)).unwrap()
    }

    fn sample_map() -> Vec<u8> {
        let mut lumps = BTreeMap::new();
        lumps.insert(
            LumpKind::Entities,
            b"{\n\"classname\" \"worldspawn\"\n}\n\0".to_vec(),
        );
        lumps.insert(
            LumpKind::Textures,
            texture_lump(&[
                mip_header("sky", [0, 0, 0, 0]),
                mip_header("{grate", [40, 296, 360, 376]),
            ]),
        );
        let mut verts = Vec::new();
        for v in [1.0f32, 2.0, 3.0, -1.0, -2.0, -3.0] {
            verts.extend_from_slice(&v.to_le_bytes());
        }
        lumps.insert(LumpKind::Vertices, verts);
        let mut edges = Vec::new();
        for v in [0u16, 1, 1, 0] {
            edges.extend_from_slice(&v.to_le_bytes());
        }
        // Half an edge of trailing garbage.
        edges.extend_from_slice(&[0xaa, 0xbb]);
        lumps.insert(LumpKind::Edges, edges);
        lumps.insert(LumpKind::Lightmaps, vec![1, 2, 3]);
        build_map(&lumps)
    }

    #[test]
    fn loads_directory_and_reads_entities() {
        let mut bsp = open(sample_map());
        let dir = bsp.load_directory().unwrap();
        assert_eq!(dir.version, BSP_VERSION);
        assert_eq!(dir.get(LumpKind::Entities).offset as u64, HEADER_SIZE);
        let text = bsp.read_entity_text().unwrap();
        assert!(text.starts_with("{\n\"classname\""));
        assert!(text.ends_with('\0'));
    }

    #[test]
    fn directory_reload_is_identical() {
        let mut bsp = open(sample_map());
        let first = bsp.load_directory().unwrap().clone();
        bsp.vertices().unwrap();
        let second = bsp.load_directory().unwrap().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn truncated_directory_is_malformed_and_keeps_state() {
        let full = sample_map();
        let mut bsp = open(full[..40].to_vec());
        let err = bsp.load_directory().unwrap_err();
        assert!(matches!(
            err,
            Error::Format(FormatError::MalformedContainer { .. })
        ));
        assert!(bsp.directory().is_none());
    }

    #[test]
    fn lumps_require_directory() {
        let mut bsp = open(sample_map());
        let err = bsp.vertices().unwrap_err();
        assert!(matches!(err, Error::Format(FormatError::DirectoryNotLoaded)));
    }

    #[test]
    fn partial_trailing_record_is_ignored() {
        let mut bsp = open(sample_map());
        bsp.load_directory().unwrap();
        let edges = bsp.edges().unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[1].vertices, [1, 0]);
        assert_eq!(bsp.record_count::<Edge>().unwrap(), 2);
    }

    #[test]
    fn decodes_vertices_eagerly() {
        let mut bsp = open(sample_map());
        bsp.load_directory().unwrap();
        let verts = bsp.vertices().unwrap();
        assert_eq!(verts, vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(-1.0, -2.0, -3.0)]);
        assert_eq!(bsp.lightmaps().unwrap(), vec![1, 2, 3]);
        assert!(bsp.planes().unwrap().is_empty());
    }

    #[test]
    fn textures_need_offsets_first() {
        let mut bsp = open(sample_map());
        bsp.load_directory().unwrap();
        let err = bsp.load_textures().unwrap_err();
        assert!(matches!(
            err,
            Error::Format(FormatError::TextureOffsetsNotLoaded)
        ));
        assert_eq!(bsp.load_texture_offsets().unwrap().len(), 2);
        let textures = bsp.load_textures().unwrap();
        assert_eq!(textures.len(), 2);
        assert_eq!(textures[0].name, "sky");
        assert!(textures[0].is_external());
        assert_eq!(textures[1].name, "{grate");
        assert!(!textures[1].is_external());
    }

    #[test]
    fn textures_wrapper_loads_offsets() {
        let mut bsp = open(sample_map());
        bsp.load_directory().unwrap();
        assert_eq!(bsp.textures().unwrap().len(), 2);
        assert_eq!(bsp.texture_offsets().map(<[i32]>::len), Some(2));
    }

    #[test]
    fn negative_texture_offsets_are_skipped() {
        let mut lump = texture_lump(&[mip_header("a", [0; 4]), mip_header("b", [0; 4])]);
        put_i32(&mut lump, 4, -1);
        let mut lumps = BTreeMap::new();
        lumps.insert(LumpKind::Textures, lump);
        let mut bsp = open(build_map(&lumps));
        bsp.load_directory().unwrap();
        bsp.load_texture_offsets().unwrap();
        let names: Vec<_> = bsp.load_textures().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn oversized_texture_count_is_malformed() {
        let mut lump = texture_lump(&[mip_header("a", [0; 4])]);
        put_i32(&mut lump, 0, 1_000_000);
        let mut lumps = BTreeMap::new();
        lumps.insert(LumpKind::Textures, lump);
        let mut bsp = open(build_map(&lumps));
        bsp.load_directory().unwrap();
        assert!(bsp.load_texture_offsets().is_err());
        assert!(bsp.texture_offsets().is_none());
    }

    #[test]
    fn out_of_range_lump_fails_alone() {
        let mut data = sample_map();
        // Point the planes lump far past the end of the file.
        put_u32(&mut data, 4 + LumpKind::Planes.index() * 8, 10_000);
        put_u32(&mut data, 4 + LumpKind::Planes.index() * 8 + 4, 20);
        let mut bsp = open(data);
        bsp.load_directory().unwrap();
        let err = bsp.planes().unwrap_err();
        assert!(matches!(
            err,
            Error::Format(FormatError::LumpOutOfRange { lump: "planes", .. })
        ));
        assert_eq!(bsp.vertices().unwrap().len(), 2);
    }

    #[test]
    fn absent_sink_skips_decoding() {
        let mut bsp = open(sample_map());
        bsp.load_directory().unwrap();
        let mut seen = Vec::new();
        let n = bsp
            .for_each_record(Some(&mut |v: Vec3| seen.push(v.x)))
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(seen, vec![1.0, -1.0]);

        // With the vertex lump unreadable, only a present sink touches it.
        let mut data = sample_map();
        put_u32(&mut data, 4 + LumpKind::Vertices.index() * 8, 10_000);
        put_u32(&mut data, 4 + LumpKind::Vertices.index() * 8 + 4, 24);
        let mut bsp = open(data);
        bsp.load_directory().unwrap();
        let n = bsp
            .for_each_record::<Vec3, fn(Vec3)>(None)
            .unwrap();
        assert_eq!(n, 0);
        let err = bsp
            .for_each_record(Some(&mut |_: Vec3| {}))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Format(FormatError::LumpOutOfRange { lump: "vertices", .. })
        ));
    }

    #[derive(Default)]
    struct Counter {
        vertices: usize,
        textures: Vec<String>,
        lightmap_bytes: usize,
    }

    impl LumpVisitor for Counter {
        fn wants(&self, kind: LumpKind) -> bool {
            matches!(
                kind,
                LumpKind::Vertices | LumpKind::Textures | LumpKind::Lightmaps | LumpKind::Planes
            )
        }

        fn vertex(&mut self, _vertex: Vec3) {
            self.vertices += 1;
        }

        fn texture(&mut self, texture: MipTexture) {
            self.textures.push(texture.name);
        }

        fn lightmaps(&mut self, data: &[u8]) {
            self.lightmap_bytes += data.len();
        }
    }

    #[test]
    fn visitor_streams_only_wanted_lumps() {
        let mut data = sample_map();
        put_u32(&mut data, 4 + LumpKind::Planes.index() * 8, 10_000);
        put_u32(&mut data, 4 + LumpKind::Planes.index() * 8 + 4, 20);
        let mut bsp = open(data);
        bsp.load_directory().unwrap();

        let mut counter = Counter::default();
        let outcomes = bsp.visit(&mut counter).unwrap();
        let kinds: Vec<_> = outcomes.iter().map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LumpKind::Planes,
                LumpKind::Textures,
                LumpKind::Vertices,
                LumpKind::Lightmaps
            ]
        );
        assert!(outcomes[0].result.is_err());
        assert_eq!(outcomes[2].result.as_ref().unwrap(), &2);
        assert_eq!(counter.vertices, 2);
        assert_eq!(counter.textures, vec!["sky", "{grate"]);
        assert_eq!(counter.lightmap_bytes, 3);
    }

    #[test]
    fn opens_mapped_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.bsp");
        std::fs::write(&path, sample_map()).unwrap();
        let mut bsp = BspFile::open(&path).unwrap();
        bsp.load_directory().unwrap();
        assert_eq!(bsp.vertices().unwrap().len(), 2);
    }
}
