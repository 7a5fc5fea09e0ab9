//! Texture archive (`WAD3`) reader.
//!
//! Layout: a 12-byte header (`"WAD3"`, entry count, directory offset), blob
//! data, then a directory of 32-byte [`ArchiveEntry`] records.

use hltools_core::error::{Error, FormatError};
use log::{trace, warn};
use std::io::{Read, Seek};
use std::path::Path;

use crate::cursor::{map_file, ByteCursor, MappedReader};
use crate::records::Record;

pub const WAD3_MAGIC: [u8; 4] = *b"WAD3";
const NAME_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WadHeader {
    pub magic: [u8; 4],
    pub entry_count: u32,
    pub directory_offset: u32,
}

impl WadHeader {
    pub const SIZE: u64 = 12;

    pub fn magic_ok(&self) -> bool {
        self.magic == WAD3_MAGIC
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Palette,
    StatusBar,
    MipTexture,
    ConsolePicture,
    Font,
    Other(u8),
}

impl EntryKind {
    pub fn from_byte(b: u8) -> Self {
        match b {
            0x40 => Self::Palette,
            0x42 => Self::StatusBar,
            0x43 => Self::MipTexture,
            0x45 => Self::ConsolePicture,
            0x46 => Self::Font,
            other => Self::Other(other),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Self::Palette => 0x40,
            Self::StatusBar => 0x42,
            Self::MipTexture => 0x43,
            Self::ConsolePicture => 0x45,
            Self::Font => 0x46,
            Self::Other(b) => b,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Palette => "palette",
            Self::StatusBar => "statusbar",
            Self::MipTexture => "miptex",
            Self::ConsolePicture => "conpic",
            Self::Font => "font",
            Self::Other(_) => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub offset: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub kind: EntryKind,
    pub compression: u8,
    pub name: String,
}

impl Record for ArchiveEntry {
    const STRIDE: u64 = 32;

    fn decode<R: Read + Seek>(c: &mut ByteCursor<R>) -> Result<Self, Error> {
        let offset = c.read_u32()?;
        let compressed_size = c.read_u32()?;
        let uncompressed_size = c.read_u32()?;
        let kind = EntryKind::from_byte(c.read_u8()?);
        let compression = c.read_u8()?;
        let _padding = c.read_array::<2>()?;
        let name = c.read_fixed_string(NAME_LEN)?;
        Ok(Self {
            offset,
            compressed_size,
            uncompressed_size,
            kind,
            compression,
            name,
        })
    }
}

#[derive(Debug)]
pub struct WadFile<R = MappedReader> {
    cursor: ByteCursor<R>,
    header: WadHeader,
    entries: Option<Vec<ArchiveEntry>>,
}

impl WadFile<MappedReader> {
    /// Open an archive. A wrong magic is logged and decoding continues.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::new(map_file(path)?)
    }

    /// Open an archive, rejecting anything not tagged `WAD3`.
    pub fn open_strict(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::new_strict(map_file(path)?)
    }
}

impl<R: Read + Seek> WadFile<R> {
    pub fn new(reader: R) -> Result<Self, Error> {
        let file = Self::read_header(reader)?;
        if !file.header.magic_ok() {
            warn!(
                "archive magic {:?} is not WAD3; reading anyway",
                file.header.magic
            );
        }
        Ok(file)
    }

    pub fn new_strict(reader: R) -> Result<Self, Error> {
        let file = Self::read_header(reader)?;
        if !file.header.magic_ok() {
            return Err(FormatError::BadMagic {
                found: file.header.magic,
            }
            .into());
        }
        Ok(file)
    }

    fn read_header(reader: R) -> Result<Self, Error> {
        let mut cursor = ByteCursor::new(reader)?;
        if cursor.len() < WadHeader::SIZE {
            return Err(FormatError::MalformedContainer {
                reason: format!("archive header needs 12 bytes, file has {}", cursor.len()),
            }
            .into());
        }
        let header = WadHeader {
            magic: cursor.read_array()?,
            entry_count: cursor.read_u32()?,
            directory_offset: cursor.read_u32()?,
        };
        Ok(Self {
            cursor,
            header,
            entries: None,
        })
    }

    pub fn header(&self) -> &WadHeader {
        &self.header
    }

    pub fn magic_ok(&self) -> bool {
        self.header.magic_ok()
    }

    pub fn entries(&self) -> Option<&[ArchiveEntry]> {
        self.entries.as_deref()
    }

    /// Names of the loaded entries, in directory order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .flatten()
            .map(|entry| entry.name.as_str())
    }

    fn check_directory(&self) -> Result<(), Error> {
        let end = u64::from(self.header.directory_offset)
            + u64::from(self.header.entry_count) * ArchiveEntry::STRIDE;
        if end > self.cursor.len() {
            return Err(FormatError::MalformedContainer {
                reason: format!(
                    "directory of {} entries at {} runs past end of archive ({} bytes)",
                    self.header.entry_count,
                    self.header.directory_offset,
                    self.cursor.len()
                ),
            }
            .into());
        }
        Ok(())
    }

    pub fn load_entries(&mut self) -> Result<&[ArchiveEntry], Error> {
        let mut entries = Vec::with_capacity(self.header.entry_count as usize);
        self.for_each_entry(Some(&mut |e: ArchiveEntry| entries.push(e)))?;
        trace!("loaded {} archive entries", entries.len());
        Ok(self.entries.insert(entries).as_slice())
    }

    /// Stream directory entries into `sink`. With no sink nothing is read.
    pub fn for_each_entry<F>(&mut self, sink: Option<&mut F>) -> Result<u64, Error>
    where
        F: FnMut(ArchiveEntry),
    {
        let Some(sink) = sink else {
            return Ok(0);
        };
        self.check_directory()?;
        self.cursor.seek(u64::from(self.header.directory_offset))?;
        for _ in 0..self.header.entry_count {
            sink(ArchiveEntry::decode(&mut self.cursor)?);
        }
        Ok(u64::from(self.header.entry_count))
    }

    /// Raw stored bytes of `entry`; nothing is decompressed.
    pub fn read_entry_bytes(&mut self, entry: &ArchiveEntry) -> Result<Vec<u8>, Error> {
        self.cursor.seek(u64::from(entry.offset))?;
        self.cursor.read_bytes(entry.compressed_size as usize)
    }
}
