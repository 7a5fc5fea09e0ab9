use byteorder::{LittleEndian, ReadBytesExt};
use hltools_core::error::{Error, FormatError};
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Reader over a memory-mapped container file.
pub type MappedReader = io::Cursor<Mmap>;

/// Map `path` read-only and wrap it in a seekable reader.
pub fn map_file(path: impl AsRef<Path>) -> Result<MappedReader, Error> {
    let file = File::open(path.as_ref())?;
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(io::Cursor::new(mmap))
}

/// Decode bytes as ASCII, one char per byte; bytes above 0x7f become `?`.
pub fn ascii_lossy(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect()
}

/// Positioned reader over a seekable byte source.
///
/// Multi-byte primitives are little-endian unless the method name ends in
/// `_be`. Every read checks the remaining length first, so running off the
/// end yields [`FormatError::UnexpectedEof`] with the offending position.
#[derive(Debug)]
pub struct ByteCursor<R> {
    inner: R,
    pos: u64,
    len: u64,
}

impl<R: Read + Seek> ByteCursor<R> {
    pub fn new(mut inner: R) -> Result<Self, Error> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self { inner, pos: 0, len })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn seek(&mut self, offset: u64) -> Result<(), Error> {
        self.inner.seek(SeekFrom::Start(offset))?;
        self.pos = offset;
        Ok(())
    }

    fn take<T>(
        &mut self,
        needed: usize,
        read: impl FnOnce(&mut R) -> io::Result<T>,
    ) -> Result<T, Error> {
        let at = self.pos;
        if at.saturating_add(needed as u64) > self.len {
            return Err(FormatError::UnexpectedEof { at, needed }.into());
        }
        let value = read(&mut self.inner).map_err(|err| {
            if err.kind() == io::ErrorKind::UnexpectedEof {
                Error::from(FormatError::UnexpectedEof { at, needed })
            } else {
                Error::Io(err)
            }
        })?;
        self.pos += needed as u64;
        Ok(value)
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        self.take(1, |r| r.read_u8())
    }

    pub fn read_u16(&mut self) -> Result<u16, Error> {
        self.take(2, |r| r.read_u16::<LittleEndian>())
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        self.take(4, |r| r.read_u32::<LittleEndian>())
    }

    pub fn read_i16(&mut self) -> Result<i16, Error> {
        self.take(2, |r| r.read_i16::<LittleEndian>())
    }

    pub fn read_i32(&mut self) -> Result<i32, Error> {
        self.take(4, |r| r.read_i32::<LittleEndian>())
    }

    pub fn read_f32(&mut self) -> Result<f32, Error> {
        self.take(4, |r| r.read_f32::<LittleEndian>())
    }

    // Big-endian values are assembled from single-byte reads so the result
    // does not depend on host byte order.

    pub fn read_u16_be(&mut self) -> Result<u16, Error> {
        let b1 = self.read_u8()?;
        let b2 = self.read_u8()?;
        Ok((u16::from(b1) << 8) | u16::from(b2))
    }

    pub fn read_u32_be(&mut self) -> Result<u32, Error> {
        let b1 = self.read_u8()?;
        let b2 = self.read_u8()?;
        let b3 = self.read_u8()?;
        let b4 = self.read_u8()?;
        Ok((u32::from(b1) << 24) | (u32::from(b2) << 16) | (u32::from(b3) << 8) | u32::from(b4))
    }

    pub fn read_i16_be(&mut self) -> Result<i16, Error> {
        Ok(self.read_u16_be()? as i16)
    }

    pub fn read_i32_be(&mut self) -> Result<i32, Error> {
        Ok(self.read_u32_be()? as i32)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        self.take(N, |r| {
            let mut buf = [0u8; N];
            r.read_exact(&mut buf)?;
            Ok(buf)
        })
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, Error> {
        self.take(n, |r| {
            let mut buf = vec![0u8; n];
            r.read_exact(&mut buf)?;
            Ok(buf)
        })
    }

    /// Read an `n`-byte ASCII field, truncated at the first NUL.
    pub fn read_fixed_string(&mut self, n: usize) -> Result<String, Error> {
        let bytes = self.read_bytes(n)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(ascii_lossy(&bytes[..end]))
    }
}
