//! Small in-memory map and archive builders for tests.

use hltools_format::{LumpKind, HEADER_SIZE};
use std::path::Path;

fn put_u32(buf: &mut [u8], offset: usize, v: u32) {
    buf[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
}

/// A map holding only an entity lump and a texture lump. Textures flagged
/// `true` are external (all mip offsets zero).
pub fn map_bytes(entities: &str, textures: &[(&str, bool)]) -> Vec<u8> {
    let mut tex = vec![0u8; 4 + textures.len() * 4];
    put_u32(&mut tex, 0, textures.len() as u32);
    for (i, (name, external)) in textures.iter().enumerate() {
        let at = tex.len() as u32;
        put_u32(&mut tex, 4 + i * 4, at);
        let mut header = [0u8; 40];
        header[..name.len()].copy_from_slice(name.as_bytes());
        put_u32(&mut header, 16, 16);
        put_u32(&mut header, 20, 16);
        if !external {
            put_u32(&mut header, 24, 40);
        }
        tex.extend_from_slice(&header);
    }

    let mut ent = entities.as_bytes().to_vec();
    ent.push(0);

    let mut buf = vec![0u8; HEADER_SIZE as usize];
    put_u32(&mut buf, 0, 30);
    for kind in LumpKind::ALL {
        let data: &[u8] = match kind {
            LumpKind::Entities => &ent,
            LumpKind::Textures => &tex,
            _ => &[],
        };
        let at = 4 + kind.index() * 8;
        let start = buf.len() as u32;
        put_u32(&mut buf, at, start);
        put_u32(&mut buf, at + 4, data.len() as u32);
        buf.extend_from_slice(data);
    }
    buf
}

/// A `WAD3` archive whose entries have the given names and no data.
pub fn wad_bytes(names: &[&str]) -> Vec<u8> {
    let mut buf = vec![0u8; 12];
    buf[..4].copy_from_slice(b"WAD3");
    put_u32(&mut buf, 4, names.len() as u32);
    put_u32(&mut buf, 8, 12);
    for name in names {
        let mut e = [0u8; 32];
        e[12] = 0x43;
        e[16..16 + name.len()].copy_from_slice(name.as_bytes());
        buf.extend_from_slice(&e);
    }
    buf
}

pub fn write(base: &Path, rel: &str, bytes: &[u8]) {
    let path = base.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, bytes).unwrap();
}
