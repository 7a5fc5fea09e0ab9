use anyhow::Context;
use hltools_format::{ascii_lossy, WadFile};
use std::path::Path;

use crate::types::{WadEntryJson, WadJson};

pub(crate) fn cmd_wad(path: &Path, json: bool) -> anyhow::Result<()> {
    let p = path.display().to_string();
    let mut wad = WadFile::open(path).with_context(|| format!("open {p}"))?;
    wad.load_entries()
        .with_context(|| format!("read directory of {p}"))?;
    let header = *wad.header();
    let entries = wad.entries().unwrap_or_default();

    if json {
        let out = WadJson {
            path: &p,
            magic: ascii_lossy(&header.magic),
            magic_ok: header.magic_ok(),
            entry_count: header.entry_count,
            directory_offset: header.directory_offset,
            entries: entries
                .iter()
                .map(|e| WadEntryJson {
                    name: &e.name,
                    kind: e.kind.label(),
                    offset: e.offset,
                    compressed_size: e.compressed_size,
                    uncompressed_size: e.uncompressed_size,
                    compression: e.compression,
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Path: {p}");
    println!(
        "Header: magic={:?}{} entries={} directory_offset={}",
        ascii_lossy(&header.magic),
        if header.magic_ok() { "" } else { " (not WAD3)" },
        header.entry_count,
        header.directory_offset
    );
    for e in entries {
        println!(
            "  {:<16} {:<9} offset={:<8} size={:<8} kind=0x{:02x}",
            e.name,
            e.kind.label(),
            e.offset,
            e.compressed_size,
            e.kind.as_byte()
        );
    }
    Ok(())
}
