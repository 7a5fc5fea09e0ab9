use anyhow::Context;
use hltools_format::{BspFile, LumpKind, LumpVisitor};
use std::path::Path;

use crate::types::{InspectJson, LumpJson, TextureJson};

/// Streams every lump without keeping anything; the per-lump outcome carries
/// the record count.
struct CountAll;

impl LumpVisitor for CountAll {
    fn wants(&self, _kind: LumpKind) -> bool {
        true
    }
}

pub(crate) fn cmd_inspect(path: &Path, json: bool) -> anyhow::Result<()> {
    let p = path.display().to_string();
    let mut bsp = BspFile::open(path).with_context(|| format!("open {p}"))?;
    let directory = bsp
        .load_directory()
        .with_context(|| format!("read lump directory of {p}"))?
        .clone();

    let outcomes = bsp.visit(&mut CountAll)?;
    let lumps: Vec<LumpJson> = outcomes
        .into_iter()
        .map(|o| {
            let entry = directory.get(o.kind);
            let (count, error) = match o.result {
                Ok(n) => (Some(n), None),
                Err(err) => (None, Some(err.to_string())),
            };
            LumpJson {
                name: o.kind.name(),
                offset: entry.offset,
                size: entry.size,
                count,
                error,
            }
        })
        .collect();

    let textures: Vec<TextureJson> = if bsp.texture_offsets().is_some() {
        bsp.load_textures()
            .with_context(|| format!("read textures of {p}"))?
            .into_iter()
            .map(|t| TextureJson {
                external: t.is_external(),
                name: t.name,
                width: t.width,
                height: t.height,
            })
            .collect()
    } else {
        Vec::new()
    };

    if json {
        let out = InspectJson {
            path: &p,
            version: directory.version,
            file_length_bytes: directory.container_len,
            lumps,
            textures,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Path: {p}");
    println!(
        "Version: {} file_len={}",
        directory.version, directory.container_len
    );
    println!("Lumps:");
    for l in &lumps {
        let detail = match (&l.count, &l.error) {
            (Some(n), _) => format!("count={n}"),
            (None, Some(err)) => format!("error: {err}"),
            (None, None) => String::new(),
        };
        println!(
            "  {:<12} offset={:<8} size={:<8} {detail}",
            l.name, l.offset, l.size
        );
    }
    println!("Textures ({}):", textures.len());
    for t in &textures {
        let origin = if t.external { "external" } else { "embedded" };
        println!("  {:<16} {}x{} {origin}", t.name, t.width, t.height);
    }
    Ok(())
}
