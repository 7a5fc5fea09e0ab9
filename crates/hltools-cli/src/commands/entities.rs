use anyhow::Context;
use hltools_format::{BspFile, EntityParser, EntityRecord};
use log::warn;
use std::path::Path;

use crate::types::EntityJson;

pub(crate) fn cmd_entities(path: &Path, class: Option<&str>, json: bool) -> anyhow::Result<()> {
    let p = path.display().to_string();
    let mut bsp = BspFile::open(path).with_context(|| format!("open {p}"))?;
    bsp.load_directory()
        .with_context(|| format!("read lump directory of {p}"))?;
    let text = bsp
        .read_entity_text()
        .with_context(|| format!("read entity lump of {p}"))?;

    let mut records: Vec<EntityRecord> = Vec::new();
    for result in EntityParser::new(&text).records() {
        match result {
            Ok(record) => records.push(record),
            Err(err) => warn!("{p}: {err}"),
        }
    }
    records.retain(|r| class.is_none_or(|c| r.classname() == Some(c)));

    if json {
        let out: Vec<EntityJson<'_>> = records
            .iter()
            .map(|r| EntityJson {
                classname: r.classname(),
                pairs: r.iter().collect(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for (i, r) in records.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{{");
        for (k, v) in r.iter() {
            println!("  \"{k}\" \"{v}\"");
        }
        println!("}}");
    }
    Ok(())
}
