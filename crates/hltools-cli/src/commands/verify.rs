use anyhow::Context;
use hltools_core::report::VerificationReport;
use hltools_verify::{MapOutcome, Verifier, VerifierConfig};
use std::path::Path;

use crate::types::VerifyJson;

pub(crate) fn cmd_verify(
    base: &Path,
    mod_dir: &str,
    maps: &[String],
    fail_on_missing: bool,
    config: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let config = match config {
        Some(path) => VerifierConfig::load(path)?,
        None => VerifierConfig::default(),
    };
    let verifier = Verifier::on_disk(base, mod_dir, config);

    let outcomes = if maps.is_empty() {
        verifier
            .verify_all()
            .with_context(|| format!("list maps of {mod_dir}"))?
    } else {
        maps.iter()
            .map(|map| MapOutcome {
                map: map.clone(),
                result: verifier.verify(map),
            })
            .collect()
    };

    if json {
        let out: Vec<VerifyJson<'_>> = outcomes
            .iter()
            .map(|o| match &o.result {
                Ok(report) => VerifyJson {
                    map: &o.map,
                    ok: true,
                    error: None,
                    server_capable: Some(report.server_capable()),
                    client_capable: Some(report.client_capable()),
                    penalty: Some(report.penalty()),
                    report: Some(report),
                },
                Err(err) => VerifyJson {
                    map: &o.map,
                    ok: false,
                    error: Some(err.to_string()),
                    server_capable: None,
                    client_capable: None,
                    penalty: None,
                    report: None,
                },
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        if outcomes.is_empty() {
            println!("No maps found in {mod_dir}");
        }
        for o in &outcomes {
            match &o.result {
                Ok(report) => print_report(report),
                Err(err) => println!("Map: {}\n  error: {err}", o.map),
            }
        }
    }

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} maps could not be verified", outcomes.len());
    }
    if fail_on_missing {
        let incomplete = outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .filter(|r| !r.client_capable())
            .count();
        if incomplete > 0 {
            anyhow::bail!("{incomplete} maps have missing dependencies");
        }
    }
    Ok(())
}

fn yes_no(v: bool) -> &'static str {
    if v {
        "yes"
    } else {
        "no"
    }
}

fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("  {label} ({}):", items.len());
    for item in items {
        println!("    {item}");
    }
}

fn print_report(r: &VerificationReport) {
    println!("Map: {}", r.map);
    if !r.has_worldspawn {
        println!("  no worldspawn entity");
    }
    if let Some(sky) = &r.skyname {
        println!("  skyname: {sky}");
    }
    print_list("malformed wad references", &r.malformed_wad_files);
    print_list("wads found in another directory", &r.misnamed_mod_dirs);
    print_list("wads not found", &r.not_existing_files);
    print_list("missing textures", &r.missing_textures);
    print_list("missing sprites", &r.missing_sprites);
    print_list("missing sounds", &r.missing_sounds);
    print_list("missing models", &r.missing_models);
    print_list("archives with bad magic", &r.bad_magic_archives);
    let archive_errors: Vec<String> = r
        .archive_failures
        .iter()
        .map(|f| format!("{}: {}", f.path, f.error))
        .collect();
    print_list("unreadable archives", &archive_errors);
    let lump_errors: Vec<String> = r
        .lump_failures
        .iter()
        .map(|f| format!("{}: {}", f.lump, f.error))
        .collect();
    print_list("unreadable lumps", &lump_errors);
    print_list("entity errors", &r.entity_errors);
    println!(
        "  used assets: {} ({} missing)",
        r.used.len(),
        r.missing.len()
    );
    println!("  penalty: {}", r.penalty());
    println!("  server capable: {}", yes_no(r.server_capable()));
    println!("  client capable: {}", yes_no(r.client_capable()));
}
