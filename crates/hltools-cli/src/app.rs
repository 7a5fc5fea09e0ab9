use crate::cli::{Cli, Command};

pub(crate) fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.cmd {
        Command::Verify {
            base,
            mod_dir,
            maps,
            fail_on_missing,
        } => crate::commands::verify::cmd_verify(
            &base,
            &mod_dir,
            &maps,
            fail_on_missing,
            cli.config.as_deref(),
            cli.json,
        ),
        Command::Inspect { path } => crate::commands::inspect::cmd_inspect(&path, cli.json),
        Command::Entities { path, class } => {
            crate::commands::entities::cmd_entities(&path, class.as_deref(), cli.json)
        }
        Command::Wad { path } => crate::commands::wad::cmd_wad(&path, cli.json),
    }
}
