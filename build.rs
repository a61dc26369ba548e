//! Build script for generating the `geoportal` man pages.
//!
//! One page is rendered for the top-level command and one per subcommand
//! group (`geoportal-wms.1`, `geoportal-job.1`) into the build output
//! directory, where the packaging step picks them up.

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Command, CommandFactory};
use clap_mangen::Man;

#[path = "src/cli/mod.rs"]
mod cli;

use cli::Cli;

fn render_page(
    command: Command,
    title: &str,
    target: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut buffer = Vec::new();
    Man::new(command).title(title).render(&mut buffer)?;
    fs::write(target, buffer)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout();
    writeln!(stdout, "cargo:rerun-if-changed=build.rs")?;
    writeln!(stdout, "cargo:rerun-if-changed=src/cli/mod.rs")?;

    let out_dir =
        PathBuf::from(env::var_os("OUT_DIR").ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "OUT_DIR was not set")
        })?);

    let command = Cli::command();
    for group in command.get_subcommands() {
        let title = format!("geoportal-{}", group.get_name());
        render_page(group.clone(), &title, &out_dir.join(format!("{title}.1")))?;
    }
    render_page(command, "geoportal", &out_dir.join("geoportal.1"))?;

    Ok(())
}
