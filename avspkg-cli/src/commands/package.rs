//! Package validation commands.

use std::path::PathBuf;

use clap::Subcommand;
use console::style;

use avspkg::package::{PackageHandler, PackageStatus};

use super::CommandContext;
use crate::error::CliError;

/// Package subcommands.
#[derive(Debug, Subcommand)]
pub enum PackageCommands {
    /// Validate a staged package and its checksum registry
    Check {
        /// Package root directory (contains pkg/)
        dir: PathBuf,

        /// Only check the layout, ignoring checksum.txt
        #[arg(long)]
        skip_checksums: bool,
    },

    /// Generate checksum.txt for every file under pkg/
    Checksum {
        /// Package root directory (contains pkg/)
        dir: PathBuf,
    },
}

/// Run a package subcommand.
pub fn run(command: PackageCommands, ctx: &CommandContext<'_>) -> Result<(), CliError> {
    match command {
        PackageCommands::Check {
            dir,
            skip_checksums,
        } => run_check(dir, skip_checksums, ctx),
        PackageCommands::Checksum { dir } => run_checksum(dir, ctx),
    }
}

fn run_check(dir: PathBuf, skip_checksums: bool, ctx: &CommandContext<'_>) -> Result<(), CliError> {
    let verify = ctx.config.packages.verify_checksums && !skip_checksums;
    let handler = PackageHandler::new(dir).with_verify_checksums(verify);

    match handler.check(ctx.storage)? {
        PackageStatus::Verified { files } => ctx.output.println(&format!(
            "{} Package {} verified ({} files checked)",
            style("✓").green(),
            handler.root().display(),
            files
        )),
        PackageStatus::Unverified => ctx.output.println(&format!(
            "{} Package {} is valid (checksums not verified)",
            style("✓").yellow(),
            handler.root().display()
        )),
    }
    Ok(())
}

fn run_checksum(dir: PathBuf, ctx: &CommandContext<'_>) -> Result<(), CliError> {
    let handler = PackageHandler::new(dir);
    let entries = handler.write_registry(ctx.storage)?;

    ctx.output.println(&format!(
        "Wrote {} with {} entries",
        handler.checksum_path().display(),
        entries.len()
    ));
    Ok(())
}
