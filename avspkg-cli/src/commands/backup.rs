//! Backup commands.

use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use clap::Subcommand;

use avspkg::backup::{backup_from_tar, create_backup, list_backups, parse_backup_name};

use super::CommandContext;
use crate::error::CliError;

/// Backup subcommands.
#[derive(Debug, Subcommand)]
pub enum BackupCommands {
    /// Snapshot an instance working directory into a tar archive
    Create {
        /// Instance id (<name>-<tag>)
        instance_id: String,

        /// Instance working directory (defaults to <data_dir>/nodes/<id>)
        #[arg(long)]
        instance_dir: Option<PathBuf>,

        /// Directory receiving the archive (defaults to the configured backups dir)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show the metadata stored in a backup archive
    Inspect {
        /// Path to the backup archive
        file: PathBuf,
    },

    /// List backups in a directory
    List {
        /// Directory to scan (defaults to the configured backups dir)
        dir: Option<PathBuf>,
    },

    /// Decode a backup file name without opening it
    ParseName {
        /// File name, e.g. mock-avs-default-1700000000.tar
        name: String,
    },
}

/// Run a backup subcommand.
pub fn run(command: BackupCommands, ctx: &CommandContext<'_>) -> Result<(), CliError> {
    match command {
        BackupCommands::Create {
            instance_id,
            instance_dir,
            output,
        } => run_create(instance_id, instance_dir, output, Utc::now(), ctx),
        BackupCommands::Inspect { file } => run_inspect(file, ctx),
        BackupCommands::List { dir } => run_list(dir, ctx),
        BackupCommands::ParseName { name } => run_parse_name(&name, ctx),
    }
}

fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn run_create(
    instance_id: String,
    instance_dir: Option<PathBuf>,
    output: Option<PathBuf>,
    now: DateTime<Utc>,
    ctx: &CommandContext<'_>,
) -> Result<(), CliError> {
    let instance_dir = instance_dir.unwrap_or_else(|| ctx.config.instance_dir(&instance_id));
    let backups_dir = output.unwrap_or_else(|| ctx.config.backups_dir());

    let created = create_backup(ctx.storage, &instance_dir, &backups_dir, now)?;
    if created.backup.instance_id() != instance_id {
        tracing::warn!(
            requested = %instance_id,
            found = %created.backup.instance_id(),
            "Instance state belongs to a different id"
        );
    }

    ctx.output
        .println(&format!("Created backup {}", created.path.display()));
    ctx.output
        .println(&format!("  ID: {}", created.backup.id()));
    Ok(())
}

fn run_inspect(file: PathBuf, ctx: &CommandContext<'_>) -> Result<(), CliError> {
    let backup = backup_from_tar(ctx.storage, &file)?;

    ctx.output.println(&format!("Backup {}", file.display()));
    ctx.output.println(&format!("  ID:        {}", backup.id()));
    ctx.output
        .println(&format!("  Instance:  {}", backup.instance_id()));
    ctx.output
        .println(&format!("  Timestamp: {}", format_time(backup.timestamp())));
    ctx.output.println(&format!("  Version:   {}", backup.version()));
    ctx.output.println(&format!("  Commit:    {}", backup.commit()));
    ctx.output.println(&format!("  URL:       {}", backup.url()));
    Ok(())
}

fn run_list(dir: Option<PathBuf>, ctx: &CommandContext<'_>) -> Result<(), CliError> {
    let dir = dir.unwrap_or_else(|| ctx.config.backups_dir());
    let backups = list_backups(ctx.storage, &dir)?;

    if backups.is_empty() {
        ctx.output
            .println(&format!("No backups found in {}", dir.display()));
        return Ok(());
    }

    for backup in &backups {
        ctx.output.println(&format!(
            "{}  {}  {}",
            format_time(backup.timestamp),
            backup.instance_id,
            backup.path_in(&dir).display()
        ));
    }
    Ok(())
}

fn run_parse_name(name: &str, ctx: &CommandContext<'_>) -> Result<(), CliError> {
    let parsed = parse_backup_name(name)?;
    ctx.output
        .println(&format!("Instance:  {}", parsed.instance_id));
    ctx.output.println(&format!(
        "Timestamp: {} ({})",
        parsed.timestamp.timestamp(),
        format_time(parsed.timestamp)
    ));
    Ok(())
}
