//! Configuration CLI commands.

use clap::Subcommand;
use console::style;

use super::CommandContext;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective configuration
    Show,

    /// Write the effective configuration to the configuration file
    Init {
        /// Replace an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, ctx: &CommandContext<'_>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => {
            ctx.output.println(&ctx.config_path.display().to_string());
        }
        ConfigCommands::Show => {
            ctx.output
                .println(&format!("# {}", ctx.config_path.display()));
            ctx.output.println(ctx.config.to_ini_string()?.trim_end());
        }
        ConfigCommands::Init { force } => run_init(force, ctx)?,
    }
    Ok(())
}

fn run_init(force: bool, ctx: &CommandContext<'_>) -> Result<(), CliError> {
    if ctx.config_path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists. Use --force to overwrite it.",
            ctx.config_path.display()
        )));
    }

    ctx.config.save_to(ctx.config_path)?;
    ctx.output.println(&format!(
        "{} Wrote {}",
        style("✓").green(),
        ctx.config_path.display()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::BufferOutput;
    use avspkg::config::ConfigFile;
    use avspkg::storage::OsStorage;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    #[test]
    fn test_show_prints_effective_values() {
        let mut config = ConfigFile::default();
        config.paths.data_dir = PathBuf::from("/data");
        let output = BufferOutput::new();
        let ctx = CommandContext::new(&config, Path::new("/etc/avspkg.ini"), &OsStorage, &output);

        run(ConfigCommands::Show, &ctx).unwrap();

        let text = output.text();
        assert!(text.starts_with("# /etc/avspkg.ini"));
        assert!(text.contains("[paths]"));
        assert!(text.contains("data_dir=/data"));
        assert!(text.contains("verify_checksums=true"));
    }

    #[test]
    fn test_path() {
        let config = ConfigFile::default();
        let output = BufferOutput::new();
        let ctx = CommandContext::new(&config, Path::new("/etc/avspkg.ini"), &OsStorage, &output);

        run(ConfigCommands::Path, &ctx).unwrap();

        assert_eq!(output.text(), "/etc/avspkg.ini");
    }

    #[test]
    fn test_init_writes_loadable_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("avspkg").join("config.ini");
        let mut config = ConfigFile::default();
        config.paths.data_dir = PathBuf::from("/data");
        let output = BufferOutput::new();
        let ctx = CommandContext::new(&config, &path, &OsStorage, &output);

        run(ConfigCommands::Init { force: false }, &ctx).unwrap();

        assert_eq!(ConfigFile::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(&path, "[logging]\nlevel = warn\n").unwrap();
        let config = ConfigFile::default();
        let output = BufferOutput::new();
        let ctx = CommandContext::new(&config, &path, &OsStorage, &output);

        assert!(run(ConfigCommands::Init { force: false }, &ctx).is_err());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[logging]\nlevel = warn\n"
        );

        run(ConfigCommands::Init { force: true }, &ctx).unwrap();
        assert_eq!(ConfigFile::load_from(&path).unwrap(), config);
    }
}
